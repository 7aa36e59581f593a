//! Component kinds and the registry that describes them.
//!
//! Everything kind-specific (label, palette category, icon, whether the kind
//! accepts children, default free-form size) lives in one table keyed by
//! [`ComponentKind`]. New kinds extend the table; callers never branch on
//! the kind themselves.

use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Semantic type of a placed component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    Section,
    Columns,
    Navbar,
    HeroFull,
    HeroSplit,
    Heading,
    TextBlock,
    Button,
    Image,
    Video,
    Gallery,
    FeatureGrid,
    Testimonial,
    PricingTable,
    ContactForm,
    Spacer,
    Footer,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 17] = [
        ComponentKind::Section,
        ComponentKind::Columns,
        ComponentKind::Navbar,
        ComponentKind::HeroFull,
        ComponentKind::HeroSplit,
        ComponentKind::Heading,
        ComponentKind::TextBlock,
        ComponentKind::Button,
        ComponentKind::Image,
        ComponentKind::Video,
        ComponentKind::Gallery,
        ComponentKind::FeatureGrid,
        ComponentKind::Testimonial,
        ComponentKind::PricingTable,
        ComponentKind::ContactForm,
        ComponentKind::Spacer,
        ComponentKind::Footer,
    ];

    /// Stable identifier, e.g. `"hero-full"`.
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Section => "section",
            ComponentKind::Columns => "columns",
            ComponentKind::Navbar => "navbar",
            ComponentKind::HeroFull => "hero-full",
            ComponentKind::HeroSplit => "hero-split",
            ComponentKind::Heading => "heading",
            ComponentKind::TextBlock => "text-block",
            ComponentKind::Button => "button",
            ComponentKind::Image => "image",
            ComponentKind::Video => "video",
            ComponentKind::Gallery => "gallery",
            ComponentKind::FeatureGrid => "feature-grid",
            ComponentKind::Testimonial => "testimonial",
            ComponentKind::PricingTable => "pricing-table",
            ComponentKind::ContactForm => "contact-form",
            ComponentKind::Spacer => "spacer",
            ComponentKind::Footer => "footer",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown component kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for ComponentKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Palette grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Layout,
    Navigation,
    Hero,
    Content,
    Media,
    Forms,
}

/// Everything the editor needs to know about a kind.
#[derive(Debug, Clone, PartialEq)]
pub struct KindDescriptor {
    pub kind: ComponentKind,
    pub label: &'static str,
    pub category: Category,
    /// Icon name looked up by the palette.
    pub icon: &'static str,
    /// Whether nested drops may target this kind.
    pub container: bool,
    /// Frame size given to a fresh free-form drop.
    pub default_size: Size,
}

impl KindDescriptor {
    const fn new(
        kind: ComponentKind,
        label: &'static str,
        category: Category,
        icon: &'static str,
        container: bool,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            kind,
            label,
            category,
            icon,
            container,
            default_size: Size::new(width, height),
        }
    }
}

const BUILTIN: [KindDescriptor; 17] = [
    KindDescriptor::new(ComponentKind::Section, "Section", Category::Layout, "square", true, 600.0, 300.0),
    KindDescriptor::new(ComponentKind::Columns, "Columns", Category::Layout, "columns", true, 600.0, 240.0),
    KindDescriptor::new(ComponentKind::Navbar, "Navigation Bar", Category::Navigation, "menu", false, 800.0, 64.0),
    KindDescriptor::new(ComponentKind::HeroFull, "Full Hero", Category::Hero, "maximize", false, 800.0, 400.0),
    KindDescriptor::new(ComponentKind::HeroSplit, "Split Hero", Category::Hero, "layout", false, 800.0, 400.0),
    KindDescriptor::new(ComponentKind::Heading, "Heading", Category::Content, "heading", false, 400.0, 60.0),
    KindDescriptor::new(ComponentKind::TextBlock, "Text Block", Category::Content, "type", false, 400.0, 120.0),
    KindDescriptor::new(ComponentKind::Button, "Button", Category::Content, "mouse-pointer", false, 160.0, 50.0),
    KindDescriptor::new(ComponentKind::Image, "Image", Category::Media, "image", false, 300.0, 200.0),
    KindDescriptor::new(ComponentKind::Video, "Video", Category::Media, "video", false, 480.0, 270.0),
    KindDescriptor::new(ComponentKind::Gallery, "Gallery", Category::Media, "grid", false, 600.0, 400.0),
    KindDescriptor::new(ComponentKind::FeatureGrid, "Feature Grid", Category::Content, "star", false, 700.0, 320.0),
    KindDescriptor::new(ComponentKind::Testimonial, "Testimonial", Category::Content, "quote", false, 500.0, 200.0),
    KindDescriptor::new(ComponentKind::PricingTable, "Pricing Table", Category::Content, "dollar-sign", false, 700.0, 420.0),
    KindDescriptor::new(ComponentKind::ContactForm, "Contact Form", Category::Forms, "mail", false, 400.0, 360.0),
    KindDescriptor::new(ComponentKind::Spacer, "Spacer", Category::Layout, "move-vertical", false, 300.0, 50.0),
    KindDescriptor::new(ComponentKind::Footer, "Footer", Category::Navigation, "align-bottom", false, 800.0, 160.0),
];

/// Kind tag → descriptor table.
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    descriptors: HashMap<ComponentKind, KindDescriptor>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ComponentRegistry {
    /// Registry with the built-in descriptor for every kind.
    pub fn builtin() -> Self {
        let descriptors = BUILTIN.iter().map(|d| (d.kind, d.clone())).collect();
        Self { descriptors }
    }

    /// Add or replace the descriptor for `descriptor.kind`.
    pub fn register(&mut self, descriptor: KindDescriptor) -> Option<KindDescriptor> {
        self.descriptors.insert(descriptor.kind, descriptor)
    }

    pub fn get(&self, kind: ComponentKind) -> Option<&KindDescriptor> {
        self.descriptors.get(&kind)
    }

    pub fn is_container(&self, kind: ComponentKind) -> bool {
        self.get(kind).is_some_and(|d| d.container)
    }

    /// Default drop size for `kind`, or `fallback` when unregistered.
    pub fn default_size(&self, kind: ComponentKind, fallback: Size) -> Size {
        self.get(kind).map_or(fallback, |d| d.default_size)
    }

    /// Descriptors in a category, sorted by label.
    pub fn by_category(&self, category: Category) -> Vec<&KindDescriptor> {
        let mut found: Vec<_> = self
            .descriptors
            .values()
            .filter(|d| d.category == category)
            .collect();
        found.sort_by_key(|d| d.label);
        found
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_kind() {
        let registry = ComponentRegistry::builtin();
        assert_eq!(registry.len(), ComponentKind::ALL.len());
        for kind in ComponentKind::ALL {
            let descriptor = registry.get(kind).expect("builtin descriptor");
            assert_eq!(descriptor.kind, kind);
            assert!(descriptor.default_size.width >= 100.0);
            assert!(descriptor.default_size.height >= 50.0);
        }
    }

    #[test]
    fn test_kind_string_roundtrip() {
        for kind in ComponentKind::ALL {
            assert_eq!(kind.as_str().parse::<ComponentKind>(), Ok(kind));
        }
        assert_eq!(
            "carousel".parse::<ComponentKind>(),
            Err(UnknownKind("carousel".to_string()))
        );
        let json = serde_json::to_string(&ComponentKind::HeroFull).unwrap();
        assert_eq!(json, "\"hero-full\"");
    }

    #[test]
    fn test_containers() {
        let registry = ComponentRegistry::builtin();
        assert!(registry.is_container(ComponentKind::Section));
        assert!(registry.is_container(ComponentKind::Columns));
        assert!(!registry.is_container(ComponentKind::Button));
    }

    #[test]
    fn test_register_overrides() {
        let mut registry = ComponentRegistry::builtin();
        let mut gallery = registry.get(ComponentKind::Gallery).cloned().unwrap();
        gallery.container = true;
        gallery.default_size = Size::new(900.0, 500.0);
        assert!(registry.register(gallery).is_some());
        assert!(registry.is_container(ComponentKind::Gallery));
        let size = registry.default_size(ComponentKind::Gallery, Size::new(300.0, 200.0));
        assert!((size.width - 900.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_by_category_sorted() {
        let registry = ComponentRegistry::builtin();
        let media: Vec<_> = registry.by_category(Category::Media).iter().map(|d| d.label).collect();
        assert_eq!(media, vec!["Gallery", "Image", "Video"]);
    }
}
