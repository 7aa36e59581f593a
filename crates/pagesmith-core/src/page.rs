//! Page document: the forest of placed components.

use crate::components::ComponentKind;
use crate::freeform::FreeformRect;
use crate::viewport::DeviceMode;
use crate::visibility::{self, Visibility, VisibilityFlags};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Unique, stable identifier of a placed component.
pub type ComponentId = Uuid;

/// How root components are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Document order, vertically spaced.
    #[default]
    Stack,
    /// Each root component at its absolute frame.
    Freeform,
}

/// Page tree errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("Component not found: {0}")]
    UnknownComponent(ComponentId),
    #[error("Component {0} does not accept children")]
    NotAContainer(ComponentId),
    #[error("Moving {id} under {parent} would make it its own ancestor")]
    WouldCreateCycle { id: ComponentId, parent: ComponentId },
}

/// A component placed on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedComponent {
    pub(crate) id: ComponentId,
    pub kind: ComponentKind,
    pub(crate) parent: Option<ComponentId>,
    /// Absolute frame, meaningful only in free-form mode. Written only
    /// through [`PageDocument::commit_frame`] so the size minimums hold.
    pub(crate) freeform: Option<FreeformRect>,
    pub(crate) visibility: VisibilityFlags,
    /// Kind-specific properties owned by the property editors.
    pub props: serde_json::Value,
}

impl PlacedComponent {
    fn new(kind: ComponentKind, parent: Option<ComponentId>, freeform: Option<FreeformRect>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            parent,
            freeform,
            visibility: VisibilityFlags::default(),
            props: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn parent(&self) -> Option<ComponentId> {
        self.parent
    }

    pub fn freeform(&self) -> Option<FreeformRect> {
        self.freeform
    }

    pub fn visibility(&self) -> VisibilityFlags {
        self.visibility
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn visibility_on(&self, device: DeviceMode) -> Visibility {
        visibility::evaluate(&self.visibility, device)
    }
}

/// One entry of the render plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSlot {
    pub id: ComponentId,
    pub kind: ComponentKind,
    /// Nesting depth, 0 for root components.
    pub depth: usize,
    pub visibility: Visibility,
    /// Absolute frame when the component is a free-form root.
    pub frame: Option<FreeformRect>,
}

/// The page tree.
///
/// `order` holds every id in document order; a component's children are the
/// components naming it as parent, in that order.
#[derive(Debug, Clone, Default)]
pub struct PageDocument {
    components: HashMap<ComponentId, PlacedComponent>,
    order: Vec<ComponentId>,
    layout_mode: LayoutMode,
}

impl PageDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.layout_mode
    }

    pub(crate) fn set_layout_mode(&mut self, mode: LayoutMode) {
        self.layout_mode = mode;
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.components.contains_key(&id)
    }

    pub fn get(&self, id: ComponentId) -> Option<&PlacedComponent> {
        self.components.get(&id)
    }

    pub fn get_mut(&mut self, id: ComponentId) -> Option<&mut PlacedComponent> {
        self.components.get_mut(&id)
    }

    /// Children of `parent` (roots for `None`) in document order.
    pub fn children(&self, parent: Option<ComponentId>) -> Vec<ComponentId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.components.get(id).is_some_and(|c| c.parent == parent))
            .collect()
    }

    /// Whether `ancestor` is `id` itself or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: ComponentId, id: ComponentId) -> bool {
        let mut current = Some(id);
        while let Some(cursor) = current {
            if cursor == ancestor {
                return true;
            }
            current = self.components.get(&cursor).and_then(|c| c.parent);
        }
        false
    }

    /// Place a new component and return its fresh id.
    pub fn insert(
        &mut self,
        kind: ComponentKind,
        parent: Option<ComponentId>,
        freeform: Option<FreeformRect>,
    ) -> Result<ComponentId, PageError> {
        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(PageError::UnknownComponent(parent));
            }
        }
        let component = PlacedComponent::new(kind, parent, freeform.map(FreeformRect::clamped));
        let id = component.id;
        self.order.push(id);
        self.components.insert(id, component);
        Ok(id)
    }

    /// Move an existing component under `parent` (root for `None`), after
    /// its new siblings.
    pub fn relocate(&mut self, id: ComponentId, parent: Option<ComponentId>) -> Result<(), PageError> {
        if !self.contains(id) {
            return Err(PageError::UnknownComponent(id));
        }
        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(PageError::UnknownComponent(parent));
            }
            if self.is_ancestor_or_self(id, parent) {
                return Err(PageError::WouldCreateCycle { id, parent });
            }
        }
        if let Some(component) = self.components.get_mut(&id) {
            component.parent = parent;
        }
        self.order.retain(|&other| other != id);
        self.order.push(id);
        Ok(())
    }

    /// Remove a component and its whole subtree. Returns the removed ids.
    pub fn remove(&mut self, id: ComponentId) -> Vec<ComponentId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let removed: Vec<ComponentId> = self
            .order
            .iter()
            .copied()
            .filter(|&other| self.is_ancestor_or_self(id, other))
            .collect();
        for other in &removed {
            self.components.remove(other);
        }
        self.order.retain(|other| !removed.contains(other));
        removed
    }

    /// Persist a free-form frame. Stale ids are ignored.
    pub fn commit_frame(&mut self, id: ComponentId, frame: FreeformRect) -> bool {
        match self.components.get_mut(&id) {
            Some(component) => {
                component.freeform = Some(frame.clamped());
                true
            }
            None => {
                log::debug!("frame commit for removed component {id} ignored");
                false
            }
        }
    }

    pub fn set_visibility(&mut self, id: ComponentId, flags: VisibilityFlags) -> Result<(), PageError> {
        let component = self.components.get_mut(&id).ok_or(PageError::UnknownComponent(id))?;
        component.visibility = flags;
        Ok(())
    }

    /// Give every root lacking a frame one below the frames before it.
    pub(crate) fn seed_missing_frames(
        &mut self,
        origin: Point,
        spacing: f64,
        size_for: impl Fn(ComponentKind) -> Size,
    ) -> usize {
        let mut cursor = origin.y;
        let mut seeded = 0;
        for id in self.children(None) {
            let Some(component) = self.components.get_mut(&id) else {
                continue;
            };
            match component.freeform {
                Some(frame) => cursor = cursor.max(frame.bottom() + spacing),
                None => {
                    let frame = FreeformRect::from_origin_size(
                        Point::new(origin.x, cursor),
                        size_for(component.kind),
                    );
                    cursor = frame.bottom() + spacing;
                    component.freeform = Some(frame);
                    seeded += 1;
                }
            }
        }
        seeded
    }

    /// Depth-first document order.
    pub fn walk(&self) -> Vec<(ComponentId, usize)> {
        let mut out = Vec::with_capacity(self.order.len());
        self.walk_into(None, 0, &mut out);
        out
    }

    fn walk_into(&self, parent: Option<ComponentId>, depth: usize, out: &mut Vec<(ComponentId, usize)>) {
        for id in self.children(parent) {
            out.push((id, depth));
            self.walk_into(Some(id), depth + 1, out);
        }
    }

    /// Every component with its visibility on `device`, in render order.
    pub fn render_plan(&self, device: DeviceMode) -> Vec<RenderSlot> {
        self.walk()
            .into_iter()
            .filter_map(|(id, depth)| {
                let component = self.components.get(&id)?;
                let frame = match self.layout_mode {
                    LayoutMode::Freeform if component.is_root() => component.freeform,
                    _ => None,
                };
                Some(RenderSlot {
                    id,
                    kind: component.kind,
                    depth,
                    visibility: component.visibility_on(device),
                    frame,
                })
            })
            .collect()
    }

    /// Free-form roots, front-most first, for hit testing.
    pub fn freeform_roots_front_to_back(&self) -> Vec<(ComponentId, FreeformRect)> {
        self.children(None)
            .into_iter()
            .rev()
            .filter_map(|id| self.components.get(&id)?.freeform.map(|frame| (id, frame)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_assigns_unique_ids() {
        let mut page = PageDocument::new();
        let a = page.insert(ComponentKind::HeroFull, None, None).unwrap();
        let b = page.insert(ComponentKind::HeroFull, None, None).unwrap();
        assert_ne!(a, b);
        assert_eq!(page.len(), 2);
        assert_eq!(page.children(None), vec![a, b]);
    }

    #[test]
    fn test_insert_under_missing_parent_fails() {
        let mut page = PageDocument::new();
        let ghost = Uuid::new_v4();
        assert_eq!(
            page.insert(ComponentKind::Button, Some(ghost), None),
            Err(PageError::UnknownComponent(ghost))
        );
        assert!(page.is_empty());
    }

    #[test]
    fn test_insert_clamps_frame() {
        let mut page = PageDocument::new();
        let frame = FreeformRect { x: 0.0, y: 0.0, width: 10.0, height: 10.0 };
        let id = page.insert(ComponentKind::Spacer, None, Some(frame)).unwrap();
        let stored = page.get(id).unwrap().freeform.unwrap();
        assert!((stored.width - 100.0).abs() < f64::EPSILON);
        assert!((stored.height - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_relocate_rejects_cycles() {
        let mut page = PageDocument::new();
        let outer = page.insert(ComponentKind::Section, None, None).unwrap();
        let inner = page.insert(ComponentKind::Columns, Some(outer), None).unwrap();
        assert_eq!(
            page.relocate(outer, Some(inner)),
            Err(PageError::WouldCreateCycle { id: outer, parent: inner })
        );
        assert_eq!(
            page.relocate(outer, Some(outer)),
            Err(PageError::WouldCreateCycle { id: outer, parent: outer })
        );
        assert!(page.relocate(inner, None).is_ok());
        assert_eq!(page.children(None), vec![outer, inner]);
    }

    #[test]
    fn test_remove_takes_subtree() {
        let mut page = PageDocument::new();
        let section = page.insert(ComponentKind::Section, None, None).unwrap();
        let child = page.insert(ComponentKind::TextBlock, Some(section), None).unwrap();
        let other = page.insert(ComponentKind::Footer, None, None).unwrap();

        let removed = page.remove(section);
        assert_eq!(removed, vec![section, child]);
        assert!(!page.contains(child));
        assert_eq!(page.children(None), vec![other]);
        assert!(page.remove(section).is_empty());
    }

    #[test]
    fn test_commit_frame_ignores_stale_ids() {
        let mut page = PageDocument::new();
        let frame = FreeformRect::new(0.0, 0.0, 200.0, 100.0);
        assert!(!page.commit_frame(Uuid::new_v4(), frame));
        let id = page.insert(ComponentKind::Image, None, None).unwrap();
        assert!(page.commit_frame(id, frame));
        assert_eq!(page.get(id).unwrap().freeform, Some(frame));
    }

    #[test]
    fn test_undersized_frame_never_reaches_render_plan() {
        let mut page = PageDocument::new();
        page.set_layout_mode(LayoutMode::Freeform);
        let id = page.insert(ComponentKind::Button, None, None).unwrap();
        let tiny = FreeformRect { x: 0.0, y: 0.0, width: 5.0, height: 5.0 };
        assert!(page.commit_frame(id, tiny));

        let plan = page.render_plan(DeviceMode::Desktop);
        let frame = plan[0].frame.unwrap();
        assert!((frame.width - 100.0).abs() < f64::EPSILON);
        assert!((frame.height - 50.0).abs() < f64::EPSILON);
        assert_eq!(page.get(id).unwrap().freeform(), Some(frame));
    }

    #[test]
    fn test_seed_missing_frames_stacks_roots() {
        let mut page = PageDocument::new();
        let a = page.insert(ComponentKind::Navbar, None, None).unwrap();
        let b = page
            .insert(ComponentKind::Image, None, Some(FreeformRect::new(0.0, 200.0, 300.0, 100.0)))
            .unwrap();
        let c = page.insert(ComponentKind::Footer, None, None).unwrap();

        let seeded = page.seed_missing_frames(Point::ZERO, 20.0, |_| Size::new(400.0, 80.0));
        assert_eq!(seeded, 2);
        assert_eq!(page.get(a).unwrap().freeform, Some(FreeformRect::new(0.0, 0.0, 400.0, 80.0)));
        assert_eq!(page.get(b).unwrap().freeform, Some(FreeformRect::new(0.0, 200.0, 300.0, 100.0)));
        assert_eq!(page.get(c).unwrap().freeform, Some(FreeformRect::new(0.0, 320.0, 400.0, 80.0)));
    }

    #[test]
    fn test_render_plan_keeps_hidden_slots() {
        let mut page = PageDocument::new();
        let section = page.insert(ComponentKind::Section, None, None).unwrap();
        let text = page.insert(ComponentKind::TextBlock, Some(section), None).unwrap();
        let footer = page.insert(ComponentKind::Footer, None, None).unwrap();
        page.set_visibility(text, VisibilityFlags { hide_on_mobile: true, ..Default::default() })
            .unwrap();

        let plan = page.render_plan(DeviceMode::Mobile);
        let ids: Vec<_> = plan.iter().map(|slot| (slot.id, slot.depth)).collect();
        assert_eq!(ids, vec![(section, 0), (text, 1), (footer, 0)]);
        assert_eq!(plan[1].visibility, Visibility::HiddenPlaceholder);
        assert!(plan.iter().all(|slot| slot.frame.is_none()));

        let desktop = page.render_plan(DeviceMode::Desktop);
        assert_eq!(desktop[1].visibility, Visibility::Visible);
    }
}
