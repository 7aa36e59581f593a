//! Viewport transform for zoom and device preview.
//!
//! The canvas is scaled uniformly around its top-center. Every pointer
//! delta is converted to logical units before it touches a component, so
//! drag and resize track the pointer 1:1 at any zoom level.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Logical width of the tablet preview.
pub const TABLET_WIDTH: f64 = 768.0;
/// Logical width of the mobile preview.
pub const MOBILE_WIDTH: f64 = 375.0;

/// Host width assumed until the host reports its geometry.
const DEFAULT_AVAILABLE_WIDTH: f64 = 1280.0;

/// Device the canvas is previewed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceMode {
    /// Fluid width, fills the host.
    #[default]
    Desktop,
    /// Fixed 768 logical units.
    Tablet,
    /// Fixed 375 logical units.
    Mobile,
}

impl DeviceMode {
    /// All device modes, widest first.
    pub const ALL: [DeviceMode; 3] = [DeviceMode::Desktop, DeviceMode::Tablet, DeviceMode::Mobile];

    /// Fixed logical width, or `None` when the canvas is fluid.
    pub fn fixed_width(self) -> Option<f64> {
        match self {
            DeviceMode::Desktop => None,
            DeviceMode::Tablet => Some(TABLET_WIDTH),
            DeviceMode::Mobile => Some(MOBILE_WIDTH),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceMode::Desktop => "desktop",
            DeviceMode::Tablet => "tablet",
            DeviceMode::Mobile => "mobile",
        }
    }
}

/// Zoom percentage, always a multiple of [`ZoomLevel::STEP`] in
/// `[ZoomLevel::MIN, ZoomLevel::MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub struct ZoomLevel(u16);

impl ZoomLevel {
    pub const MIN: u16 = 50;
    pub const MAX: u16 = 200;
    pub const STEP: u16 = 10;
    pub const DEFAULT: ZoomLevel = ZoomLevel(100);

    /// Build a zoom level, snapping to the nearest step and clamping to range.
    pub fn new(percent: u16) -> Self {
        let clamped = percent.clamp(Self::MIN, Self::MAX);
        let snapped = (clamped + Self::STEP / 2) / Self::STEP * Self::STEP;
        Self(snapped.min(Self::MAX))
    }

    pub fn percent(self) -> u16 {
        self.0
    }

    /// Pixel scale factor (`percent / 100`).
    pub fn scale(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// One step closer in. Unchanged at the upper bound.
    pub fn stepped_in(self) -> Self {
        if self.0 >= Self::MAX {
            self
        } else {
            Self(self.0 + Self::STEP)
        }
    }

    /// One step further out. Unchanged at the lower bound.
    pub fn stepped_out(self) -> Self {
        if self.0 <= Self::MIN {
            self
        } else {
            Self(self.0 - Self::STEP)
        }
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u16> for ZoomLevel {
    fn from(percent: u16) -> Self {
        Self::new(percent)
    }
}

impl From<ZoomLevel> for u16 {
    fn from(zoom: ZoomLevel) -> Self {
        zoom.0
    }
}

/// Maps between screen pixels and canvas-logical units.
///
/// `anchor` is the screen position of the canvas top-center, which stays
/// fixed while zooming. `available_width` is the unscaled width the host
/// gives the canvas; it becomes the logical width in desktop mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportTransform {
    zoom: ZoomLevel,
    device: DeviceMode,
    available_width: f64,
    anchor: Point,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            zoom: ZoomLevel::DEFAULT,
            device: DeviceMode::default(),
            available_width: DEFAULT_AVAILABLE_WIDTH,
            anchor: Point::new(DEFAULT_AVAILABLE_WIDTH / 2.0, 0.0),
        }
    }
}

impl ViewportTransform {
    pub fn new(zoom: ZoomLevel, device: DeviceMode) -> Self {
        Self {
            zoom,
            device,
            ..Self::default()
        }
    }

    pub fn zoom(&self) -> ZoomLevel {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: ZoomLevel) {
        self.zoom = zoom;
    }

    pub fn device(&self) -> DeviceMode {
        self.device
    }

    pub fn set_device(&mut self, device: DeviceMode) {
        self.device = device;
    }

    /// Zoom in one step. Returns false at the upper bound.
    pub fn zoom_in(&mut self) -> bool {
        let next = self.zoom.stepped_in();
        let changed = next != self.zoom;
        self.zoom = next;
        changed
    }

    /// Zoom out one step. Returns false at the lower bound.
    pub fn zoom_out(&mut self) -> bool {
        let next = self.zoom.stepped_out();
        let changed = next != self.zoom;
        self.zoom = next;
        changed
    }

    /// Back to 100%. Returns whether the zoom changed.
    pub fn reset_zoom(&mut self) -> bool {
        let changed = self.zoom != ZoomLevel::DEFAULT;
        self.zoom = ZoomLevel::DEFAULT;
        changed
    }

    /// Label shown in the zoom control, e.g. `"120%"`.
    pub fn zoom_label(&self) -> String {
        format!("{}%", self.zoom.percent())
    }

    pub fn scale(&self) -> f64 {
        self.zoom.scale()
    }

    /// Update where the host placed the canvas and how wide it is.
    pub fn set_host_geometry(&mut self, anchor: Point, available_width: f64) {
        self.anchor = anchor;
        self.available_width = available_width.max(0.0);
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Logical canvas width for the active device.
    pub fn logical_width(&self) -> f64 {
        self.device.fixed_width().unwrap_or(self.available_width)
    }

    /// Logical to screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.anchor.to_vec2())
            * Affine::scale(self.scale())
            * Affine::translate((-self.logical_width() / 2.0, 0.0))
    }

    /// Screen to logical transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::translate((self.logical_width() / 2.0, 0.0))
            * Affine::scale(1.0 / self.scale())
            * Affine::translate(-self.anchor.to_vec2())
    }

    /// Convert a screen-space delta to logical units.
    pub fn screen_to_logical(&self, delta: Vec2) -> Vec2 {
        delta / self.scale()
    }

    /// Convert a logical delta to screen pixels.
    pub fn logical_to_screen(&self, delta: Vec2) -> Vec2 {
        delta * self.scale()
    }

    pub fn screen_point_to_logical(&self, screen: Point) -> Point {
        self.inverse_transform() * screen
    }

    pub fn logical_point_to_screen(&self, logical: Point) -> Point {
        self.transform() * logical
    }
}
