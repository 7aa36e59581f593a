//! Per-device visibility of placed components.

use crate::viewport::DeviceMode;
use serde::{Deserialize, Serialize};

/// Independent hide flags, one per device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisibilityFlags {
    pub hide_on_mobile: bool,
    pub hide_on_tablet: bool,
    pub hide_on_desktop: bool,
}

impl VisibilityFlags {
    /// Flags with every device visible.
    pub const VISIBLE: VisibilityFlags = VisibilityFlags {
        hide_on_mobile: false,
        hide_on_tablet: false,
        hide_on_desktop: false,
    };

    /// The flag that applies to `device`.
    pub fn hidden_on(&self, device: DeviceMode) -> bool {
        match device {
            DeviceMode::Mobile => self.hide_on_mobile,
            DeviceMode::Tablet => self.hide_on_tablet,
            DeviceMode::Desktop => self.hide_on_desktop,
        }
    }

    pub fn set_hidden_on(&mut self, device: DeviceMode, hidden: bool) {
        match device {
            DeviceMode::Mobile => self.hide_on_mobile = hidden,
            DeviceMode::Tablet => self.hide_on_tablet = hidden,
            DeviceMode::Desktop => self.hide_on_desktop = hidden,
        }
    }

    /// Hidden on every device. Legal, if not very useful.
    pub fn hidden_everywhere(&self) -> bool {
        DeviceMode::ALL.iter().all(|&device| self.hidden_on(device))
    }
}

/// How a component renders on the active device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Visible,
    /// Keeps its slot but renders a stand-in and takes no input.
    HiddenPlaceholder,
}

impl Visibility {
    /// Whether the component can be dragged, resized or selected.
    pub fn is_interactive(self) -> bool {
        matches!(self, Visibility::Visible)
    }
}

/// Evaluate a component's visibility for the active device.
pub fn evaluate(flags: &VisibilityFlags, device: DeviceMode) -> Visibility {
    if flags.hidden_on(device) {
        Visibility::HiddenPlaceholder
    } else {
        Visibility::Visible
    }
}
