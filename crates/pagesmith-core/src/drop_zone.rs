//! Root-level drop target of the canvas.
//!
//! The controller only knows whether a drag is hovering the canvas root and
//! forwards drops to the placement callback. Deciding which nested
//! container receives a drop belongs to the component renderer, which calls
//! [`DropZoneController::forward_nested_drop`] with the parent it resolved.

use crate::components::ComponentKind;
use crate::page::ComponentId;
use serde::{Deserialize, Serialize};

/// What a drag gesture carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPayload {
    /// A template from the palette, not placed yet.
    Template(ComponentKind),
    /// A placed component being relocated.
    Existing(ComponentId),
}

/// How the host should treat the platform's drag event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragDisposition {
    /// Suppress the platform default so the drop is accepted.
    Accept,
}

impl DragDisposition {
    pub fn prevent_default(self) -> bool {
        matches!(self, DragDisposition::Accept)
    }
}

/// Receiver of `on_drop(payload, parent_id?)`.
pub trait PlacementHandler {
    fn on_drop(&mut self, payload: DragPayload, parent: Option<ComponentId>);
}

impl<F: FnMut(DragPayload, Option<ComponentId>)> PlacementHandler for F {
    fn on_drop(&mut self, payload: DragPayload, parent: Option<ComponentId>) {
        (self)(payload, parent)
    }
}

/// Hover state of the canvas root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropZoneController {
    hovering: bool,
}

impl DropZoneController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drives the drop highlight.
    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    pub fn drag_enter(&mut self) -> DragDisposition {
        self.hovering = true;
        DragDisposition::Accept
    }

    pub fn drag_over(&mut self) -> DragDisposition {
        self.hovering = true;
        DragDisposition::Accept
    }

    pub fn drag_leave(&mut self) {
        self.hovering = false;
    }

    /// Finish a drop on the root. Without a payload nothing is placed.
    pub fn drop(&mut self, payload: Option<DragPayload>, handler: &mut dyn PlacementHandler) -> bool {
        self.hovering = false;
        match payload {
            Some(payload) => {
                handler.on_drop(payload, None);
                true
            }
            None => {
                log::debug!("drop without payload ignored");
                false
            }
        }
    }

    /// Forward a drop the component renderer resolved to `parent`.
    pub fn forward_nested_drop(
        &mut self,
        payload: DragPayload,
        parent: ComponentId,
        handler: &mut dyn PlacementHandler,
    ) {
        self.hovering = false;
        handler.on_drop(payload, Some(parent));
    }
}
