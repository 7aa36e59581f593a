//! Editor context: the single owner of canvas state.
//!
//! Routes pointer, click and drag events to the viewport, selection, drop
//! zone and free-form controller, applies their results to the page, and
//! reports every boundary callback to an [`EditorObserver`].

use crate::components::{ComponentKind, ComponentRegistry};
use crate::config::EditorConfig;
use crate::drop_zone::{DragDisposition, DragPayload, DropZoneController, PlacementHandler};
use crate::freeform::{FreeformLayoutController, FreeformRect, PointerTarget, PositionChange};
use crate::handles::{HandleKind, hit_test_handles};
use crate::listeners::{ListenerRegistry, NoopRegistry};
use crate::page::{ComponentId, LayoutMode, PageDocument, PageError, RenderSlot};
use crate::selection::SelectionModel;
use crate::viewport::{DeviceMode, ViewportTransform};
use crate::visibility::VisibilityFlags;
use kurbo::Point;
use std::fmt;
use std::rc::Rc;

/// Receives the editor's boundary callbacks. Every method defaults to a no-op.
pub trait EditorObserver {
    /// A drop was placed under `parent` (the root for `None`).
    fn on_drop(&mut self, _payload: DragPayload, _parent: Option<ComponentId>, _placed: ComponentId) {}

    /// A click or pointer-down changed the selection.
    fn on_select_component(&mut self, _id: Option<ComponentId>, _multi_select: bool) {}

    /// A drag or resize step was committed to the page.
    fn on_component_position_change(&mut self, _change: PositionChange) {}

    /// Components removed from the page, subtree included.
    fn on_components_removed(&mut self, _ids: &[ComponentId]) {}

    /// The active device changed.
    fn on_device_change(&mut self, _device: DeviceMode) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default)]
pub struct NullObserver;

impl EditorObserver for NullObserver {}

/// Who owns the active device mode.
pub enum DeviceBinding {
    /// The editor keeps the value itself.
    Owned,
    /// A collaborator owns the value. Changes are requested through the
    /// setter and applied when the collaborator calls
    /// [`EditorContext::sync_device_mode`].
    Controlled(Box<dyn FnMut(DeviceMode)>),
}

impl fmt::Debug for DeviceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceBinding::Owned => f.write_str("Owned"),
            DeviceBinding::Controlled(_) => f.write_str("Controlled"),
        }
    }
}

/// Places drops into the page.
struct Placement<'a> {
    page: &'a mut PageDocument,
    components: &'a ComponentRegistry,
    config: &'a EditorConfig,
    placed: Option<ComponentId>,
}

impl Placement<'_> {
    fn default_frame(&self, kind: ComponentKind) -> FreeformRect {
        FreeformRect::from_origin_size(
            self.config.drop_origin,
            self.components.default_size(kind, self.config.fallback_size),
        )
    }

    fn place(&mut self, payload: DragPayload, parent: Option<ComponentId>) -> Result<ComponentId, PageError> {
        if let Some(parent) = parent {
            let kind = self.page.get(parent).ok_or(PageError::UnknownComponent(parent))?.kind;
            if !self.components.is_container(kind) {
                return Err(PageError::NotAContainer(parent));
            }
        }
        let freeform_root = parent.is_none() && self.page.layout_mode() == LayoutMode::Freeform;

        match payload {
            DragPayload::Template(kind) => {
                let frame = freeform_root.then(|| self.default_frame(kind));
                self.page.insert(kind, parent, frame)
            }
            DragPayload::Existing(id) => {
                self.page.relocate(id, parent)?;
                let unframed = self.page.get(id).filter(|c| c.freeform.is_none()).map(|c| c.kind);
                if let (true, Some(kind)) = (freeform_root, unframed) {
                    let frame = self.default_frame(kind);
                    self.page.commit_frame(id, frame);
                }
                Ok(id)
            }
        }
    }
}

impl PlacementHandler for Placement<'_> {
    fn on_drop(&mut self, payload: DragPayload, parent: Option<ComponentId>) {
        match self.place(payload, parent) {
            Ok(id) => {
                log::debug!("placed {id} under {parent:?}");
                self.placed = Some(id);
            }
            Err(e) => log::warn!("drop rejected: {e}"),
        }
    }
}

/// The canvas editor.
pub struct EditorContext {
    page: PageDocument,
    viewport: ViewportTransform,
    device_binding: DeviceBinding,
    selection: SelectionModel,
    drop_zone: DropZoneController,
    freeform: FreeformLayoutController,
    components: ComponentRegistry,
    config: EditorConfig,
    observer: Box<dyn EditorObserver>,
}

impl fmt::Debug for EditorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorContext")
            .field("page", &self.page)
            .field("viewport", &self.viewport)
            .field("device_binding", &self.device_binding)
            .field("selection", &self.selection)
            .field("drop_zone", &self.drop_zone)
            .field("freeform", &self.freeform)
            .finish_non_exhaustive()
    }
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::new(EditorConfig::default(), Rc::new(NoopRegistry))
    }
}

impl EditorContext {
    /// Create an editor with an empty stack-layout page.
    pub fn new(config: EditorConfig, listeners: Rc<dyn ListenerRegistry>) -> Self {
        let viewport = ViewportTransform::new(config.default_zoom, config.default_device);
        Self {
            page: PageDocument::new(),
            viewport,
            device_binding: DeviceBinding::Owned,
            selection: SelectionModel::new(),
            drop_zone: DropZoneController::new(),
            freeform: FreeformLayoutController::new(listeners),
            components: ComponentRegistry::builtin(),
            config,
            observer: Box::new(NullObserver),
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn EditorObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_components(mut self, components: ComponentRegistry) -> Self {
        self.components = components;
        self
    }

    /// Hand ownership of the device mode to a collaborator.
    pub fn with_controlled_device(mut self, initial: DeviceMode, setter: Box<dyn FnMut(DeviceMode)>) -> Self {
        self.viewport.set_device(initial);
        self.device_binding = DeviceBinding::Controlled(setter);
        self
    }

    pub fn page(&self) -> &PageDocument {
        &self.page
    }

    /// Kind-specific properties of a placed component.
    pub fn props_mut(&mut self, id: ComponentId) -> Option<&mut serde_json::Value> {
        self.page.get_mut(id).map(|c| &mut c.props)
    }

    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn drop_zone(&self) -> &DropZoneController {
        &self.drop_zone
    }

    pub fn freeform(&self) -> &FreeformLayoutController {
        &self.freeform
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn device_binding(&self) -> &DeviceBinding {
        &self.device_binding
    }

    /// Update where the host placed the canvas and how wide it is.
    pub fn set_host_geometry(&mut self, anchor: Point, available_width: f64) {
        self.viewport.set_host_geometry(anchor, available_width);
    }

    fn is_interactive(&self, id: ComponentId) -> bool {
        self.page
            .get(id)
            .is_some_and(|c| c.visibility_on(self.viewport.device()).is_interactive())
    }

    /// Deselect `id` and end its gesture if it is hidden on the active device.
    fn release_if_hidden(&mut self, id: ComponentId) {
        if !self.page.contains(id) || self.is_interactive(id) {
            return;
        }
        self.selection.remove(id);
        if self.freeform.active_component() == Some(id) {
            log::debug!("{id} hidden mid-gesture");
            self.freeform.pointer_up();
        }
    }

    /// Change a component's per-device visibility.
    pub fn set_visibility(&mut self, id: ComponentId, flags: VisibilityFlags) -> Result<(), PageError> {
        self.page.set_visibility(id, flags)?;
        self.release_if_hidden(id);
        Ok(())
    }

    fn select(&mut self, id: Option<ComponentId>, multi_select: bool) {
        self.selection.select(id, multi_select);
        self.observer.on_select_component(id, multi_select);
    }

    // --- Selection ---

    /// Apply a selection click. Hidden or unknown components are ignored.
    pub fn click(&mut self, id: Option<ComponentId>, multi_select: bool) -> bool {
        if let Some(id) = id {
            if !self.is_interactive(id) {
                log::debug!("click on non-interactive component {id} ignored");
                return false;
            }
        }
        self.select(id, multi_select);
        true
    }

    // --- Pointer gestures ---

    /// The front-most interactive free-form component under `screen`.
    pub fn hit_test(&self, screen: Point) -> Option<(ComponentId, PointerTarget, FreeformRect)> {
        if self.page.layout_mode() != LayoutMode::Freeform {
            return None;
        }
        let logical = self.viewport.screen_point_to_logical(screen);
        let tolerance = self.config.handle_tolerance / self.viewport.scale();

        self.page
            .freeform_roots_front_to_back()
            .into_iter()
            .filter(|(id, _)| self.is_interactive(*id))
            .find_map(|(id, frame)| {
                if let Some(handle) = hit_test_handles(&frame, logical, tolerance) {
                    Some((id, PointerTarget::Handle(handle), frame))
                } else if frame.as_rect().contains(logical) {
                    Some((id, PointerTarget::Body, frame))
                } else {
                    None
                }
            })
    }

    /// Pointer-down on the canvas in free-form mode.
    ///
    /// Selection is updated first, then the gesture begins. Returns whether
    /// a drag or resize started.
    pub fn pointer_down(&mut self, screen: Point, multi_select: bool) -> bool {
        if self.page.layout_mode() != LayoutMode::Freeform {
            return false;
        }
        match self.hit_test(screen) {
            Some((id, target, frame)) => {
                self.select(Some(id), multi_select);
                self.freeform.pointer_down(id, target, frame, screen, &self.viewport)
            }
            None => {
                if !multi_select {
                    self.select(None, false);
                }
                false
            }
        }
    }

    fn gesture_frame(&self, id: ComponentId) -> Option<FreeformRect> {
        if self.page.layout_mode() != LayoutMode::Freeform || !self.is_interactive(id) {
            log::debug!("gesture on {id} refused: not an interactive free-form component");
            return None;
        }
        self.page.get(id).and_then(|c| c.freeform)
    }

    /// Start a drag for hosts that hit-test themselves.
    pub fn begin_drag(&mut self, id: ComponentId, screen: Point) -> bool {
        match self.gesture_frame(id) {
            Some(frame) => self.freeform.begin_drag(id, frame, screen, &self.viewport),
            None => false,
        }
    }

    /// Start a resize for hosts that hit-test themselves.
    pub fn begin_resize(&mut self, id: ComponentId, handle: HandleKind, screen: Point) -> bool {
        match self.gesture_frame(id) {
            Some(frame) => self.freeform.begin_resize(id, handle, frame, screen),
            None => false,
        }
    }

    /// Global pointer-move. Commits to the page unless the component is gone
    /// or hidden on the active device.
    pub fn pointer_move(&mut self, screen: Point) -> Option<PositionChange> {
        let device = self.viewport.device();
        let page = &mut self.page;
        let observer = &mut self.observer;
        let mut sink = |change: PositionChange| {
            let hidden = page
                .get(change.id)
                .is_some_and(|c| !c.visibility_on(device).is_interactive());
            if hidden {
                log::debug!("commit for hidden component {} ignored", change.id);
                return;
            }
            if page.commit_frame(change.id, change.frame()) {
                observer.on_component_position_change(change);
            }
        };
        self.freeform.pointer_move(screen, &self.viewport, &mut sink)
    }

    /// Global pointer-up.
    pub fn pointer_up(&mut self) -> Option<ComponentId> {
        self.freeform.pointer_up()
    }

    // --- Drag and drop ---

    pub fn drag_enter(&mut self) -> DragDisposition {
        self.drop_zone.drag_enter()
    }

    pub fn drag_over(&mut self) -> DragDisposition {
        self.drop_zone.drag_over()
    }

    pub fn drag_leave(&mut self) {
        self.drop_zone.drag_leave();
    }

    /// Drop on the canvas root. Returns the placed or relocated component.
    pub fn drop(&mut self, payload: Option<DragPayload>) -> Option<ComponentId> {
        let mut placement = Placement {
            page: &mut self.page,
            components: &self.components,
            config: &self.config,
            placed: None,
        };
        self.drop_zone.drop(payload, &mut placement);
        let placed = placement.placed?;
        if let Some(payload) = payload {
            self.observer.on_drop(payload, None, placed);
        }
        Some(placed)
    }

    /// Drop resolved by the component renderer onto container `parent`.
    pub fn nested_drop(&mut self, payload: DragPayload, parent: ComponentId) -> Option<ComponentId> {
        let mut placement = Placement {
            page: &mut self.page,
            components: &self.components,
            config: &self.config,
            placed: None,
        };
        self.drop_zone.forward_nested_drop(payload, parent, &mut placement);
        let placed = placement.placed?;
        self.observer.on_drop(payload, Some(parent), placed);
        Some(placed)
    }

    // --- Zoom, device and layout ---

    pub fn zoom_in(&mut self) -> bool {
        self.viewport.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.viewport.zoom_out()
    }

    pub fn reset_zoom(&mut self) -> bool {
        self.viewport.reset_zoom()
    }

    /// Request a device change. Controlled bindings only forward the request.
    pub fn set_device_mode(&mut self, device: DeviceMode) {
        if let DeviceBinding::Controlled(setter) = &mut self.device_binding {
            setter(device);
            return;
        }
        self.sync_device_mode(device);
    }

    /// Apply a device value. Selected components hidden on the new device
    /// are deselected, and a gesture on one of them ends.
    pub fn sync_device_mode(&mut self, device: DeviceMode) {
        if self.viewport.device() == device {
            return;
        }
        log::info!("device mode: {}", device.as_str());
        self.viewport.set_device(device);
        let page = &self.page;
        self.selection.retain_existing(|id| {
            page.get(id)
                .is_some_and(|c| c.visibility_on(device).is_interactive())
        });
        if let Some(active) = self.freeform.active_component() {
            self.release_if_hidden(active);
        }
        self.observer.on_device_change(device);
    }

    /// Switch the page layout. Entering free-form seeds frames for roots
    /// without one; leaving it ends any running gesture.
    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        if self.page.layout_mode() == mode {
            return;
        }
        match mode {
            LayoutMode::Freeform => {
                let components = &self.components;
                let fallback = self.config.fallback_size;
                let seeded = self.page.seed_missing_frames(
                    self.config.drop_origin,
                    self.config.stack_spacing,
                    |kind| components.default_size(kind, fallback),
                );
                log::debug!("seeded {seeded} free-form frames");
            }
            LayoutMode::Stack => {
                self.freeform.pointer_up();
            }
        }
        self.page.set_layout_mode(mode);
    }

    // --- Page ---

    /// Remove a component and its subtree. A gesture on it keeps running
    /// until pointer-up; its commits are ignored.
    pub fn remove_component(&mut self, id: ComponentId) -> Vec<ComponentId> {
        let removed = self.page.remove(id);
        if removed.is_empty() {
            return removed;
        }
        for other in &removed {
            self.selection.remove(*other);
        }
        self.observer.on_components_removed(&removed);
        removed
    }

    /// Render slots for the active device.
    pub fn render_plan(&self) -> Vec<RenderSlot> {
        self.page.render_plan(self.viewport.device())
    }
}
