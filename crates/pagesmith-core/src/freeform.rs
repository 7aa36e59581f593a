//! Free-form drag and resize state machine.
//!
//! One controller exists per editor. It sits in `Idle` until a pointer-down
//! on a component body (→ `Dragging`) or a corner handle (→ `Resizing`),
//! consumes pointer moves, and returns to `Idle` on pointer-up. Global
//! pointer listeners are leased for exactly the lifetime of a gesture.

use crate::handles::HandleKind;
use crate::listeners::{ListenerLease, ListenerRegistry};
use crate::page::ComponentId;
use crate::viewport::ViewportTransform;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Minimum free-form width in logical units.
pub const MIN_WIDTH: f64 = 100.0;
/// Minimum free-form height in logical units.
pub const MIN_HEIGHT: f64 = 50.0;

/// Absolute position and size of a free-form component, in logical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FreeformRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FreeformRect {
    /// Build a frame, clamping the size to the minimums.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(MIN_WIDTH),
            height: height.max(MIN_HEIGHT),
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Same frame with the size minimums enforced.
    pub fn clamped(self) -> Self {
        Self::new(self.x, self.y, self.width, self.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// One committed move or resize step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionChange {
    pub id: ComponentId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PositionChange {
    pub fn new(id: ComponentId, frame: FreeformRect) -> Self {
        Self {
            id,
            x: frame.x,
            y: frame.y,
            width: frame.width,
            height: frame.height,
        }
    }

    pub fn frame(&self) -> FreeformRect {
        FreeformRect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// Receiver of `on_component_position_change(id, x, y, width, height)`.
///
/// The receiver persists the value; the id may no longer exist by the
/// time it arrives.
pub trait PositionSink {
    fn on_component_position_change(&mut self, change: PositionChange);
}

impl<F: FnMut(PositionChange)> PositionSink for F {
    fn on_component_position_change(&mut self, change: PositionChange) {
        (self)(change)
    }
}

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Body,
    Handle(HandleKind),
}

/// Current gesture.
#[derive(Debug, Clone, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging {
        id: ComponentId,
        /// Pointer offset from the frame's top-left, in logical units.
        offset: Vec2,
        /// Last committed frame.
        frame: FreeformRect,
    },
    Resizing {
        id: ComponentId,
        handle: HandleKind,
        /// Screen position of the previous pointer event.
        last_screen: Point,
        /// Last committed frame.
        frame: FreeformRect,
    },
}

impl GestureState {
    pub fn component(&self) -> Option<ComponentId> {
        match self {
            GestureState::Idle => None,
            GestureState::Dragging { id, .. } | GestureState::Resizing { id, .. } => Some(*id),
        }
    }
}

/// The drag/resize state machine.
pub struct FreeformLayoutController {
    state: GestureState,
    registry: Rc<dyn ListenerRegistry>,
    lease: Option<ListenerLease>,
}

impl std::fmt::Debug for FreeformLayoutController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreeformLayoutController")
            .field("state", &self.state)
            .field("listening", &self.lease.is_some())
            .finish()
    }
}

impl FreeformLayoutController {
    pub fn new(registry: Rc<dyn ListenerRegistry>) -> Self {
        Self {
            state: GestureState::Idle,
            registry,
            lease: None,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, GestureState::Idle)
    }

    /// The component being manipulated, if any.
    pub fn active_component(&self) -> Option<ComponentId> {
        self.state.component()
    }

    /// Route a pointer-down to drag or resize. Handles win over the body.
    pub fn pointer_down(
        &mut self,
        id: ComponentId,
        target: PointerTarget,
        frame: FreeformRect,
        screen: Point,
        viewport: &ViewportTransform,
    ) -> bool {
        match target {
            PointerTarget::Handle(handle) => self.begin_resize(id, handle, frame, screen),
            PointerTarget::Body => self.begin_drag(id, frame, screen, viewport),
        }
    }

    /// Enter `Dragging`, recording the pointer's offset from the frame origin.
    pub fn begin_drag(
        &mut self,
        id: ComponentId,
        frame: FreeformRect,
        screen: Point,
        viewport: &ViewportTransform,
    ) -> bool {
        if !self.can_begin(id) {
            return false;
        }
        let pointer = viewport.screen_point_to_logical(screen);
        let offset = pointer - frame.origin();
        log::debug!("drag start on {id} at offset ({:.1}, {:.1})", offset.x, offset.y);
        self.state = GestureState::Dragging { id, offset, frame };
        self.lease = Some(ListenerLease::acquire(Rc::clone(&self.registry)));
        true
    }

    /// Enter `Resizing` from one of the corner handles.
    pub fn begin_resize(
        &mut self,
        id: ComponentId,
        handle: HandleKind,
        frame: FreeformRect,
        screen: Point,
    ) -> bool {
        if !self.can_begin(id) {
            return false;
        }
        log::debug!("resize start on {id} from {handle:?}");
        self.state = GestureState::Resizing {
            id,
            handle,
            last_screen: screen,
            frame: frame.clamped(),
        };
        self.lease = Some(ListenerLease::acquire(Rc::clone(&self.registry)));
        true
    }

    fn can_begin(&self, id: ComponentId) -> bool {
        if let Some(active) = self.active_component() {
            log::warn!("ignoring gesture on {id}: {active} is already being manipulated");
            return false;
        }
        true
    }

    /// Feed a global pointer-move. Commits the new frame through `sink`.
    pub fn pointer_move(
        &mut self,
        screen: Point,
        viewport: &ViewportTransform,
        sink: &mut dyn PositionSink,
    ) -> Option<PositionChange> {
        let change = match &mut self.state {
            GestureState::Idle => return None,
            GestureState::Dragging { id, offset, frame } => {
                let pointer = viewport.screen_point_to_logical(screen);
                let origin = pointer - *offset;
                frame.x = origin.x;
                frame.y = origin.y;
                PositionChange::new(*id, *frame)
            }
            GestureState::Resizing {
                id,
                handle,
                last_screen,
                frame,
            } => {
                let delta = viewport.screen_to_logical(screen - *last_screen);
                *last_screen = screen;
                *frame = handle.apply_resize(*frame, delta);
                PositionChange::new(*id, *frame)
            }
        };
        sink.on_component_position_change(change);
        Some(change)
    }

    /// Feed a global pointer-up. Always returns to `Idle` and releases the
    /// listeners. Returns the component that was being manipulated.
    pub fn pointer_up(&mut self) -> Option<ComponentId> {
        let finished = self.state.component();
        if let Some(id) = finished {
            log::debug!("gesture on {id} finished");
        }
        self.state = GestureState::Idle;
        self.lease = None;
        finished
    }
}
