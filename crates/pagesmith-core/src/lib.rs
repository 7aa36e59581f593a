//! Pagesmith Core Library
//!
//! Platform-agnostic canvas engine for the Pagesmith page builder: viewport
//! transform, free-form drag and resize, drop zone, selection and
//! per-device visibility.

pub mod components;
pub mod config;
pub mod drop_zone;
pub mod editor;
pub mod freeform;
pub mod handles;
pub mod listeners;
pub mod page;
pub mod selection;
pub mod storage;
pub mod viewport;
pub mod visibility;

pub use components::{Category, ComponentKind, ComponentRegistry, KindDescriptor};
pub use config::{ConfigError, EditorConfig};
pub use drop_zone::{DragDisposition, DragPayload, DropZoneController, PlacementHandler};
pub use editor::{DeviceBinding, EditorContext, EditorObserver, NullObserver};
pub use freeform::{FreeformLayoutController, FreeformRect, GestureState, PointerTarget, PositionChange, PositionSink};
pub use handles::{Handle, HandleKind};
pub use listeners::{ListenerLease, ListenerRegistry, ListenerToken, NoopRegistry};
pub use page::{ComponentId, LayoutMode, PageDocument, PageError, PlacedComponent, RenderSlot};
pub use selection::SelectionModel;
pub use storage::{KeyValueStore, MemoryStore, RecentComponents, StorageError, StorageResult};
pub use viewport::{DeviceMode, ViewportTransform, ZoomLevel};
pub use visibility::{Visibility, VisibilityFlags};
