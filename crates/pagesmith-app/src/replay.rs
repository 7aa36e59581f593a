//! Session replay.
//!
//! A session is a JSON array of tagged steps. Each step is applied to an
//! [`EditorContext`] and every callback the editor fires is written to the
//! output as one JSON line. Components are referred to by name: template
//! drops take the name given in `"as"`, or `<kind>-<n>` otherwise.

use pagesmith_core::{
    ComponentId, ComponentKind, ConfigError, DeviceMode, DragPayload, EditorConfig, EditorContext,
    EditorObserver, KeyValueStore, LayoutMode, NoopRegistry, PositionChange, RecentComponents,
    StorageError, VisibilityFlags,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;
use thiserror::Error;

/// Harness errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid session script: {0}")]
    Script(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Unknown component name: {0}")]
    UnknownName(String),
    #[error("Component name already in use: {0}")]
    DuplicateName(String),
    #[error("Failed to write output: {0}")]
    Output(#[source] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// Drag payload as written in a script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadRef {
    Template(ComponentKind),
    Existing(String),
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Drop {
        #[serde(default)]
        payload: Option<PayloadRef>,
        #[serde(default, rename = "as")]
        name: Option<String>,
    },
    NestedDrop {
        payload: PayloadRef,
        parent: String,
        #[serde(default, rename = "as")]
        name: Option<String>,
    },
    DragEnter,
    DragLeave,
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        multi: bool,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp,
    Click {
        #[serde(default)]
        target: Option<String>,
        #[serde(default)]
        multi: bool,
    },
    ZoomIn,
    ZoomOut,
    Device {
        mode: DeviceMode,
    },
    Layout {
        mode: LayoutMode,
    },
    Visibility {
        target: String,
        flags: VisibilityFlags,
    },
    Remove {
        target: String,
    },
}

/// Parse a session script.
pub fn parse_script(json: &str) -> AppResult<Vec<Step>> {
    Ok(serde_json::from_str(json)?)
}

#[derive(Debug)]
enum Recorded {
    Drop {
        payload: DragPayload,
        parent: Option<ComponentId>,
        placed: ComponentId,
    },
    Select {
        id: Option<ComponentId>,
        multi: bool,
    },
    Position(PositionChange),
    Removed(Vec<ComponentId>),
    Device(DeviceMode),
}

struct Recorder(Rc<RefCell<Vec<Recorded>>>);

impl EditorObserver for Recorder {
    fn on_drop(&mut self, payload: DragPayload, parent: Option<ComponentId>, placed: ComponentId) {
        self.0.borrow_mut().push(Recorded::Drop { payload, parent, placed });
    }

    fn on_select_component(&mut self, id: Option<ComponentId>, multi_select: bool) {
        self.0.borrow_mut().push(Recorded::Select { id, multi: multi_select });
    }

    fn on_component_position_change(&mut self, change: PositionChange) {
        self.0.borrow_mut().push(Recorded::Position(change));
    }

    fn on_components_removed(&mut self, ids: &[ComponentId]) {
        self.0.borrow_mut().push(Recorded::Removed(ids.to_vec()));
    }

    fn on_device_change(&mut self, device: DeviceMode) {
        self.0.borrow_mut().push(Recorded::Device(device));
    }
}

/// An editor driven by a script.
pub struct Session<S: KeyValueStore> {
    editor: EditorContext,
    events: Rc<RefCell<Vec<Recorded>>>,
    ids: HashMap<String, ComponentId>,
    names: HashMap<ComponentId, String>,
    recent: RecentComponents<S>,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(config: EditorConfig, store: S) -> Self {
        let recent = RecentComponents::load_with(store, &config.recent_key, config.recent_capacity);
        let events = Rc::new(RefCell::new(Vec::new()));
        let editor = EditorContext::new(config, Rc::new(NoopRegistry))
            .with_observer(Box::new(Recorder(Rc::clone(&events))));
        Self {
            editor,
            events,
            ids: HashMap::new(),
            names: HashMap::new(),
            recent,
        }
    }

    pub fn editor(&self) -> &EditorContext {
        &self.editor
    }

    pub fn recent(&self) -> &RecentComponents<S> {
        &self.recent
    }

    /// Id behind a script name.
    pub fn resolve(&self, name: &str) -> AppResult<ComponentId> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| AppError::UnknownName(name.to_string()))
    }

    fn label(&self, id: ComponentId) -> String {
        self.names.get(&id).cloned().unwrap_or_else(|| id.to_string())
    }

    fn payload(&self, payload: &PayloadRef) -> AppResult<DragPayload> {
        Ok(match payload {
            PayloadRef::Template(kind) => DragPayload::Template(*kind),
            PayloadRef::Existing(name) => DragPayload::Existing(self.resolve(name)?),
        })
    }

    /// First free `<kind>-<n>` name.
    fn generated_name(&self, kind: ComponentKind) -> String {
        (self.names.len() + 1..)
            .map(|n| format!("{kind}-{n}"))
            .find(|name| !self.ids.contains_key(name))
            .unwrap_or_else(|| kind.to_string())
    }

    fn ensure_free(&self, name: Option<&String>) -> AppResult<()> {
        match name {
            Some(name) if self.ids.contains_key(name) => Err(AppError::DuplicateName(name.clone())),
            _ => Ok(()),
        }
    }

    /// Name a freshly placed template and remember its kind.
    fn placed(&mut self, payload: DragPayload, placed: Option<ComponentId>, name: Option<&String>) {
        let (DragPayload::Template(kind), Some(id)) = (payload, placed) else {
            return;
        };
        let name = match name {
            Some(name) => name.clone(),
            None => self.generated_name(kind),
        };
        log::debug!("{name} is {id}");
        self.ids.insert(name.clone(), id);
        self.names.insert(id, name);
        self.recent.record(kind);
    }

    /// Apply one step and write the callbacks it produced.
    pub fn apply(&mut self, step: &Step, out: &mut dyn Write) -> AppResult<()> {
        let mut extra = Vec::new();
        match step {
            Step::Drop { payload, name } => {
                self.ensure_free(name.as_ref())?;
                let payload = payload.as_ref().map(|p| self.payload(p)).transpose()?;
                let placed = self.editor.drop(payload);
                if let Some(payload) = payload {
                    self.placed(payload, placed, name.as_ref());
                }
            }
            Step::NestedDrop { payload, parent, name } => {
                self.ensure_free(name.as_ref())?;
                let payload = self.payload(payload)?;
                let parent = self.resolve(parent)?;
                let placed = self.editor.nested_drop(payload, parent);
                self.placed(payload, placed, name.as_ref());
            }
            Step::DragEnter => {
                self.editor.drag_enter();
            }
            Step::DragLeave => self.editor.drag_leave(),
            Step::PointerDown { x, y, multi } => {
                self.editor.pointer_down(kurbo::Point::new(*x, *y), *multi);
            }
            Step::PointerMove { x, y } => {
                self.editor.pointer_move(kurbo::Point::new(*x, *y));
            }
            Step::PointerUp => {
                self.editor.pointer_up();
            }
            Step::Click { target, multi } => {
                let id = target.as_deref().map(|name| self.resolve(name)).transpose()?;
                self.editor.click(id, *multi);
            }
            Step::ZoomIn | Step::ZoomOut => {
                let changed = match step {
                    Step::ZoomIn => self.editor.zoom_in(),
                    _ => self.editor.zoom_out(),
                };
                extra.push(json!({
                    "event": "zoom",
                    "percent": self.editor.viewport().zoom().percent(),
                    "changed": changed,
                }));
            }
            Step::Device { mode } => self.editor.set_device_mode(*mode),
            Step::Layout { mode } => {
                self.editor.set_layout_mode(*mode);
                extra.push(json!({ "event": "layout", "mode": mode }));
            }
            Step::Visibility { target, flags } => {
                let id = self.resolve(target)?;
                if let Err(e) = self.editor.set_visibility(id, *flags) {
                    log::warn!("visibility change ignored: {e}");
                }
            }
            Step::Remove { target } => {
                let id = self.resolve(target)?;
                self.editor.remove_component(id);
            }
        }

        let recorded: Vec<Recorded> = self.events.borrow_mut().drain(..).collect();
        for event in recorded {
            write_line(out, &self.describe(event))?;
        }
        for line in extra {
            write_line(out, &line)?;
        }
        Ok(())
    }

    fn describe(&self, event: Recorded) -> Value {
        match event {
            Recorded::Drop { payload, parent, placed } => {
                let payload = match payload {
                    DragPayload::Template(kind) => json!({ "template": kind }),
                    DragPayload::Existing(id) => json!({ "existing": self.label(id) }),
                };
                json!({
                    "event": "drop",
                    "payload": payload,
                    "parent": parent.map(|id| self.label(id)),
                    "placed": self.label(placed),
                })
            }
            Recorded::Select { id, multi } => json!({
                "event": "select",
                "id": id.map(|id| self.label(id)),
                "multi": multi,
            }),
            Recorded::Position(change) => json!({
                "event": "position",
                "id": self.label(change.id),
                "x": change.x,
                "y": change.y,
                "width": change.width,
                "height": change.height,
            }),
            Recorded::Removed(ids) => json!({
                "event": "removed",
                "ids": ids.into_iter().map(|id| self.label(id)).collect::<Vec<_>>(),
            }),
            Recorded::Device(mode) => json!({ "event": "device", "mode": mode }),
        }
    }

    /// Write the final render plan and the recent-components list.
    pub fn finish(&self, out: &mut dyn Write) -> AppResult<()> {
        let slots: Vec<Value> = self
            .editor
            .render_plan()
            .into_iter()
            .map(|slot| {
                json!({
                    "id": self.label(slot.id),
                    "kind": slot.kind,
                    "depth": slot.depth,
                    "visible": slot.visibility.is_interactive(),
                    "frame": slot.frame,
                })
            })
            .collect();
        write_line(out, &json!({ "event": "render_plan", "slots": slots }))?;
        write_line(out, &json!({ "event": "recent", "kinds": self.recent.items() }))
    }
}

fn write_line(out: &mut dyn Write, value: &Value) -> AppResult<()> {
    writeln!(out, "{value}").map_err(AppError::Output)
}

/// Replay `steps` against a fresh editor.
pub fn run<S: KeyValueStore>(
    steps: &[Step],
    config: EditorConfig,
    store: S,
    out: &mut dyn Write,
) -> AppResult<()> {
    let mut session = Session::new(config, store);
    for step in steps {
        session.apply(step, out)?;
    }
    session.finish(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesmith_core::MemoryStore;

    fn replay(script: &str) -> Vec<Value> {
        let steps = parse_script(script).unwrap();
        let mut out = Vec::new();
        run(&steps, EditorConfig::default(), MemoryStore::new(), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_parse_steps() {
        let steps = parse_script(
            r#"[
                {"step": "drop", "payload": {"template": "hero-full"}, "as": "hero"},
                {"step": "pointer_down", "x": 1, "y": 2},
                {"step": "zoom_in"},
                {"step": "device", "mode": "tablet"}
            ]"#,
        )
        .unwrap();
        assert_eq!(
            steps[0],
            Step::Drop {
                payload: Some(PayloadRef::Template(ComponentKind::HeroFull)),
                name: Some("hero".to_string()),
            }
        );
        assert_eq!(steps[1], Step::PointerDown { x: 1.0, y: 2.0, multi: false });
        assert_eq!(steps[2], Step::ZoomIn);
        assert_eq!(steps[3], Step::Device { mode: DeviceMode::Tablet });
    }

    #[test]
    fn test_freeform_drag_session() {
        let lines = replay(
            r#"[
                {"step": "layout", "mode": "freeform"},
                {"step": "drop", "payload": {"template": "image"}, "as": "photo"},
                {"step": "pointer_down", "x": 100, "y": 100},
                {"step": "pointer_move", "x": 130, "y": 90},
                {"step": "pointer_up"}
            ]"#,
        );
        assert_eq!(lines[0]["event"], "layout");
        assert_eq!(lines[1]["event"], "drop");
        assert_eq!(lines[1]["placed"], "photo");
        assert_eq!(lines[1]["payload"]["template"], "image");
        assert_eq!(lines[2]["event"], "select");
        assert_eq!(lines[2]["id"], "photo");
        assert_eq!(lines[3]["event"], "position");
        assert_eq!(lines[3]["x"], 80.0);
        assert_eq!(lines[3]["y"], 40.0);

        let plan = &lines[4];
        assert_eq!(plan["event"], "render_plan");
        assert_eq!(plan["slots"][0]["frame"]["x"], 80.0);
        assert_eq!(lines[5]["kinds"], json!(["image"]));
    }

    #[test]
    fn test_drop_without_payload_is_silent() {
        let lines = replay(r#"[{"step": "drag_enter"}, {"step": "drop"}]"#);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "render_plan");
        assert_eq!(lines[0]["slots"], json!([]));
    }

    #[test]
    fn test_zoom_bounds_reported() {
        let script = format!("[{}]", vec![r#"{"step": "zoom_in"}"#; 11].join(","));
        let lines = replay(&script);
        assert_eq!(lines[9]["percent"], 200);
        assert_eq!(lines[9]["changed"], true);
        assert_eq!(lines[10]["percent"], 200);
        assert_eq!(lines[10]["changed"], false);
    }

    #[test]
    fn test_nested_drop_and_remove() {
        let lines = replay(
            r#"[
                {"step": "drop", "payload": {"template": "section"}, "as": "main"},
                {"step": "nested_drop", "payload": {"template": "button"}, "parent": "main"},
                {"step": "remove", "target": "main"}
            ]"#,
        );
        assert_eq!(lines[1]["parent"], "main");
        assert_eq!(lines[1]["placed"], "button-2");
        assert_eq!(lines[2]["event"], "removed");
        assert_eq!(lines[2]["ids"], json!(["main", "button-2"]));
        assert_eq!(lines[4]["kinds"], json!(["button", "section"]));
    }

    #[test]
    fn test_hidden_click_ignored() {
        let lines = replay(
            r#"[
                {"step": "drop", "payload": {"template": "video"}, "as": "clip"},
                {"step": "visibility", "target": "clip", "flags": {"hideOnMobile": true}},
                {"step": "device", "mode": "mobile"},
                {"step": "click", "target": "clip"}
            ]"#,
        );
        assert_eq!(lines[1]["event"], "device");
        assert_eq!(lines[2]["event"], "render_plan");
        assert_eq!(lines[2]["slots"][0]["visible"], false);
    }

    #[test]
    fn test_generated_name_skips_explicit_names() {
        let lines = replay(
            r#"[
                {"step": "drop", "payload": {"template": "image"}, "as": "image-2"},
                {"step": "drop", "payload": {"template": "image"}},
                {"step": "remove", "target": "image-2"}
            ]"#,
        );
        assert_eq!(lines[0]["placed"], "image-2");
        assert_eq!(lines[1]["placed"], "image-3");
        assert_eq!(lines[2]["ids"], json!(["image-2"]));
    }

    #[test]
    fn test_reused_name_fails() {
        let steps = parse_script(
            r#"[
                {"step": "drop", "payload": {"template": "image"}},
                {"step": "drop", "payload": {"template": "button"}, "as": "image-1"}
            ]"#,
        )
        .unwrap();
        let mut out = Vec::new();
        let result = run(&steps, EditorConfig::default(), MemoryStore::new(), &mut out);
        assert!(matches!(result, Err(AppError::DuplicateName(name)) if name == "image-1"));
    }

    #[test]
    fn test_unknown_name_fails() {
        let steps = parse_script(r#"[{"step": "remove", "target": "ghost"}]"#).unwrap();
        let mut out = Vec::new();
        let result = run(&steps, EditorConfig::default(), MemoryStore::new(), &mut out);
        assert!(matches!(result, Err(AppError::UnknownName(name)) if name == "ghost"));
    }
}
