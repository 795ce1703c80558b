//! Undo/Redo command stack.
//!
//! Every confirmed edit becomes one immutable `Command` holding owned
//! before/after snapshots of everything it touched, including the cascade
//! into children. Undo and redo replay those snapshots; they never re-run
//! geometry or containment checks.
//!
//! The stack is a single linear history with a cursor. Pushing after an
//! undo discards the redo tail; pushing past the limit evicts the oldest.

use sd_core::id::ElementId;
use sd_core::model::{Property, PropertyValue};
use sd_core::transform::{Cascade, Snapshot};
use sd_core::{NodeGroups, SceneError, SceneStore};
use std::collections::HashMap;
use std::time::SystemTime;

/// The property half of a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// One explicitly targeted element.
    Single {
        changed_element_id: ElementId,
        old_value: PropertyValue,
        new_value: PropertyValue,
    },
    /// Every element a group scope resolved to.
    Group {
        old_values: HashMap<ElementId, PropertyValue>,
        new_value: PropertyValue,
        /// Common ancestor naming the scope (foundation or parent).
        group_id: Option<ElementId>,
    },
}

impl Payload {
    pub fn new_value(&self) -> &PropertyValue {
        match self {
            Payload::Single { new_value, .. } | Payload::Group { new_value, .. } => new_value,
        }
    }
}

/// A reversible record of one confirmed edit.
#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    timestamp: SystemTime,
    property: Property,
    payload: Payload,
    cascade: Option<Cascade>,
}

impl Command {
    pub(crate) fn new(
        name: String,
        property: Property,
        payload: Payload,
        cascade: Option<Cascade>,
    ) -> Self {
        Self {
            name,
            timestamp: SystemTime::now(),
            property,
            payload,
            cascade: cascade.filter(|c| !c.is_empty()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    pub fn property(&self) -> Property {
        self.property
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Children moved, re-parented, or reshaped by this edit.
    pub fn cascade(&self) -> Option<&Cascade> {
        self.cascade.as_ref()
    }

    /// Elements whose property this command sets, sorted by id.
    pub fn changed_ids(&self) -> Vec<ElementId> {
        let mut ids: Vec<ElementId> = match &self.payload {
            Payload::Single {
                changed_element_id, ..
            } => vec![*changed_element_id],
            Payload::Group { old_values, .. } => old_values.keys().copied().collect(),
        };
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }

    /// Restore the before-state.
    pub fn undo(
        &self,
        store: &mut dyn SceneStore,
        nodes: &mut dyn NodeGroups,
    ) -> Result<(), SceneError> {
        match &self.payload {
            Payload::Single {
                changed_element_id,
                old_value,
                ..
            } => write_value(store, *changed_element_id, self.property, old_value)?,
            Payload::Group { old_values, .. } => {
                for (id, old_value) in old_values {
                    write_value(store, *id, self.property, old_value)?;
                }
            }
        }
        if let Some(cascade) = &self.cascade {
            cascade.apply(store, nodes, Snapshot::Before)?;
        }
        Ok(())
    }

    /// Re-apply the after-state.
    pub fn redo(
        &self,
        store: &mut dyn SceneStore,
        nodes: &mut dyn NodeGroups,
    ) -> Result<(), SceneError> {
        let new_value = self.payload.new_value();
        for id in self.changed_ids() {
            write_value(store, id, self.property, new_value)?;
        }
        if let Some(cascade) = &self.cascade {
            cascade.apply(store, nodes, Snapshot::After)?;
        }
        Ok(())
    }
}

/// Extents go through `set_extent`; everything else through `set_property`.
fn write_value(
    store: &mut dyn SceneStore,
    id: ElementId,
    property: Property,
    value: &PropertyValue,
) -> Result<(), SceneError> {
    match (property, value.as_number()) {
        (Property::Lx, Some(v)) => store.set_extent(id, Some(v), None, None),
        (Property::Ly, Some(v)) => store.set_extent(id, None, Some(v), None),
        (Property::Lz, Some(v)) => store.set_extent(id, None, None, Some(v)),
        _ => store.set_property(id, property, value),
    }
}

// ─── History ─────────────────────────────────────────────────────────────

/// Where the engine hands finished commands.
pub trait HistorySink {
    fn add_undoable(&mut self, command: Command);
}

/// What the change listener sees after every history change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStatus {
    pub len: usize,
    pub has_undo: bool,
    pub has_redo: bool,
    pub undo_name: Option<String>,
    pub redo_name: Option<String>,
}

type Listener = Box<dyn FnMut(&HistoryStatus)>;

/// Bounded linear undo/redo history.
pub struct CommandStack {
    commands: Vec<Command>,
    /// Number of commands currently applied; `commands[cursor - 1]` is the
    /// next to undo, `commands[cursor]` the next to redo.
    cursor: usize,
    /// Maximum history length.
    limit: usize,
    /// Set while a command's undo/redo runs.
    executing: bool,
    listener: Option<Listener>,
}

impl CommandStack {
    pub fn new(limit: usize) -> Self {
        Self {
            commands: Vec::with_capacity(limit.min(256)),
            cursor: 0,
            limit,
            executing: false,
            listener: None,
        }
    }

    /// Register the change-notification callback.
    pub fn on_change(&mut self, listener: impl FnMut(&HistoryStatus) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Append a command, dropping any redo tail and the oldest entries
    /// past the limit. Ignored while a command is executing.
    pub fn push(&mut self, command: Command) -> bool {
        if self.executing {
            log::warn!("ignoring `{}` pushed during undo/redo", command.name());
            return false;
        }
        if self.cursor < self.commands.len() {
            log::debug!(
                "discarding {} redo entries",
                self.commands.len() - self.cursor
            );
            self.commands.truncate(self.cursor);
        }
        log::debug!("push `{}`", command.name());
        self.commands.push(command);
        while self.commands.len() > self.limit {
            let evicted = self.commands.remove(0);
            log::debug!("evict `{}`", evicted.name());
        }
        self.cursor = self.commands.len();
        self.notify();
        true
    }

    /// Undo the last applied command. Returns its name, or `None` if there
    /// is nothing to undo.
    pub fn undo(
        &mut self,
        store: &mut dyn SceneStore,
        nodes: &mut dyn NodeGroups,
    ) -> Option<String> {
        if self.cursor == 0 {
            return None;
        }
        let index = self.cursor - 1;
        self.executing = true;
        let result = self.commands[index].undo(store, nodes);
        self.executing = false;
        if let Err(err) = result {
            log::error!("undo of `{}` failed: {err}", self.commands[index].name());
        }
        self.cursor = index;
        log::debug!("undo `{}`", self.commands[index].name());
        self.notify();
        Some(self.commands[index].name().to_string())
    }

    /// Redo the next undone command.
    pub fn redo(
        &mut self,
        store: &mut dyn SceneStore,
        nodes: &mut dyn NodeGroups,
    ) -> Option<String> {
        if self.cursor >= self.commands.len() {
            return None;
        }
        let index = self.cursor;
        self.executing = true;
        let result = self.commands[index].redo(store, nodes);
        self.executing = false;
        if let Err(err) = result {
            log::error!("redo of `{}` failed: {err}", self.commands[index].name());
        }
        self.cursor = index + 1;
        log::debug!("redo `{}`", self.commands[index].name());
        self.notify();
        Some(self.commands[index].name().to_string())
    }

    /// Drop all history (e.g. when a new scene is loaded).
    pub fn clear(&mut self) {
        if self.commands.is_empty() {
            return;
        }
        log::debug!("clear {} commands", self.commands.len());
        self.commands.clear();
        self.cursor = 0;
        self.notify();
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.commands.len()
    }

    /// Label for an "Undo …" menu entry.
    pub fn undo_name(&self) -> Option<&str> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.commands.get(i))
            .map(Command::name)
    }

    /// Label for a "Redo …" menu entry.
    pub fn redo_name(&self) -> Option<&str> {
        self.commands.get(self.cursor).map(Command::name)
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn is_executing(&self) -> bool {
        self.executing
    }

    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            len: self.commands.len(),
            has_undo: self.can_undo(),
            has_redo: self.can_redo(),
            undo_name: self.undo_name().map(str::to_string),
            redo_name: self.redo_name().map(str::to_string),
        }
    }

    fn notify(&mut self) {
        let status = self.status();
        if let Some(listener) = self.listener.as_mut() {
            listener(&status);
        }
    }
}

impl HistorySink for CommandStack {
    fn add_undoable(&mut self, command: Command) {
        self.push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sd_core::model::{Element, ElementKind};
    use sd_core::{NodeRegistry, SceneGraph};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn label_command(id: ElementId, old: &str, new: &str) -> Command {
        Command::new(
            format!("label {new}"),
            Property::Label,
            Payload::Single {
                changed_element_id: id,
                old_value: old.into(),
                new_value: new.into(),
            },
            None,
        )
    }

    fn setup(name: &str) -> (SceneGraph, NodeRegistry, ElementId) {
        let mut scene = SceneGraph::new();
        let id = ElementId::intern(name);
        scene
            .insert(ElementId::ground(), Element::new(id, ElementKind::Cuboid))
            .unwrap();
        let nodes = NodeRegistry::from_store(&scene);
        (scene, nodes, id)
    }

    /// Push label edits "1".."n" and apply them.
    fn push_labels(
        stack: &mut CommandStack,
        scene: &mut SceneGraph,
        nodes: &mut NodeRegistry,
        id: ElementId,
        n: usize,
    ) {
        for i in 1..=n {
            let cmd = label_command(id, &(i - 1).to_string(), &i.to_string());
            cmd.redo(scene, nodes).unwrap();
            stack.push(cmd);
        }
    }

    fn label(scene: &SceneGraph, id: ElementId) -> String {
        scene.element(id).unwrap().label.clone()
    }

    #[test]
    fn undo_redo_walks_the_cursor() {
        let (mut scene, mut nodes, id) = setup("cs_a");
        let mut stack = CommandStack::new(10);
        push_labels(&mut stack, &mut scene, &mut nodes, id, 2);
        assert_eq!(label(&scene, id), "2");
        assert_eq!(stack.undo_name(), Some("label 2"));
        assert_eq!(stack.redo_name(), None);

        assert_eq!(stack.undo(&mut scene, &mut nodes).as_deref(), Some("label 2"));
        assert_eq!(label(&scene, id), "1");
        assert_eq!(stack.redo_name(), Some("label 2"));

        assert_eq!(stack.redo(&mut scene, &mut nodes).as_deref(), Some("label 2"));
        assert_eq!(label(&scene, id), "2");
        assert_eq!(stack.redo(&mut scene, &mut nodes), None);
    }

    #[test]
    fn nothing_to_undo_on_empty_stack() {
        let (mut scene, mut nodes, _) = setup("cs_b");
        let mut stack = CommandStack::new(10);
        assert!(!stack.can_undo());
        assert_eq!(stack.undo(&mut scene, &mut nodes), None);
        assert_eq!(stack.undo_name(), None);
    }

    #[test]
    fn push_after_undo_truncates_redo() {
        let (mut scene, mut nodes, id) = setup("cs_c");
        let mut stack = CommandStack::new(10);
        push_labels(&mut stack, &mut scene, &mut nodes, id, 3);
        stack.undo(&mut scene, &mut nodes);
        stack.undo(&mut scene, &mut nodes);
        assert!(stack.can_redo());

        stack.push(label_command(id, "1", "x"));
        assert!(!stack.can_redo());
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.undo_name(), Some("label x"));
    }

    #[test]
    fn limit_evicts_oldest() {
        let (mut scene, mut nodes, id) = setup("cs_d");
        let mut stack = CommandStack::new(5);
        push_labels(&mut stack, &mut scene, &mut nodes, id, 6);
        assert_eq!(stack.commands().len(), 5);
        assert_eq!(stack.commands()[0].name(), "label 2");

        let mut undone = 0;
        while stack.undo(&mut scene, &mut nodes).is_some() {
            undone += 1;
        }
        assert_eq!(undone, 5);
        assert!(!stack.can_undo());
        assert_eq!(label(&scene, id), "1");
    }

    #[test]
    fn push_while_executing_is_ignored() {
        let (_, _, id) = setup("cs_e");
        let mut stack = CommandStack::new(5);
        stack.executing = true;
        assert!(!stack.push(label_command(id, "", "a")));
        stack.executing = false;
        assert!(stack.is_empty());
        assert!(stack.push(label_command(id, "", "a")));
    }

    #[test]
    fn listener_sees_every_change() {
        let (mut scene, mut nodes, id) = setup("cs_f");
        let seen: Rc<RefCell<Vec<HistoryStatus>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let mut stack = CommandStack::new(5);
        stack.on_change(move |status| sink.borrow_mut().push(status.clone()));

        push_labels(&mut stack, &mut scene, &mut nodes, id, 1);
        stack.undo(&mut scene, &mut nodes);
        stack.clear();
        // Clearing an already-empty history is silent.
        stack.clear();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].has_undo);
        assert_eq!(seen[1].redo_name.as_deref(), Some("label 1"));
        assert_eq!(seen[2].len, 0);
    }

    #[test]
    fn group_payload_replays_every_member() {
        let (mut scene, mut nodes, a) = setup("cs_g1");
        let b = ElementId::intern("cs_g2");
        scene
            .insert(ElementId::ground(), Element::new(b, ElementKind::Cuboid))
            .unwrap();
        let cmd = Command::new(
            "color".into(),
            Property::Color,
            Payload::Group {
                old_values: HashMap::from([(a, "#808080".into()), (b, "#808080".into())]),
                new_value: "#FF0000".into(),
                group_id: None,
            },
            None,
        );
        cmd.redo(&mut scene, &mut nodes).unwrap();
        assert_eq!(scene.element(b).unwrap().color, "#FF0000");
        assert_eq!(cmd.changed_ids().len(), 2);
        cmd.undo(&mut scene, &mut nodes).unwrap();
        assert_eq!(scene.element(a).unwrap().color, "#808080");
    }
}
