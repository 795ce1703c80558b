//! The mutation engine: one entry point for every confirmed edit.
//!
//! A request names an anchor element, a property, a new value, and a
//! scope. The engine runs the whole edit synchronously:
//!
//! 1. guard: a missing or locked anchor is a silent no-op;
//! 2. resolve the scope to element ids;
//! 3. `need_change`: if nothing would actually change, stop here;
//! 4. for cascading edits on containers, plan each parent's cascade and
//!    drop the parents whose children wouldn't fit;
//! 5. snapshot old values, build the `Command`, apply it via `redo`, and
//!    hand it to the history sink.
//!
//! Nothing is written before step 5, so a rejected or no-op edit leaves
//! the store untouched.

use crate::commands::HistorySink;
use crate::config::EditorConfig;
use crate::recorder::{record, snapshot};
use sd_core::id::ElementId;
use sd_core::model::{Property, PropertyValue};
use sd_core::scope::{Scope, need_change, resolve};
use sd_core::transform::{Cascade, GeometryEdit, Rejection, plan_cascade};
use crate::error::EditorError;
use sd_core::{NodeGroups, SceneError, SceneStore};

/// One edit as the UI confirms it.
#[derive(Debug, Clone, PartialEq)]
pub struct EditRequest {
    pub anchor: ElementId,
    pub property: Property,
    pub value: PropertyValue,
    pub scope: Scope,
}

impl EditRequest {
    /// An `OnlyThisObject` edit.
    pub fn new(anchor: ElementId, property: Property, value: impl Into<PropertyValue>) -> Self {
        Self {
            anchor,
            property,
            value: value.into(),
            scope: Scope::OnlyThisObject,
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }
}

/// What happened to an edit.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// A command was recorded and applied. `rejected` lists parents of a
    /// group resize that were skipped because their children wouldn't fit.
    Applied {
        name: String,
        changed: Vec<ElementId>,
        rejected: Vec<Rejection>,
    },
    /// Every in-scope parent refused the edit. Nothing was written.
    Rejected {
        attempted_value: PropertyValue,
        rejections: Vec<Rejection>,
    },
    /// Missing or locked anchor, or nothing would change.
    Unchanged,
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, MutationOutcome::Rejected { .. })
    }
}

/// Applies edits against a store and records them.
#[derive(Debug, Clone, Default)]
pub struct MutationEngine {
    config: EditorConfig,
}

impl MutationEngine {
    pub fn new(config: EditorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Run one edit end to end.
    ///
    /// # Errors
    /// Returns `EditorError::Scene` if the value doesn't fit the property (checked
    /// before any write) or the store refuses a write.
    pub fn apply(
        &self,
        store: &mut dyn SceneStore,
        nodes: &mut dyn NodeGroups,
        history: &mut dyn HistorySink,
        request: &EditRequest,
    ) -> Result<MutationOutcome, EditorError> {
        let tol = self.config.tolerance;
        let Some(anchor) = store.element(request.anchor) else {
            log::trace!("edit on missing element {}", request.anchor);
            return Ok(MutationOutcome::Unchanged);
        };
        if anchor.locked {
            log::trace!("edit on locked element {}", request.anchor);
            return Ok(MutationOutcome::Unchanged);
        }

        // Dry run on a copy so a bad value fails before anything is written.
        anchor.clone().set_property(request.property, &request.value)?;
        let edit = GeometryEdit::from_property(request.property, &request.value);
        if matches!(edit, Some(GeometryEdit::Resize { value, .. }) if value <= 0.0) {
            return Err(SceneError::WrongValue {
                property: request.property,
                expected: "positive number",
            }
            .into());
        }

        let mut resolution = resolve(
            store,
            request.anchor,
            request.scope,
            anchor.element_type(),
            tol,
        );
        resolution
            .ids
            .retain(|id| store.element(*id).is_some_and(|e| e.property(request.property).is_some()));

        if !need_change(store, &resolution.ids, request.property, &request.value, tol) {
            log::trace!(
                "{:?} = {:?} changes nothing in {:?}",
                request.property,
                request.value,
                request.scope
            );
            return Ok(MutationOutcome::Unchanged);
        }

        let mut cascade = Cascade::default();
        let mut rejected = Vec::new();
        if let Some(edit) = edit {
            let mut accepted = Vec::with_capacity(resolution.ids.len());
            for id in resolution.ids {
                match plan_cascade(store, id, edit, tol) {
                    Ok(plan) => {
                        cascade.merge(plan);
                        accepted.push(id);
                    }
                    Err(rejection) => rejected.push(rejection),
                }
            }
            resolution.ids = accepted;
        }

        // Parents that fit may already hold the value.
        if !need_change(store, &resolution.ids, request.property, &request.value, tol) {
            if rejected.is_empty() {
                return Ok(MutationOutcome::Unchanged);
            }
            return Ok(MutationOutcome::Rejected {
                attempted_value: request.value.clone(),
                rejections: rejected,
            });
        }

        let old = snapshot(store, &resolution.ids, request.property);
        let name = command_name(request, resolution.ids.len());
        let command = record(
            name.clone(),
            request.property,
            &resolution,
            old,
            request.value.clone(),
            Some(cascade),
        );
        command.redo(store, nodes)?;
        let changed = command.changed_ids();
        log::debug!(
            "{name}: {} changed, {} rejected",
            changed.len(),
            rejected.len()
        );
        history.add_undoable(command);

        Ok(MutationOutcome::Applied {
            name,
            changed,
            rejected,
        })
    }
}

fn command_name(request: &EditRequest, count: usize) -> String {
    match request.scope {
        Scope::OnlyThisObject => format!("Set {:?} of {}", request.property, request.anchor),
        scope => format!("Set {:?} on {count} elements ({scope:?})", request.property),
    }
}
