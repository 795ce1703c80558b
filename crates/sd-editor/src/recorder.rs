//! Change recorder: turns a resolved edit into a `Command`.
//!
//! Old values are copied out of the live store before anything is written,
//! so the command owns its snapshots outright and later edits to the
//! scene can't reach them.

use crate::commands::{Command, Payload};
use sd_core::id::ElementId;
use sd_core::model::{Property, PropertyValue};
use sd_core::scope::{Resolution, Scope};
use sd_core::transform::Cascade;
use sd_core::SceneStore;
use std::collections::HashMap;

/// Copy the current value of `property` for each of `ids` that carries it.
pub fn snapshot(
    store: &dyn SceneStore,
    ids: &[ElementId],
    property: Property,
) -> HashMap<ElementId, PropertyValue> {
    ids.iter()
        .filter_map(|id| {
            let value = store.element(*id)?.property(property)?;
            Some((*id, value))
        })
        .collect()
}

/// Build the command for one confirmed edit.
///
/// An `OnlyThisObject` edit of one element yields a `Single` payload;
/// anything else a `Group` payload keyed by element id.
pub fn record(
    name: impl Into<String>,
    property: Property,
    resolution: &Resolution,
    old: HashMap<ElementId, PropertyValue>,
    new_value: PropertyValue,
    cascade: Option<Cascade>,
) -> Command {
    let single = (resolution.scope == Scope::OnlyThisObject && old.len() == 1)
        .then(|| old.iter().next().map(|(id, value)| (*id, value.clone())))
        .flatten();
    let payload = match single {
        Some((changed_element_id, old_value)) => Payload::Single {
            changed_element_id,
            old_value,
            new_value,
        },
        None => Payload::Group {
            old_values: old,
            new_value,
            group_id: resolution.group_id,
        },
    };
    Command::new(name.into(), property, payload, cascade)
}
