//! v0.3.0: project groups replace the flat `ordering` block.
//!
//! `ordering.projects` becomes `projectGroups.items` (projects missing from the
//! old ordering are appended; repeated or unknown ids are dropped),
//! `ordering.labels` becomes the order of the `labels` array itself, and
//! `ordering` is dropped.

use serde_json::Value;

use crate::error::TransformError;
use crate::json::{array_mut, into_object, object_entry, string_items};

pub fn migrate(document: Value) -> Result<Value, TransformError> {
    let mut doc = into_object(document)?;

    let ordering = doc.remove("ordering");
    let project_order = string_items(ordering.as_ref().and_then(|o| o.get("projects")));
    let label_order = string_items(ordering.as_ref().and_then(|o| o.get("labels")));

    let known = element_ids(doc.get("projects"));
    let mut items: Vec<String> = Vec::with_capacity(known.len());
    for id in project_order.into_iter().chain(known.iter().cloned()) {
        if known.contains(&id) && !items.contains(&id) {
            items.push(id);
        }
    }

    let groups = object_entry(&mut doc, "projectGroups");
    if !groups.get("items").is_some_and(Value::is_array) {
        groups.insert(
            "items".into(),
            Value::Array(items.into_iter().map(Value::String).collect()),
        );
    }

    if let Some(labels) = array_mut(&mut doc, "labels") {
        sort_by_order(labels, &label_order);
    }

    Ok(Value::Object(doc))
}

fn element_ids(collection: Option<&Value>) -> Vec<String> {
    collection
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(element_id).map(str::to_string).collect())
        .unwrap_or_default()
}

fn element_id(item: &Value) -> Option<&str> {
    item.get("id").and_then(Value::as_str)
}

/// Stable sort: ids listed in `order` first, in that order; the rest keep
/// their relative position at the end.
fn sort_by_order(items: &mut [Value], order: &[String]) {
    let rank = |item: &Value| {
        element_id(item)
            .and_then(|id| order.iter().position(|o| o == id))
            .unwrap_or(order.len())
    };
    items.sort_by_key(rank);
}
