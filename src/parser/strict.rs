//! Strict phase: decode a self-describing JSON payload

use super::fenced::extract_fenced_blocks;
use crate::models::{PageSpec, Prd, RecordKind, RolePlan, StructuredRecord, TaskPlan};
use serde_json::{Map, Value};

/// `(primary, alias)` key pairs on a record's top level
fn top_level_aliases(kind: RecordKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        RecordKind::Requirements => &[("product", "title"), ("page_sections", "sections")],
        RecordKind::PageSpec => &[("colors", "palette")],
        RecordKind::TaskPlan => &[("tasks", "prioritized_tasks")],
        RecordKind::RolePlan => &[("available_roles", "roles"), ("tasks", "assignments")],
    }
}

/// `(list field, primary, alias)` key pairs on the entries of a nested list
fn entry_aliases(kind: RecordKind) -> &'static [(&'static str, &'static str, &'static str)] {
    match kind {
        RecordKind::PageSpec => &[("components", "html", "root_tag")],
        RecordKind::TaskPlan => &[("tasks", "depends_on", "dependsOn")],
        RecordKind::Requirements | RecordKind::RolePlan => &[],
    }
}

/// Candidate payloads in the order they are tried
///
/// 1. the whole response
/// 2. each fenced code block
/// 3. the span from the first `{` to the last `}`
fn candidates(raw: &str) -> Vec<String> {
    let mut candidates = vec![raw.trim().to_string()];

    candidates.extend(
        extract_fenced_blocks(raw)
            .into_iter()
            .map(|block| block.content.trim().to_string()),
    );

    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if start < end {
            candidates.push(raw[start..=end].to_string());
        }
    }

    candidates.dedup();
    candidates
}

/// Decode `raw` as a record of `kind`
///
/// Accepts the first candidate that is a JSON object exposing at least one
/// of the kind's top-level keys. Missing fields default to empty values.
pub fn parse_strict(raw: &str, kind: RecordKind) -> Option<StructuredRecord> {
    candidates(raw)
        .iter()
        .filter_map(|candidate| serde_json::from_str::<Value>(candidate).ok())
        .filter(|value| exposes_known_key(value, kind))
        .find_map(|value| decode(value, kind))
}

fn exposes_known_key(value: &Value, kind: RecordKind) -> bool {
    value
        .as_object()
        .map(|object| kind.known_keys().iter().any(|key| object.contains_key(*key)))
        .unwrap_or(false)
}

/// Keep one key per aliased field; the primary key wins over its alias
fn collapse_alias(object: &mut Map<String, Value>, primary: &str, alias: &str) {
    if let Some(value) = object.remove(alias) {
        object.entry(primary.to_string()).or_insert(value);
    }
}

/// Rewrite alias keys to their primary names so serde never sees both
fn canonicalize(value: &mut Value, kind: RecordKind) {
    let Some(object) = value.as_object_mut() else {
        return;
    };
    for (primary, alias) in top_level_aliases(kind) {
        collapse_alias(object, primary, alias);
    }

    for (field, primary, alias) in entry_aliases(kind) {
        match object.get_mut(*field) {
            Some(Value::Array(entries)) => {
                for entry in entries.iter_mut().filter_map(Value::as_object_mut) {
                    collapse_alias(entry, primary, alias);
                }
            }
            Some(Value::Object(entry)) => collapse_alias(entry, primary, alias),
            _ => {}
        }
    }
}

fn decode(mut value: Value, kind: RecordKind) -> Option<StructuredRecord> {
    canonicalize(&mut value, kind);
    let record = match kind {
        RecordKind::Requirements => {
            StructuredRecord::Requirements(serde_json::from_value::<Prd>(value).ok()?)
        }
        RecordKind::PageSpec => {
            StructuredRecord::PageSpec(serde_json::from_value::<PageSpec>(value).ok()?)
        }
        RecordKind::TaskPlan => {
            StructuredRecord::TaskPlan(serde_json::from_value::<TaskPlan>(value).ok()?)
        }
        RecordKind::RolePlan => {
            StructuredRecord::RolePlan(serde_json::from_value::<RolePlan>(value).ok()?)
        }
    };
    Some(record)
}
