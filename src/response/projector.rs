//! Field Projection
//!
//! Pure derivation of a reduced document from include/exclude dot-path rules.
//! The input document is never mutated.

use crate::filter::types::FieldsSpec;
use crate::search::types::Document;
use serde_json::Value;

/// Fields every projected document keeps no matter what the client asked for:
/// the identifier, the type discriminator, and the navigation links.
pub const MANDATORY_FIELDS: [&str; 3] = ["id", "type", "links"];

/// Applies a field projection to one document.
///
/// With an empty spec the document passes through unchanged. An `include` list
/// restricts the result to the listed dot-paths plus the mandatory floor
/// (geometry stays in by default unless explicitly excluded). `exclude` runs
/// after include resolution and cannot remove mandatory fields. A parent path
/// carries its whole subtree.
pub fn project_document(document: &Document, fields: &FieldsSpec) -> Document {
    if fields.is_empty() {
        return document.clone();
    }

    let mut projected = if fields.include.is_empty() {
        document.clone()
    } else {
        let mut reduced = Document::new();
        for field in MANDATORY_FIELDS {
            copy_path(document, &mut reduced, field);
        }
        if !fields.exclude.iter().any(|path| path == "geometry") {
            copy_path(document, &mut reduced, "geometry");
        }
        for path in &fields.include {
            copy_path(document, &mut reduced, path);
        }
        reduced
    };

    for path in &fields.exclude {
        if MANDATORY_FIELDS.contains(&path.as_str()) {
            continue;
        }
        remove_path(&mut projected, path);
    }

    projected
}

/// Copies one dot-path from `source` into `target`, creating intermediate
/// objects as needed and merging into subtrees copied by earlier paths.
fn copy_path(source: &Document, target: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            if let Some(value) = source.get(path) {
                target.insert(path.to_string(), value.clone());
            }
        }
        Some((head, rest)) => {
            let Some(Value::Object(child)) = source.get(head) else {
                return;
            };
            let slot = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Document::new()));
            if let Value::Object(target_child) = slot {
                copy_path(child, target_child, rest);
            }
        }
    }
}

fn remove_path(target: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            target.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Value::Object(child)) = target.get_mut(head) {
                remove_path(child, rest);
            }
        }
    }
}
