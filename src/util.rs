//! Small helpers shared across modules: opening files with a descriptive
//! error and merging nested template values.

use serde_json::{Map, Value};
use std::fs::File;
use std::io;
use std::path::Path;

/// Opens the file at `path`, annotating any failure with the `kind` of file
/// being opened (e.g., "config" or "layout") and its path.
pub fn open(path: &Path, kind: &str) -> io::Result<File> {
    File::open(path).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("opening {} file `{}`: {}", kind, path.display(), e),
        )
    })
}

/// Recursively merges `overrides` into `base` and returns the result.
///
/// When both sides hold a mapping at the same key, the mappings are merged key
/// by key. Any other collision (scalar against scalar, scalar against mapping,
/// arrays) is resolved in favor of `overrides`. Keys present on only one side
/// are kept as is.
pub fn deep_merge(base: Value, overrides: Value) -> Value {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            Value::Object(merge_maps(base, overrides))
        }
        (_, overrides) => overrides,
    }
}

/// The [`Map`] flavor of [`deep_merge`].
pub fn merge_maps(
    mut base: Map<String, Value>,
    overrides: Map<String, Value>,
) -> Map<String, Value> {
    for (key, value) in overrides {
        let merged = match base.remove(&key) {
            Some(existing) => deep_merge(existing, value),
            None => value,
        };
        base.insert(key, merged);
    }
    base
}
