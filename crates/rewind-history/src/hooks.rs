/// Snapshot hooks: equality, duplication and change notification.
///
/// The history manager never looks inside a snapshot. It decides whether a
/// push is a no-op with a compare hook and protects stored history from
/// later outside mutation with a duplicate hook. Two families of defaults
/// are provided:
///
/// - [`structural_eq`] / [`deep_clone`], backed by `PartialEq` and `Clone`.
/// - [`json_eq`] / [`json_clone`], backed by `serde_json`. These only make
///   sense for plain serializable data. Anything serde skips or cannot
///   represent (function pointers, handles, `#[serde(skip)]` fields) is
///   ignored by the comparison and lost by the copy.
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Decides whether two snapshots represent the same state.
pub type CompareFn<T> = dyn Fn(&T, &T) -> bool;

/// Produces an independent copy of a snapshot.
pub type DuplicateFn<T> = dyn Fn(&T) -> T;

/// Called with `(from, to)` whenever the current snapshot changes.
pub type ChangeFn<T> = dyn Fn(Option<&T>, Option<&T>);

/// Structural equality through `PartialEq`.
pub fn structural_eq<T: PartialEq>(a: &T, b: &T) -> bool {
    a == b
}

/// Deep copy through `Clone`.
pub fn deep_clone<T: Clone>(value: &T) -> T {
    value.clone()
}

/// Equality by comparing serialized JSON trees.
///
/// A value that fails to serialize is never equal to anything, so the push
/// it guards is recorded rather than silently dropped.
pub fn json_eq<T: Serialize>(a: &T, b: &T) -> bool {
    match (serde_json::to_value(a), serde_json::to_value(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Deep copy by serializing to JSON and parsing back.
///
/// Falls back to `Clone` when the round trip fails.
pub fn json_clone<T: Serialize + DeserializeOwned + Clone>(value: &T) -> T {
    match json_round_trip(value) {
        Ok(copy) => copy,
        Err(e) => {
            tracing::warn!("JSON duplicate failed, falling back to Clone: {e}");
            value.clone()
        }
    }
}

fn json_round_trip<T: Serialize + DeserializeOwned>(value: &T) -> serde_json::Result<T> {
    let tree = serde_json::to_value(value)?;
    serde_json::from_value(tree)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Doc {
        title: String,
        lines: Vec<String>,
        #[serde(skip)]
        scratch: u32,
    }

    fn doc(title: &str, scratch: u32) -> Doc {
        Doc {
            title: title.to_string(),
            lines: vec!["a".to_string(), "b".to_string()],
            scratch,
        }
    }

    #[test]
    fn test_structural_defaults() {
        assert!(structural_eq(&doc("x", 1), &doc("x", 1)));
        assert!(!structural_eq(&doc("x", 1), &doc("x", 2)));
        assert_eq!(deep_clone(&doc("x", 7)), doc("x", 7));
    }

    #[test]
    fn test_json_eq_ignores_skipped_fields() {
        assert!(json_eq(&doc("x", 1), &doc("x", 2)));
        assert!(!json_eq(&doc("x", 1), &doc("y", 1)));
    }

    #[test]
    fn test_json_clone_drops_skipped_fields() {
        let copy = json_clone(&doc("x", 5));
        assert_eq!(copy.title, "x");
        assert_eq!(copy.lines.len(), 2);
        assert_eq!(copy.scratch, 0);
    }

    #[test]
    fn test_json_clone_falls_back_to_clone() {
        // Non-string map keys cannot become JSON object keys.
        let mut map: HashMap<(u8, u8), u8> = HashMap::new();
        map.insert((1, 2), 3);
        let copy = json_clone(&map);
        assert_eq!(copy, map);
    }

    #[test]
    fn test_json_eq_unserializable_is_never_equal() {
        let mut map: HashMap<(u8, u8), u8> = HashMap::new();
        map.insert((1, 2), 3);
        assert!(!json_eq(&map, &map));
    }
}
