//! Context pairs extracted from the structure of a serializable value.
//!
//! Every scalar leaf becomes one pair keyed by its path from `root`:
//! object fields append `.field`, sequence elements append `[index]`.
//!
//! ```text
//! config.limits[0]=10
//! config.limits[1]=20
//! config.name=primary
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::context::{ContextList, value_text};
use crate::errors::{CodecError, Result};

/// Describe every leaf of `value` as a context pair under `root`.
///
/// Empty objects and sequences contribute nothing. Fails when `value` does
/// not serialize to JSON, for instance a map with non-string keys.
pub fn describe_structure(root: &str, value: &impl Serialize) -> Result<ContextList> {
    let tree = serde_json::to_value(value).map_err(|error| CodecError::Structure {
        path: root.to_owned(),
        message: error.to_string(),
    })?;

    let mut list = ContextList::new();
    walk(&mut list, root.to_owned(), &tree);
    Ok(list)
}

fn walk(list: &mut ContextList, path: String, value: &Value) {
    match value {
        Value::Object(fields) => {
            for (name, field) in fields {
                let child = if path.is_empty() {
                    name.clone()
                } else {
                    format!("{path}.{name}")
                };
                walk(list, child, field);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                walk(list, format!("{path}[{index}]"), item);
            }
        }
        leaf => *list = list.append(path, value_text(leaf).into_owned()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct Quo {
        q: bool,
    }

    #[derive(Serialize)]
    struct Simple {
        int: i32,
    }

    #[derive(Serialize)]
    struct Bar {
        slice_strings: Vec<&'static str>,
        simple_struct: Simple,
    }

    #[derive(Serialize)]
    struct Foo {
        bar: Bar,
        slice_structs: Vec<Quo>,
        empty: Vec<i32>,
        name: Option<&'static str>,
    }

    fn lines(list: &ContextList) -> Vec<String> {
        list.iter()
            .map(|(key, value)| format!("{key}={}", value_text(value)))
            .collect()
    }

    #[test]
    fn walks_fields_and_indices() {
        let foo = Foo {
            bar: Bar {
                slice_strings: vec!["a", "b"],
                simple_struct: Simple { int: 11 },
            },
            slice_structs: vec![Quo { q: true }, Quo { q: false }],
            empty: Vec::new(),
            name: None,
        };

        let list = describe_structure("foo", &foo).unwrap();
        assert_eq!(
            lines(&list),
            [
                "foo.bar.slice_strings[0]=a",
                "foo.bar.slice_strings[1]=b",
                "foo.bar.simple_struct.int=11",
                "foo.slice_structs[0].q=true",
                "foo.slice_structs[1].q=false",
                "foo.name=null",
            ]
        );
    }

    #[test]
    fn scalar_root_is_single_pair() {
        let list = describe_structure("port", &8080).unwrap();
        assert_eq!(lines(&list), ["port=8080"]);
    }

    #[test]
    fn empty_root_has_no_leading_dot() {
        let list = describe_structure("", &Simple { int: 1 }).unwrap();
        assert_eq!(lines(&list), ["int=1"]);
    }

    #[test]
    fn leaves_are_stored_as_text() {
        let list = describe_structure("n", &Simple { int: 7 }).unwrap();
        assert_eq!(list.pairs(), vec![("n.int", &Value::from("7"))]);
    }

    #[test]
    fn non_string_map_keys_fail() {
        let map = HashMap::from([(vec![1], 2)]);
        assert_matches!(
            describe_structure("map", &map),
            Err(CodecError::Structure { path, .. }) if path == "map"
        );
    }
}
