//! Override resolution.
//!
//! The persisted override document is merged onto the default tree and the
//! merged result is written back, so the override file always carries the
//! full current set of keys after a start.

use std::fmt;
use std::path::Path;

use serde_json::{Map, Value};

use crate::common::error::ConfigResult;
use crate::config::store;

/// How the override document was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The override document was read and its top-level sections merged.
    Loaded { sections: usize },
    /// The override document could not be read; defaults were used as-is.
    Defaulted(String),
}

impl fmt::Display for ResolveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded { sections } => write!(f, "override loaded ({} section(s))", sections),
            Self::Defaulted(reason) => write!(f, "defaults used ({})", reason),
        }
    }
}

/// A resolved configuration tree together with how it was produced.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub tree: Value,
    pub outcome: ResolveOutcome,
}

/// Merge an override document onto `tree`.
///
/// Object values merge one level deep: each second-level key of the override
/// replaces the default's value for that key, whatever its shape. Any other
/// override value replaces the top-level value outright.
pub fn merge(tree: &mut Map<String, Value>, overrides: Map<String, Value>) {
    for (key, value) in overrides {
        match value {
            Value::Object(entries) => match tree.get_mut(&key) {
                Some(Value::Object(section)) => {
                    for (sub_key, sub_value) in entries {
                        section.insert(sub_key, sub_value);
                    }
                }
                _ => {
                    tree.insert(key, Value::Object(entries));
                }
            },
            value => {
                tree.insert(key, value);
            }
        }
    }
}

/// Resolve the override document at `override_path` onto `default_tree`
/// and persist the result back to the same path.
///
/// A missing or unreadable override degrades to the defaults. Failing to
/// write the result is an error.
pub fn resolve(default_tree: Value, override_path: impl AsRef<Path>) -> ConfigResult<Resolved> {
    let override_path = override_path.as_ref();

    let mut tree = match default_tree {
        Value::Object(map) => map,
        // The default tree is always an object; anything else has nothing to merge into.
        other => {
            store::dump(override_path, &other)?;
            return Ok(Resolved {
                tree: other,
                outcome: ResolveOutcome::Defaulted("default tree is not an object".to_string()),
            });
        }
    };

    let outcome = match store::load(override_path) {
        Ok(overrides) => {
            let sections = overrides.len();
            merge(&mut tree, overrides);
            ResolveOutcome::Loaded { sections }
        }
        Err(e) => ResolveOutcome::Defaulted(e.to_string()),
    };

    let tree = Value::Object(tree);
    store::dump(override_path, &tree)?;

    Ok(Resolved { tree, outcome })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::default_tree;
    use serde_json::json;
    use std::fs;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_override_wins_two_levels() {
        let mut tree = object(json!({"a": {"x": 1, "y": 2}}));
        merge(&mut tree, object(json!({"a": {"x": 9}})));

        assert_eq!(Value::Object(tree), json!({"a": {"x": 9, "y": 2}}));
    }

    #[test]
    fn test_scalar_replaced_wholesale() {
        let mut tree = object(json!({"low_battery": 30}));
        merge(&mut tree, object(json!({"low_battery": 10})));

        assert_eq!(tree["low_battery"], 10);
    }

    #[test]
    fn test_list_replaced_wholesale() {
        let mut tree = object(json!({"servers": ["a.json"]}));
        merge(&mut tree, object(json!({"servers": ["b.json", "c.json"]})));

        assert_eq!(tree["servers"], json!(["b.json", "c.json"]));
    }

    #[test]
    fn test_subsystem_document_replaced_not_deep_merged() {
        let mut tree = object(json!({
            "logging": {"main": {"stream_level": "INFO", "backup_count": 3}}
        }));
        merge(
            &mut tree,
            object(json!({"logging": {"main": {"stream_level": "DEBUG"}}})),
        );

        assert_eq!(tree["logging"]["main"], json!({"stream_level": "DEBUG"}));
    }

    #[test]
    fn test_unknown_top_level_key_inserted() {
        let mut tree = object(json!({"a": 1}));
        merge(&mut tree, object(json!({"extra": {"k": true}})));

        assert_eq!(tree["extra"], json!({"k": true}));
    }

    #[test]
    fn test_resolve_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let resolved = resolve(default_tree(), &path).unwrap();

        assert!(matches!(resolved.outcome, ResolveOutcome::Defaulted(_)));
        assert_eq!(resolved.tree, default_tree());
        assert_eq!(store::load_value(&path).unwrap(), default_tree());
    }

    #[test]
    fn test_resolve_malformed_file_rewritten_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{\"web\": {\"port\": ").unwrap();

        let resolved = resolve(default_tree(), &path).unwrap();

        assert!(matches!(resolved.outcome, ResolveOutcome::Defaulted(_)));
        assert_eq!(resolved.tree, default_tree());
        assert_eq!(store::load_value(&path).unwrap(), default_tree());
    }

    #[test]
    fn test_resolve_partial_override_is_populated_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"web": {"port": 8080}, "low_battery": 10}"#).unwrap();

        let resolved = resolve(default_tree(), &path).unwrap();

        assert_eq!(resolved.outcome, ResolveOutcome::Loaded { sections: 2 });
        assert_eq!(resolved.tree["web"]["port"], 8080);
        assert_eq!(resolved.tree["web"]["host"], "0.0.0.0");
        assert_eq!(resolved.tree["low_battery"], 10);

        let on_disk = store::load_value(&path).unwrap();
        assert_eq!(on_disk, resolved.tree);
        assert_eq!(on_disk["timezone"], 8);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"discord": {"token": "abc"}, "timezone": -5}"#).unwrap();

        let first = resolve(default_tree(), &path).unwrap();
        let first_text = fs::read_to_string(&path).unwrap();
        let second = resolve(default_tree(), &path).unwrap();
        let second_text = fs::read_to_string(&path).unwrap();
        let third = resolve(default_tree(), &path).unwrap();

        assert_eq!(first.tree, second.tree);
        assert_eq!(second.tree, third.tree);
        assert_eq!(first_text, second_text);
        assert_eq!(fs::read_to_string(&path).unwrap(), second_text);
    }

    #[test]
    fn test_resolve_write_failure_is_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be cannot be written as a file.
        let path = dir.path().join("config.json");
        fs::create_dir(&path).unwrap();

        assert!(resolve(default_tree(), &path).is_err());
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(
            ResolveOutcome::Loaded { sections: 2 }.to_string(),
            "override loaded (2 section(s))"
        );
        assert_eq!(
            ResolveOutcome::Defaulted("missing".to_string()).to_string(),
            "defaults used (missing)"
        );
    }
}
