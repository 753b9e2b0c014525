//! JSON document store backing the override file and per-server documents.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::common::error::{ConfigError, ConfigResult};

/// Read and parse a JSON document of any shape.
pub fn load_value(path: impl AsRef<Path>) -> ConfigResult<Value> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;

    serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Read a JSON document whose root must be an object.
pub fn load(path: impl AsRef<Path>) -> ConfigResult<Map<String, Value>> {
    let path = path.as_ref();

    match load_value(path)? {
        Value::Object(map) => Ok(map),
        other => Err(ConfigError::ParseError {
            path: path.display().to_string(),
            message: format!("expected a JSON object at the root, found {}", kind_of(&other)),
        }),
    }
}

/// Write a JSON document with 4-space indentation.
///
/// The document goes to a sibling `.tmp` file first and is renamed over
/// `path`, so an interrupted write leaves the previous file intact.
pub fn dump(path: impl AsRef<Path>, value: &Value) -> ConfigResult<()> {
    let path = path.as_ref();
    let io_err = |e| ConfigError::IoError {
        path: path.display().to_string(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    serde::Serialize::serialize(value, &mut ser).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    buf.push(b'\n');

    let staging = staging_path(path);
    fs::write(&staging, buf).map_err(io_err)?;
    fs::rename(&staging, path).map_err(|e| {
        let _ = fs::remove_file(&staging);
        io_err(e)
    })
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dump_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.json");

        dump(&path, &json!({"a": {"x": 1}, "b": [1, 2]})).unwrap();
        let map = load(&path).unwrap();

        assert_eq!(map["a"]["x"], 1);
        assert_eq!(map["b"], json!([1, 2]));
    }

    #[test]
    fn test_dump_uses_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");

        dump(&path, &json!({"a": 1})).unwrap();
        let text = fs::read_to_string(&path).unwrap();

        assert_eq!(text, "{\n    \"a\": 1\n}\n");
    }

    #[test]
    fn test_dump_replaces_existing_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"old": true, "padding": "a much longer previous document"}"#).unwrap();

        dump(&path, &json!({"new": 1})).unwrap();

        assert_eq!(load_value(&path).unwrap(), json!({"new": 1}));
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["config.json"]);
    }

    #[test]
    fn test_failed_dump_keeps_target_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::create_dir(&path).unwrap();

        assert!(matches!(dump(&path, &json!({"a": 1})), Err(ConfigError::IoError { .. })));
        assert!(path.is_dir());
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn test_staging_path_is_sibling() {
        assert_eq!(
            staging_path(Path::new("conf/config.json")),
            PathBuf::from("conf/config.json.tmp")
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load(dir.path().join("absent.json"));

        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(load(&path), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_load_rejects_non_object_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }
}
