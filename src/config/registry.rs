//! Registry of configured ARK servers, keyed by their unique key.

use std::collections::HashMap;
use std::path::Path;

use crate::common::error::ConfigResult;
use crate::config::server::{load_server, ServerConfig};

/// All loaded server configs.
///
/// Iteration follows the order in which keys were first seen.
#[derive(Debug, Clone, Default)]
pub struct ServerRegistry {
    servers: Vec<ServerConfig>,
    index: HashMap<String, usize>,
    duplicates: Vec<String>,
}

impl ServerRegistry {
    /// Load every server document in declared order.
    ///
    /// A document whose unique key was already seen replaces the earlier one.
    pub fn build<P: AsRef<Path>>(paths: &[P]) -> ConfigResult<Self> {
        let mut registry = Self::default();
        for path in paths {
            registry.insert(load_server(path)?);
        }
        Ok(registry)
    }

    /// Insert a server, returning the one it replaced.
    pub fn insert(&mut self, server: ServerConfig) -> Option<ServerConfig> {
        match self.index.get(&server.unique_key) {
            Some(&slot) => {
                self.duplicates.push(server.unique_key.clone());
                Some(std::mem::replace(&mut self.servers[slot], server))
            }
            None => {
                self.index.insert(server.unique_key.clone(), self.servers.len());
                self.servers.push(server);
                None
            }
        }
    }

    /// Keys that were replaced by a later document, once per replacement.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    #[allow(dead_code)]
    pub fn get(&self, key: &str) -> Option<&ServerConfig> {
        self.index.get(key).map(|&slot| &self.servers[slot])
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServerConfig> {
        self.servers.iter()
    }

    #[allow(dead_code)]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.servers.iter().map(|s| s.unique_key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::server::tests::{server_document, write_server};
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn test_build_indexes_by_key() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![
            write_server(dir.path(), "a.json", &server_document("island")),
            write_server(dir.path(), "b.json", &server_document("ragnarok")),
        ];

        let registry = ServerRegistry::build(&paths).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.get("island").is_some());
        assert!(registry.get("ragnarok").is_some());
        assert!(registry.get("valguero").is_none());
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["island", "ragnarok"]);
    }

    #[test]
    fn test_duplicate_key_later_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut later = server_document("island");
        later["display_name"] = json!("The Island (new)");
        let paths = vec![
            write_server(dir.path(), "a.json", &server_document("island")),
            write_server(dir.path(), "b.json", &later),
        ];

        let registry = ServerRegistry::build(&paths).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("island").unwrap().display_name, "The Island (new)");
    }

    #[test]
    fn test_build_reports_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![
            write_server(dir.path(), "a.json", &server_document("island")),
            write_server(dir.path(), "b.json", &server_document("ragnarok")),
            write_server(dir.path(), "c.json", &server_document("island")),
        ];

        let registry = ServerRegistry::build(&paths).unwrap();

        assert_eq!(registry.duplicates(), ["island".to_string()]);
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["island", "ragnarok"]);
    }

    #[test]
    fn test_no_duplicates_reported_for_distinct_keys() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![
            write_server(dir.path(), "a.json", &server_document("island")),
            write_server(dir.path(), "b.json", &server_document("ragnarok")),
        ];

        let registry = ServerRegistry::build(&paths).unwrap();
        assert!(registry.duplicates().is_empty());
    }

    #[test]
    fn test_empty_path_list() {
        let registry = ServerRegistry::build::<PathBuf>(&[]).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_bad_document_aborts_build() {
        let dir = tempfile::tempdir().unwrap();
        let mut broken = server_document("ragnarok");
        broken.as_object_mut().unwrap().remove("unique-key");
        let paths = vec![
            write_server(dir.path(), "a.json", &server_document("island")),
            write_server(dir.path(), "b.json", &broken),
        ];

        let err = ServerRegistry::build(&paths).unwrap_err();
        assert!(err.to_string().contains("b.json"));
    }
}
