//! Server chat-log line classification.
//!
//! Lines pulled from the game log over RCON are forwarded to Discord only
//! when they match one of the configured prefix, substring or suffix lists.

use crate::config::ArkMessageFilterConfig;

/// Classifier built from the `ark_message_filter` section.
#[derive(Debug, Clone, Default)]
pub struct ArkMessageFilter {
    prefixes: Vec<String>,
    substrings: Vec<String>,
    suffixes: Vec<String>,
}

impl ArkMessageFilter {
    pub fn new(config: &ArkMessageFilterConfig) -> Self {
        Self {
            prefixes: non_empty(&config.startswith),
            substrings: non_empty(&config.include),
            suffixes: non_empty(&config.endswith),
        }
    }

    /// Returns `true` if the line should be forwarded.
    #[allow(dead_code)]
    pub fn matches(&self, line: &str) -> bool {
        self.prefixes.iter().any(|p| line.starts_with(p.as_str()))
            || self.substrings.iter().any(|s| line.contains(s.as_str()))
            || self.suffixes.iter().any(|s| line.ends_with(s.as_str()))
    }

    /// Number of configured patterns across all lists.
    pub fn pattern_count(&self) -> usize {
        self.prefixes.len() + self.substrings.len() + self.suffixes.len()
    }
}

// An empty pattern would match every line.
fn non_empty(patterns: &[String]) -> Vec<String> {
    patterns.iter().filter(|p| !p.is_empty()).cloned().collect()
}
