// crates/types/src/catalog.rs
//! Server-declared conversion matrix: category → permitted format pairs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Permitted input/output format codes for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSet {
    #[serde(default)]
    pub input: Vec<String>,
    #[serde(default)]
    pub output: Vec<String>,
}

/// The full conversion matrix, immutable once fetched.
///
/// Backed by an `IndexMap` so `categories()` iterates in the server's
/// declared order — the first category is the UI's default selection.
/// Format codes are case-insensitive identifiers; all lookups normalize
/// to lowercase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatCatalog(IndexMap<String, FormatSet>);

impl FormatCatalog {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Category names in server order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// The default selection: the first category the server declared.
    pub fn default_category(&self) -> Option<&str> {
        self.0.keys().next().map(String::as_str)
    }

    fn get(&self, category: &str) -> Option<&FormatSet> {
        let wanted = category.to_lowercase();
        self.0
            .iter()
            .find(|(name, _)| name.to_lowercase() == wanted)
            .map(|(_, set)| set)
    }

    /// Declared input formats for a category (empty when unknown).
    pub fn input_formats(&self, category: &str) -> &[String] {
        self.get(category).map(|s| s.input.as_slice()).unwrap_or(&[])
    }

    /// Declared output formats for a category (empty when unknown).
    pub fn output_formats(&self, category: &str) -> &[String] {
        self.get(category).map(|s| s.output.as_slice()).unwrap_or(&[])
    }

    /// Case-insensitive membership test against a category's input set.
    pub fn is_known_input(&self, category: &str, format: &str) -> bool {
        let wanted = format.to_lowercase();
        self.input_formats(category)
            .iter()
            .any(|f| f.to_lowercase() == wanted)
    }

    /// Case-insensitive membership test against a category's output set.
    pub fn is_known_output(&self, category: &str, format: &str) -> bool {
        let wanted = format.to_lowercase();
        self.output_formats(category)
            .iter()
            .any(|f| f.to_lowercase() == wanted)
    }
}
