//! Context configuration

use serde::{Deserialize, Serialize};

use crate::error::JsError;
use crate::structure::DEFAULT_INDEX_THRESHOLD;

/// Settings applied when a [`crate::Context`] is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Fill the name table with frequently used names up front
    pub preintern_common_names: bool,
    /// Entry count above which structures build a key index
    pub structure_index_threshold: usize,
    /// Start in strict mode (rejected writes throw)
    pub strict_mode: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            preintern_common_names: true,
            structure_index_threshold: DEFAULT_INDEX_THRESHOLD,
            strict_mode: false,
        }
    }
}

impl ContextConfig {
    pub fn from_json_str(source: &str) -> Result<Self, JsError> {
        serde_json::from_str(source).map_err(|e| JsError::config_error(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String, JsError> {
        serde_json::to_string_pretty(self).map_err(|e| JsError::config_error(e.to_string()))
    }
}
