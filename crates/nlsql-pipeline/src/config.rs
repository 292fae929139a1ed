//! Pipeline tuning knobs

use nlsql_prompt::SerializerConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Candidates requested from the generator
    pub top_k: usize,

    /// Row cap for returned results (no cap when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<usize>,

    /// Schema serialization budget for the prompt
    #[serde(flatten)]
    pub prompt: SerializerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            max_rows: None,
            prompt: SerializerConfig::default(),
        }
    }
}
