//! Protector configuration.

use serde::{Deserialize, Serialize};

/// Default annotation key listing the operation tags a field is protected for.
pub const DEFAULT_TAG_NAME: &str = "protectfor";

/// Default annotation key naming a field's container merge policy.
pub const DEFAULT_OPTION_TAG_NAME: &str = "protectopt";

/// ProtectorConfig holds the annotation vocabulary of a
/// [`Protector`](super::Protector).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProtectorConfig {
    /// Annotation key holding the comma separated operation tags.
    pub tag_name: String,
    /// Annotation key holding the container merge policy.
    pub option_tag_name: String,
}

impl Default for ProtectorConfig {
    fn default() -> Self {
        ProtectorConfig {
            tag_name: DEFAULT_TAG_NAME.to_string(),
            option_tag_name: DEFAULT_OPTION_TAG_NAME.to_string(),
        }
    }
}

impl ProtectorConfig {
    /// Creates a new configuration with the given annotation keys.
    pub fn new(tag_name: impl Into<String>, option_tag_name: impl Into<String>) -> Self {
        ProtectorConfig {
            tag_name: tag_name.into(),
            option_tag_name: option_tag_name.into(),
        }
    }

    /// Parses a configuration from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parses a configuration from YAML. Missing keys take their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}
