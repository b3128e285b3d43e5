use super::{network::NetworkSpec, API_GROUP, API_VERSION, KIND};
use crate::{ApiError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A deployment unit: the networks built together and exported as one
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StackSpec {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_kind")]
    pub kind: String,

    /// Stack name, the prefix of every export name
    pub name: String,

    /// Optional: deployment region. Left to the renderer when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Optional: availability zones available to the stack
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub availability_zones: Vec<String>,

    #[serde(default)]
    pub networks: Vec<NetworkSpec>,
}

impl StackSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            name: name.into(),
            region: None,
            availability_zones: Vec::new(),
            networks: Vec::new(),
        }
    }

    /// Parse and check a stack document
    ///
    /// Enum values with data are written as single-key maps (`tcp: 443`,
    /// `aws: arn:...`) rather than YAML tags.
    pub fn from_yaml(document: &str) -> Result<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(document);
        let spec: StackSpec = serde_yaml::with::singleton_map_recursive::deserialize(deserializer)?;

        let expected = default_api_version();
        if spec.api_version != expected {
            return Err(ApiError::UnsupportedDocument {
                expected,
                found: spec.api_version,
            });
        }
        if spec.kind != KIND {
            return Err(ApiError::UnsupportedDocument {
                expected: KIND.to_string(),
                found: spec.kind,
            });
        }

        Ok(spec)
    }
}

fn default_api_version() -> String {
    format!("{}/{}", API_GROUP, API_VERSION)
}

fn default_kind() -> String {
    KIND.to_string()
}
