//! Deferred values resolved when a template is rendered

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pseudo parameter holding the deployment region
pub const AWS_REGION: &str = "AWS::Region";

/// A value known only once the stack is deployed
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum Reference {
    /// Plain string
    Literal(String),

    /// Primary identifier of a resource, or a pseudo parameter
    Ref(String),

    /// Attribute of a resource: (logical id, attribute)
    #[serde(rename = "Fn::GetAtt")]
    GetAtt(String, String),

    /// Value exported by another stack
    #[serde(rename = "Fn::ImportValue")]
    ImportValue(String),

    /// Concatenation of references
    #[serde(rename = "Fn::Join")]
    Join(Vec<Reference>),
}

impl Reference {
    pub fn literal(value: impl Into<String>) -> Self {
        Reference::Literal(value.into())
    }

    pub fn logical(logical_id: impl Into<String>) -> Self {
        Reference::Ref(logical_id.into())
    }

    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Reference::GetAtt(logical_id.into(), attribute.into())
    }

    pub fn import_value(export_name: impl Into<String>) -> Self {
        Reference::ImportValue(export_name.into())
    }

    pub fn region() -> Self {
        Reference::Ref(AWS_REGION.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let name = Reference::Join(vec![
            Reference::literal("com.amazonaws."),
            Reference::region(),
            Reference::literal(".s3"),
        ]);
        assert_eq!(name.to_string(), "com.amazonaws.${AWS::Region}.s3");
        assert_eq!(
            Reference::get_att("VpcSecurityGroup", "GroupId").to_string(),
            "${VpcSecurityGroup.GroupId}"
        );
    }

    #[test]
    fn test_serialization() {
        let value = serde_json::to_value(Reference::get_att("Sg", "GroupId")).unwrap();
        assert_eq!(value, serde_json::json!({ "Fn::GetAtt": ["Sg", "GroupId"] }));

        let value = serde_json::to_value(Reference::import_value("Stack:Export")).unwrap();
        assert_eq!(value, serde_json::json!({ "Fn::ImportValue": "Stack:Export" }));
    }
}
