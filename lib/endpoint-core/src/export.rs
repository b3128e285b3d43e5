//! Cross-stack references
//!
//! An origin stack exports the identifying attributes of a construct as an
//! [`ExportTokens`] bag. Any number of consumer stacks import the bag into a
//! proxy. The exchange is by value only: importing never touches the origin,
//! and importing the same bag twice yields equal proxies.
//!
//! Export names are not checked for resolvability here; a consumer naming an
//! export that does not exist fails when the renderer resolves it.

use crate::graph::{Output, ResourceGraph, Synthesize};
use crate::{EndpointError, Result, Stack};
use endpoint_api::Reference;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Attribute key of an endpoint id
pub const VPC_ENDPOINT_ID: &str = "vpcEndpointId";
/// Attribute key of a security group id
pub const SECURITY_GROUP_ID: &str = "securityGroupId";

/// One exported attribute
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportToken {
    /// Output id in the origin stack
    pub output_id: String,
    /// Name other stacks import
    pub export_name: String,
    /// Value in the origin stack
    pub value: Reference,
}

/// Exported attributes of one construct, keyed by attribute
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTokens {
    stack: String,
    tokens: BTreeMap<String, ExportToken>,
}

impl ExportTokens {
    pub(crate) fn new(stack: &Stack) -> Self {
        Self {
            stack: stack.name().to_string(),
            tokens: BTreeMap::new(),
        }
    }

    /// Export `value` as attribute `key`, named after `path` + `attribute`
    pub(crate) fn with(mut self, stack: &Stack, path: &[&str], key: &str, attribute: &str, value: Reference) -> Self {
        let mut attribute_path = path.to_vec();
        attribute_path.push(attribute);

        let export_name = stack.export_name(&attribute_path);
        let output_id = export_name
            .strip_prefix(&format!("{}:", stack.name()))
            .unwrap_or(&export_name)
            .to_string();

        debug!("Exporting {} as {}", value, export_name);
        self.tokens.insert(
            key.to_string(),
            ExportToken {
                output_id,
                export_name,
                value,
            },
        );
        self
    }

    /// Name of the origin stack
    pub fn stack_name(&self) -> &str {
        &self.stack
    }

    pub fn get(&self, key: &str) -> Option<&ExportToken> {
        self.tokens.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ExportToken)> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Value of attribute `key` as seen from `consumer`
    ///
    /// Another stack reads the export; the origin stack itself keeps the
    /// direct reference, since a stack cannot import its own exports.
    pub fn resolve(&self, consumer: &Stack, key: &str) -> Result<Reference> {
        let token = self.tokens.get(key).ok_or_else(|| {
            EndpointError::Configuration(format!(
                "Export tokens from stack {} do not contain `{}`",
                self.stack, key
            ))
        })?;

        if consumer.name() == self.stack {
            Ok(token.value.clone())
        } else {
            Ok(Reference::import_value(token.export_name.clone()))
        }
    }
}

impl Synthesize for ExportTokens {
    fn synthesize(&self, graph: &mut ResourceGraph) -> Result<()> {
        if graph.stack_name() != self.stack {
            return Err(EndpointError::Configuration(format!(
                "Exports of stack {} cannot be published by stack {}",
                self.stack,
                graph.stack_name()
            )));
        }

        for token in self.tokens.values() {
            graph.add_output(
                token.output_id.clone(),
                Output {
                    value: token.value.clone(),
                    export_name: token.export_name.clone(),
                },
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(stack: &Stack) -> ExportTokens {
        ExportTokens::new(stack).with(
            stack,
            &["Vpc1", "EC2"],
            SECURITY_GROUP_ID,
            "SecurityGroupId",
            Reference::get_att("Vpc1EC2SecurityGroup", "GroupId"),
        )
    }

    #[test]
    fn test_export_names_are_prefixed_by_stack() {
        let origin = Stack::new("Stack");
        let exported = tokens(&origin);
        let token = exported.get(SECURITY_GROUP_ID).unwrap();

        assert!(token.export_name.starts_with("Stack:Vpc1EC2SecurityGroupId"));
        assert_eq!(format!("Stack:{}", token.output_id), token.export_name);
    }

    #[test]
    fn test_resolve_in_other_stack_imports() {
        let origin = Stack::new("Stack");
        let exported = tokens(&origin);
        let name = exported.get(SECURITY_GROUP_ID).unwrap().export_name.clone();

        let consumer = Stack::new("Consumer");
        assert_eq!(
            exported.resolve(&consumer, SECURITY_GROUP_ID).unwrap(),
            Reference::import_value(name)
        );
        assert_eq!(
            exported.resolve(&origin, SECURITY_GROUP_ID).unwrap(),
            Reference::get_att("Vpc1EC2SecurityGroup", "GroupId")
        );
    }

    #[test]
    fn test_resolve_missing_attribute() {
        let origin = Stack::new("Stack");
        let err = tokens(&origin).resolve(&Stack::new("Consumer"), VPC_ENDPOINT_ID).unwrap_err();
        assert!(err.to_string().contains(VPC_ENDPOINT_ID));
    }

    #[test]
    fn test_outputs_only_in_origin_stack() {
        let origin = Stack::new("Stack");
        let exported = tokens(&origin);

        let mut graph = ResourceGraph::new(&origin);
        graph.add(&exported).unwrap();
        assert_eq!(graph.outputs().count(), 1);

        let mut other = ResourceGraph::new(&Stack::new("Consumer"));
        assert!(other.add(&exported).is_err());
    }

    #[test]
    fn test_tokens_round_trip_as_json() {
        let exported = tokens(&Stack::new("Stack"));
        let json = serde_json::to_string(&exported).unwrap();
        let parsed: ExportTokens = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, exported);
    }
}
