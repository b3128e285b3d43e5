//! Abstract resource graph handed to the template renderer

use crate::{EndpointError, Result, Stack};
use endpoint_api::{EndpointType, Reference, SubnetType};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Something that contributes resources to a stack's graph
pub trait Synthesize {
    fn synthesize(&self, graph: &mut ResourceGraph) -> Result<()>;
}

/// The virtual network itself
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkNode {
    pub cidr_block: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubnetNode {
    pub vpc_id: Reference,
    pub availability_zone: String,
    pub cidr_block: String,
    pub subnet_type: SubnetType,
    pub route_table_id: Reference,
}

/// A gateway or interface endpoint
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EndpointNode {
    pub vpc_endpoint_type: EndpointType,
    pub service_name: Reference,
    pub vpc_id: Reference,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub route_table_ids: Vec<Reference>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subnet_ids: Vec<Reference>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_group_ids: Vec<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_dns_enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_document: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroupNode {
    pub group_description: String,
    pub vpc_id: Reference,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_group_ingress: Vec<IngressNode>,
}

/// Ingress rule, inline in its group or standalone with `group_id` set
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IngressNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Reference>,

    pub ip_protocol: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_port: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_port: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr_ip: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr_ipv6: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_security_group_id: Option<Reference>,

    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "Kind")]
pub enum ResourceNode {
    Network(NetworkNode),
    Subnet(SubnetNode),
    VpcEndpoint(EndpointNode),
    SecurityGroup(SecurityGroupNode),
    SecurityGroupIngress(IngressNode),
}

/// Value published for other stacks
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub value: Reference,
    pub export_name: String,
}

/// Resources and outputs of one stack, keyed by logical id
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceGraph {
    stack: String,
    resources: BTreeMap<String, ResourceNode>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    outputs: BTreeMap<String, Output>,
}

impl ResourceGraph {
    pub fn new(stack: &Stack) -> Self {
        Self {
            stack: stack.name().to_string(),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn stack_name(&self) -> &str {
        &self.stack
    }

    /// Synthesize a construct into this graph
    pub fn add<S>(&mut self, construct: &S) -> Result<&mut Self>
    where
        S: Synthesize + ?Sized,
    {
        construct.synthesize(self)?;
        Ok(self)
    }

    pub fn add_resource(&mut self, logical_id: String, node: ResourceNode) -> Result<()> {
        if self.resources.contains_key(&logical_id) {
            return Err(EndpointError::Configuration(format!(
                "Resource {} is already defined in stack {}",
                logical_id, self.stack
            )));
        }
        debug!("Added resource {} to stack {}", logical_id, self.stack);
        self.resources.insert(logical_id, node);
        Ok(())
    }

    pub fn add_output(&mut self, output_id: String, output: Output) -> Result<()> {
        if self.outputs.contains_key(&output_id) {
            return Err(EndpointError::Configuration(format!(
                "Output {} is already defined in stack {}",
                output_id, self.stack
            )));
        }
        self.outputs.insert(output_id, output);
        Ok(())
    }

    pub fn resource(&self, logical_id: &str) -> Option<&ResourceNode> {
        self.resources.get(logical_id)
    }

    pub fn resources(&self) -> impl Iterator<Item = (&String, &ResourceNode)> {
        self.resources.iter()
    }

    pub fn outputs(&self) -> impl Iterator<Item = (&String, &Output)> {
        self.outputs.iter()
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &EndpointNode> {
        self.resources.values().filter_map(|node| match node {
            ResourceNode::VpcEndpoint(endpoint) => Some(endpoint),
            _ => None,
        })
    }

    pub fn security_groups(&self) -> impl Iterator<Item = &SecurityGroupNode> {
        self.resources.values().filter_map(|node| match node {
            ResourceNode::SecurityGroup(group) => Some(group),
            _ => None,
        })
    }

    /// Standalone ingress rules
    pub fn ingress_rules(&self) -> impl Iterator<Item = &IngressNode> {
        self.resources.values().filter_map(|node| match node {
            ResourceNode::SecurityGroupIngress(rule) => Some(rule),
            _ => None,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
