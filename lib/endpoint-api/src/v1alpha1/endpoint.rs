use crate::{AwsService, PolicyStatement, Peer, Port, SubnetCriteria};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Gateway endpoint attached to the route tables of the selected subnets
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEndpointSpec {
    /// Construct id, unique within the network
    pub id: String,

    pub service: AwsService,

    /// Subnets whose route tables get a route to the endpoint.
    /// Defaults to all private subnets.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<SubnetCriteria>,

    /// Statements of the endpoint access policy
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub policy_statements: Vec<PolicyStatement>,

    /// Publish the endpoint id for other stacks
    #[serde(default)]
    pub export: bool,
}

impl GatewayEndpointSpec {
    pub fn new(id: impl Into<String>, service: AwsService) -> Self {
        Self {
            id: id.into(),
            service,
            subnets: Vec::new(),
            policy_statements: Vec::new(),
            export: false,
        }
    }
}

/// Interface endpoint placed in one subnet per availability zone
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceEndpointSpec {
    /// Construct id, unique within the network
    pub id: String,

    pub service: AwsService,

    /// Subnets receiving an endpoint network interface.
    /// Defaults to all private subnets.
    #[serde(default)]
    pub subnets: SubnetCriteria,

    /// Optional: override the service default for private DNS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_dns_enabled: Option<bool>,

    /// Optional: existing security group id instead of a new group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_group_id: Option<String>,

    /// Ingress rules added to the endpoint security group
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingress: Vec<IngressRuleSpec>,

    /// Publish the endpoint and security group ids for other stacks
    #[serde(default)]
    pub export: bool,
}

impl InterfaceEndpointSpec {
    pub fn new(id: impl Into<String>, service: AwsService) -> Self {
        Self {
            id: id.into(),
            service,
            subnets: SubnetCriteria::default(),
            private_dns_enabled: None,
            security_group_id: None,
            ingress: Vec::new(),
            export: false,
        }
    }
}

/// Ingress rule for an endpoint security group
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngressRuleSpec {
    pub peer: Peer,

    pub port: Port,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
