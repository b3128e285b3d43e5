use super::endpoint::{GatewayEndpointSpec, InterfaceEndpointSpec};
use crate::SubnetConfiguration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Virtual network with its subnet layout and endpoints
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSpec {
    /// Construct id of the network
    pub id: String,

    /// IPv4 range of the network
    #[serde(default = "default_cidr")]
    pub cidr: String,

    /// Maximum number of availability zones to spread subnets over
    #[serde(default = "default_max_azs")]
    pub max_azs: usize,

    /// Subnet groups, each laid out once per availability zone
    #[serde(default = "SubnetConfiguration::default_layout")]
    pub subnet_configuration: Vec<SubnetConfiguration>,

    #[serde(default)]
    pub gateway_endpoints: Vec<GatewayEndpointSpec>,

    #[serde(default)]
    pub interface_endpoints: Vec<InterfaceEndpointSpec>,
}

impl NetworkSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cidr: default_cidr(),
            max_azs: default_max_azs(),
            subnet_configuration: SubnetConfiguration::default_layout(),
            gateway_endpoints: Vec::new(),
            interface_endpoints: Vec::new(),
        }
    }
}

// Default values
fn default_cidr() -> String {
    "10.0.0.0/16".to_string()
}

fn default_max_azs() -> usize {
    3
}
