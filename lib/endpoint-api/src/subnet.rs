use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of a subnet group
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum SubnetType {
    /// Routed to an internet gateway
    Public,
    /// Outbound access through NAT
    Private,
    /// No route outside the network
    Isolated,
}

impl fmt::Display for SubnetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubnetType::Public => write!(f, "Public"),
            SubnetType::Private => write!(f, "Private"),
            SubnetType::Isolated => write!(f, "Isolated"),
        }
    }
}

/// Subnet group laid out across every availability zone of a network
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubnetConfiguration {
    /// Group name, used as the prefix of subnet names
    pub name: String,

    pub subnet_type: SubnetType,

    /// Optional: fixed prefix length for the subnets of this group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr_mask: Option<u8>,
}

impl SubnetConfiguration {
    pub fn new(name: impl Into<String>, subnet_type: SubnetType) -> Self {
        Self {
            name: name.into(),
            subnet_type,
            cidr_mask: None,
        }
    }

    /// One public and one private group
    pub fn default_layout() -> Vec<Self> {
        vec![
            Self::new("Public", SubnetType::Public),
            Self::new("Private", SubnetType::Private),
        ]
    }
}

/// Criteria for selecting subnets of a network
///
/// Unset fields do not constrain the selection. With neither a type, a group
/// name nor explicit subnets, private subnets are selected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubnetCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_type: Option<SubnetType>,

    /// Name of a subnet group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_group_name: Option<String>,

    /// Explicit subnets, by subnet name or logical id
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<String>,

    /// Restrict the selection to these availability zones
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub availability_zones: Vec<String>,

    /// Keep a single subnet per availability zone
    #[serde(default)]
    pub one_per_az: bool,
}

impl SubnetCriteria {
    pub fn of_type(subnet_type: SubnetType) -> Self {
        Self {
            subnet_type: Some(subnet_type),
            ..Default::default()
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self {
            subnet_group_name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn explicit<I, S>(subnets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subnets: subnets.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn in_zones<I, S>(mut self, zones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.availability_zones = zones.into_iter().map(Into::into).collect();
        self
    }

    pub fn one_per_az(mut self) -> Self {
        self.one_per_az = true;
        self
    }

    /// Subnet type actually applied when resolving these criteria
    pub fn effective_type(&self) -> Option<SubnetType> {
        match (&self.subnet_type, &self.subnet_group_name) {
            (Some(t), _) => Some(*t),
            (None, None) if self.subnets.is_empty() => Some(SubnetType::Private),
            _ => None,
        }
    }
}

impl fmt::Display for SubnetCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(t) = self.effective_type() {
            parts.push(format!("type={}", t));
        }
        if let Some(name) = &self.subnet_group_name {
            parts.push(format!("group={}", name));
        }
        if !self.subnets.is_empty() {
            parts.push(format!("subnets=[{}]", self.subnets.join(",")));
        }
        if !self.availability_zones.is_empty() {
            parts.push(format!("zones=[{}]", self.availability_zones.join(",")));
        }
        write!(f, "{}", parts.join(" "))
    }
}
