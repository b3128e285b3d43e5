//! Operands of security group ingress rules

use crate::Reference;
use ipnetwork::IpNetwork;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source of allowed traffic
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Peer {
    /// 0.0.0.0/0
    AnyIpv4,
    /// ::/0
    AnyIpv6,
    /// A specific IPv4 or IPv6 range
    Cidr(#[schemars(with = "String")] IpNetwork),
    /// Members of another security group
    SecurityGroup(Reference),
}

impl Peer {
    pub fn any_ipv4() -> Self {
        Peer::AnyIpv4
    }

    pub fn cidr(network: impl Into<IpNetwork>) -> Self {
        Peer::Cidr(network.into())
    }

    /// IPv4 range of this peer, if it is one
    pub fn cidr_ip(&self) -> Option<String> {
        match self {
            Peer::AnyIpv4 => Some("0.0.0.0/0".to_string()),
            Peer::Cidr(IpNetwork::V4(net)) => Some(net.to_string()),
            _ => None,
        }
    }

    /// IPv6 range of this peer, if it is one
    pub fn cidr_ipv6(&self) -> Option<String> {
        match self {
            Peer::AnyIpv6 => Some("::/0".to_string()),
            Peer::Cidr(IpNetwork::V6(net)) => Some(net.to_string()),
            _ => None,
        }
    }

    /// Source security group of this peer, if it is one
    pub fn security_group_id(&self) -> Option<&Reference> {
        match self {
            Peer::SecurityGroup(group_id) => Some(group_id),
            _ => None,
        }
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Peer::AnyIpv4 => write!(f, "0.0.0.0/0"),
            Peer::AnyIpv6 => write!(f, "::/0"),
            Peer::Cidr(net) => write!(f, "{}", net),
            Peer::SecurityGroup(group_id) => write!(f, "{}", group_id),
        }
    }
}

/// Protocol and port range of allowed traffic
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Port {
    Tcp(u16),
    TcpRange { from: u16, to: u16 },
    Udp(u16),
    AllTcp,
    AllTraffic,
}

impl Port {
    pub fn tcp(port: u16) -> Self {
        Port::Tcp(port)
    }

    /// IP protocol, `-1` meaning all protocols
    pub fn ip_protocol(&self) -> &'static str {
        match self {
            Port::Tcp(_) | Port::TcpRange { .. } | Port::AllTcp => "tcp",
            Port::Udp(_) => "udp",
            Port::AllTraffic => "-1",
        }
    }

    pub fn from_port(&self) -> Option<u16> {
        match self {
            Port::Tcp(port) | Port::Udp(port) => Some(*port),
            Port::TcpRange { from, .. } => Some(*from),
            Port::AllTcp => Some(0),
            Port::AllTraffic => None,
        }
    }

    pub fn to_port(&self) -> Option<u16> {
        match self {
            Port::Tcp(port) | Port::Udp(port) => Some(*port),
            Port::TcpRange { to, .. } => Some(*to),
            Port::AllTcp => Some(u16::MAX),
            Port::AllTraffic => None,
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Port::Tcp(port) => write!(f, "{}", port),
            Port::TcpRange { from, to } => write!(f, "{}-{}", from, to),
            Port::Udp(port) => write!(f, "UDP {}", port),
            Port::AllTcp => write!(f, "ALL PORTS"),
            Port::AllTraffic => write!(f, "ALL TRAFFIC"),
        }
    }
}
