//! Security groups guarding interface endpoints

use crate::graph::{IngressNode, ResourceGraph, ResourceNode, SecurityGroupNode, Synthesize};
use crate::stack::logical_id;
use crate::Result;
use endpoint_api::{Peer, Port, Reference};
use tracing::debug;

/// Allowed inbound traffic
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngressRule {
    pub peer: Peer,
    pub port: Port,
    pub description: String,
}

impl IngressRule {
    /// Identity of the rule within its group, independent of the description
    fn key(&self) -> String {
        format!("from {}:{}", self.peer, self.port)
    }

    fn to_node(&self, group_id: Option<Reference>) -> IngressNode {
        IngressNode {
            group_id,
            ip_protocol: self.port.ip_protocol().to_string(),
            from_port: self.port.from_port(),
            to_port: self.port.to_port(),
            cidr_ip: self.peer.cidr_ip(),
            cidr_ipv6: self.peer.cidr_ipv6(),
            source_security_group_id: self.peer.security_group_id().cloned(),
            description: self.description.clone(),
        }
    }
}

/// Capability to accept ingress rules
///
/// Implemented alike by owned endpoints and by proxies of endpoints that live
/// in another stack.
pub trait IngressRuleAcceptor {
    /// Group receiving the rules
    fn security_group_id(&self) -> &Reference;

    fn add_ingress_rule(&mut self, peer: Peer, port: Port, description: Option<String>);

    fn allow_from(&mut self, peer: Peer, port: Port) {
        self.add_ingress_rule(peer, port, None);
    }

    fn allow_from_any_ipv4(&mut self, port: Port) {
        self.allow_from(Peer::AnyIpv4, port);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct OwnedGroup {
    logical_id: String,
    description: String,
    vpc_id: Reference,
}

/// A security group, created by this stack or referenced by id
///
/// Rules on an owned group are rendered inline. Rules on a referenced group
/// become standalone ingress resources of the stack that added them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecurityGroup {
    path: Vec<String>,
    group_id: Reference,
    owned: Option<OwnedGroup>,
    ingress: Vec<IngressRule>,
}

impl SecurityGroup {
    /// New group at `path` inside the given network
    pub fn create(path: &[&str], vpc_id: Reference) -> Self {
        let logical_id = logical_id(path);
        let description = path.join("/");
        debug!("Allocated security group {}", description);

        Self {
            path: path.iter().map(|c| c.to_string()).collect(),
            group_id: Reference::get_att(logical_id.clone(), "GroupId"),
            owned: Some(OwnedGroup {
                logical_id,
                description,
                vpc_id,
            }),
            ingress: Vec::new(),
        }
    }

    /// Existing group known only by id
    pub fn from_id(path: &[&str], group_id: Reference) -> Self {
        Self {
            path: path.iter().map(|c| c.to_string()).collect(),
            group_id,
            owned: None,
            ingress: Vec::new(),
        }
    }

    pub fn is_owned(&self) -> bool {
        self.owned.is_some()
    }

    pub fn logical_id(&self) -> Option<&str> {
        self.owned.as_ref().map(|g| g.logical_id.as_str())
    }

    pub fn description(&self) -> Option<&str> {
        self.owned.as_ref().map(|g| g.description.as_str())
    }

    pub fn ingress_rules(&self) -> &[IngressRule] {
        &self.ingress
    }
}

impl IngressRuleAcceptor for SecurityGroup {
    fn security_group_id(&self) -> &Reference {
        &self.group_id
    }

    fn add_ingress_rule(&mut self, peer: Peer, port: Port, description: Option<String>) {
        if self.ingress.iter().any(|r| r.peer == peer && r.port == port) {
            return;
        }
        let description = description.unwrap_or_else(|| format!("from {}:{}", peer, port));
        let rule = IngressRule {
            peer,
            port,
            description,
        };

        debug!("Security group {} allows {}", self.group_id, rule.description);
        self.ingress.push(rule);
    }
}

impl Synthesize for SecurityGroup {
    fn synthesize(&self, graph: &mut ResourceGraph) -> Result<()> {
        match &self.owned {
            Some(group) => graph.add_resource(
                group.logical_id.clone(),
                ResourceNode::SecurityGroup(SecurityGroupNode {
                    group_description: group.description.clone(),
                    vpc_id: group.vpc_id.clone(),
                    security_group_ingress: self.ingress.iter().map(|r| r.to_node(None)).collect(),
                }),
            ),
            None => {
                for rule in &self.ingress {
                    let key = rule.key();
                    let mut path: Vec<&str> = self.path.iter().map(String::as_str).collect();
                    path.push(&key);
                    graph.add_resource(
                        logical_id(&path),
                        ResourceNode::SecurityGroupIngress(rule.to_node(Some(self.group_id.clone()))),
                    )?;
                }
                Ok(())
            }
        }
    }
}
