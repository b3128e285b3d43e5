//! Virtual networks: subnet inventory and the endpoints built on it

use crate::gateway::{GatewayEndpoint, GatewayEndpointOptions};
use crate::graph::{NetworkNode, ResourceGraph, ResourceNode, SubnetNode, Synthesize};
use crate::interface::{InterfaceEndpoint, InterfaceEndpointOptions};
use crate::security_group::IngressRuleAcceptor;
use crate::stack::logical_id;
use crate::{EndpointError, Result, Stack};
use endpoint_api::v1alpha1::NetworkSpec;
use endpoint_api::{AwsService, Reference, SubnetConfiguration, SubnetCriteria, SubnetType};
use ipnetwork::Ipv4Network;
use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use tracing::{debug, info};

/// Smallest subnet AWS accepts
const MAX_SUBNET_PREFIX: u8 = 28;

/// A subnet of a network
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subnet {
    /// Name within the network, e.g. `PrivateSubnet1`
    pub name: String,
    pub group_name: String,
    pub subnet_type: SubnetType,
    pub availability_zone: String,
    pub cidr: Ipv4Network,
    pub subnet_id: Reference,
    pub route_table_id: Reference,
}

impl Subnet {
    /// Whether `name` designates this subnet, by name or logical id
    pub fn matches_name(&self, name: &str) -> bool {
        self.name == name || matches!(&self.subnet_id, Reference::Ref(id) if id == name)
    }
}

/// Subnets a network offers for endpoint placement
pub trait SubnetInventory {
    fn subnets(&self) -> &[Subnet];

    fn list_subnets(&self, subnet_type: SubnetType) -> Vec<&Subnet> {
        self.subnets().iter().filter(|s| s.subnet_type == subnet_type).collect()
    }

    fn route_table_of<'a>(&self, subnet: &'a Subnet) -> &'a Reference {
        &subnet.route_table_id
    }

    fn availability_zone_of<'a>(&self, subnet: &'a Subnet) -> &'a str {
        &subnet.availability_zone
    }
}

/// A virtual network and the endpoints it owns
#[derive(Clone, Debug)]
pub struct Network {
    id: String,
    stack: Stack,
    vpc_id: Reference,
    cidr: Ipv4Network,
    subnets: Vec<Subnet>,
    gateway_endpoints: Vec<GatewayEndpoint>,
    interface_endpoints: Vec<InterfaceEndpoint>,
}

impl Network {
    /// Lay out a network from its spec and create the configured endpoints
    pub fn new(stack: &Stack, spec: &NetworkSpec) -> Result<Self> {
        let cidr: Ipv4Network = spec.cidr.parse().map_err(|e| {
            EndpointError::Configuration(format!("Invalid CIDR {} for network {}: {}", spec.cidr, spec.id, e))
        })?;

        let zones: Vec<String> = stack.availability_zones().into_iter().take(spec.max_azs).collect();
        if zones.is_empty() {
            return Err(EndpointError::Configuration(format!(
                "Network {} needs at least one availability zone",
                spec.id
            )));
        }

        let subnets = layout_subnets(&spec.id, cidr, &zones, &spec.subnet_configuration)?;
        info!(
            "Laid out network {} ({}) with {} subnets across {} availability zones",
            spec.id,
            cidr,
            subnets.len(),
            zones.len()
        );

        let mut network = Self::from_subnets(stack, &spec.id, cidr, subnets);

        for endpoint in &spec.gateway_endpoints {
            let options = GatewayEndpointOptions::new(endpoint.service).with_subnets(endpoint.subnets.clone());
            let created = network.add_gateway_endpoint(&endpoint.id, options)?;
            for statement in &endpoint.policy_statements {
                created.add_to_policy(statement.clone());
            }
        }

        for endpoint in &spec.interface_endpoints {
            let mut options = InterfaceEndpointOptions::new(endpoint.service).with_subnets(endpoint.subnets.clone());
            options.private_dns_enabled = endpoint.private_dns_enabled;
            if let Some(group_id) = &endpoint.security_group_id {
                options = options.with_security_group(Reference::literal(group_id.clone()));
            }

            let created = network.add_interface_endpoint(&endpoint.id, options)?;
            for rule in &endpoint.ingress {
                created.add_ingress_rule(rule.peer.clone(), rule.port, rule.description.clone());
            }
        }

        Ok(network)
    }

    /// Network over a given subnet inventory
    pub fn from_subnets(stack: &Stack, id: &str, cidr: Ipv4Network, subnets: Vec<Subnet>) -> Self {
        Self {
            id: id.to_string(),
            stack: stack.clone(),
            vpc_id: Reference::logical(logical_id(&[id])),
            cidr,
            subnets,
            gateway_endpoints: Vec::new(),
            interface_endpoints: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn vpc_id(&self) -> &Reference {
        &self.vpc_id
    }

    pub fn cidr(&self) -> Ipv4Network {
        self.cidr
    }

    pub fn add_gateway_endpoint(&mut self, id: &str, options: GatewayEndpointOptions) -> Result<&mut GatewayEndpoint> {
        self.ensure_unique(id)?;
        let endpoint = GatewayEndpoint::create(self, id, &options)?;
        self.gateway_endpoints.push(endpoint);
        let index = self.gateway_endpoints.len() - 1;
        Ok(&mut self.gateway_endpoints[index])
    }

    pub fn add_interface_endpoint(
        &mut self,
        id: &str,
        options: InterfaceEndpointOptions,
    ) -> Result<&mut InterfaceEndpoint> {
        self.ensure_unique(id)?;
        let endpoint = InterfaceEndpoint::create(self, id, &options)?;
        self.interface_endpoints.push(endpoint);
        let index = self.interface_endpoints.len() - 1;
        Ok(&mut self.interface_endpoints[index])
    }

    pub fn add_s3_endpoint(&mut self, id: &str, subnets: Vec<SubnetCriteria>) -> Result<&mut GatewayEndpoint> {
        self.add_gateway_endpoint(id, GatewayEndpointOptions::new(AwsService::S3).with_subnets(subnets))
    }

    pub fn add_dynamodb_endpoint(&mut self, id: &str, subnets: Vec<SubnetCriteria>) -> Result<&mut GatewayEndpoint> {
        self.add_gateway_endpoint(id, GatewayEndpointOptions::new(AwsService::DynamoDb).with_subnets(subnets))
    }

    pub fn gateway_endpoints(&self) -> &[GatewayEndpoint] {
        &self.gateway_endpoints
    }

    pub fn interface_endpoints(&self) -> &[InterfaceEndpoint] {
        &self.interface_endpoints
    }

    pub fn gateway_endpoint(&self, id: &str) -> Option<&GatewayEndpoint> {
        self.gateway_endpoints.iter().find(|e| e.id() == id)
    }

    pub fn gateway_endpoint_mut(&mut self, id: &str) -> Option<&mut GatewayEndpoint> {
        self.gateway_endpoints.iter_mut().find(|e| e.id() == id)
    }

    pub fn interface_endpoint(&self, id: &str) -> Option<&InterfaceEndpoint> {
        self.interface_endpoints.iter().find(|e| e.id() == id)
    }

    pub fn interface_endpoint_mut(&mut self, id: &str) -> Option<&mut InterfaceEndpoint> {
        self.interface_endpoints.iter_mut().find(|e| e.id() == id)
    }

    fn ensure_unique(&self, id: &str) -> Result<()> {
        let taken = self.gateway_endpoint(id).is_some()
            || self.interface_endpoint(id).is_some()
            || self.subnets.iter().any(|s| s.name == id);
        if taken {
            return Err(EndpointError::Configuration(format!(
                "There is already a construct named {} in network {}",
                id, self.id
            )));
        }
        Ok(())
    }
}

impl SubnetInventory for Network {
    fn subnets(&self) -> &[Subnet] {
        &self.subnets
    }
}

impl Synthesize for Network {
    fn synthesize(&self, graph: &mut ResourceGraph) -> Result<()> {
        let Reference::Ref(vpc_logical_id) = &self.vpc_id else {
            return Err(EndpointError::Configuration(format!(
                "Network {} has no logical id",
                self.id
            )));
        };
        graph.add_resource(
            vpc_logical_id.clone(),
            ResourceNode::Network(NetworkNode {
                cidr_block: self.cidr.to_string(),
            }),
        )?;

        for subnet in &self.subnets {
            if let Reference::Ref(subnet_logical_id) = &subnet.subnet_id {
                graph.add_resource(
                    subnet_logical_id.clone(),
                    ResourceNode::Subnet(SubnetNode {
                        vpc_id: self.vpc_id.clone(),
                        availability_zone: subnet.availability_zone.clone(),
                        cidr_block: subnet.cidr.to_string(),
                        subnet_type: subnet.subnet_type,
                        route_table_id: subnet.route_table_id.clone(),
                    }),
                )?;
            }
        }

        for endpoint in &self.gateway_endpoints {
            graph.add(endpoint)?;
        }
        for endpoint in &self.interface_endpoints {
            graph.add(endpoint)?;
        }
        Ok(())
    }
}

/// Allocate one subnet per group and zone, in group order
///
/// Groups without a fixed mask share the network range evenly.
fn layout_subnets(
    network_id: &str,
    cidr: Ipv4Network,
    zones: &[String],
    groups: &[SubnetConfiguration],
) -> Result<Vec<Subnet>> {
    let mut names = BTreeSet::new();
    for group in groups {
        if !names.insert(group.name.as_str()) {
            return Err(EndpointError::Configuration(format!(
                "Subnet group {} is defined twice in network {}",
                group.name, network_id
            )));
        }
    }

    let count = (groups.len() * zones.len()) as u32;
    if count == 0 {
        return Ok(Vec::new());
    }
    let default_prefix = cidr.prefix() as u32 + (u32::BITS - (count - 1).leading_zeros());

    let start = u32::from(cidr.network()) as u64;
    let end = start + (1u64 << (32 - cidr.prefix() as u32));
    let mut cursor = start;
    let mut subnets = Vec::with_capacity(count as usize);

    for group in groups {
        let prefix = group.cidr_mask.map(u32::from).unwrap_or(default_prefix);
        if prefix < cidr.prefix() as u32 || prefix > MAX_SUBNET_PREFIX as u32 {
            return Err(EndpointError::Configuration(format!(
                "Subnet group {} needs a prefix between /{} and /{}, got /{}",
                group.name,
                cidr.prefix(),
                MAX_SUBNET_PREFIX,
                prefix
            )));
        }
        let size = 1u64 << (32 - prefix);

        for (index, zone) in zones.iter().enumerate() {
            cursor = cursor.div_ceil(size) * size;
            if cursor + size > end {
                return Err(EndpointError::Configuration(format!(
                    "Network {} ({}) has no room left for subnet group {}",
                    network_id, cidr, group.name
                )));
            }

            let subnet_cidr = Ipv4Network::new(Ipv4Addr::from(cursor as u32), prefix as u8)
                .map_err(|e| EndpointError::Configuration(e.to_string()))?;
            cursor += size;

            let name = format!("{}Subnet{}", group.name, index + 1);
            debug!("Subnet {} in {} gets {}", name, zone, subnet_cidr);
            subnets.push(Subnet {
                subnet_id: Reference::logical(logical_id(&[network_id, &name, "Subnet"])),
                route_table_id: Reference::logical(logical_id(&[network_id, &name, "RouteTable"])),
                name,
                group_name: group.name.clone(),
                subnet_type: group.subnet_type,
                availability_zone: zone.clone(),
                cidr: subnet_cidr,
            });
        }
    }

    Ok(subnets)
}
