//! Gateway endpoints: routes to a service added to subnet route tables

use crate::export::{ExportTokens, VPC_ENDPOINT_ID};
use crate::graph::{EndpointNode, ResourceGraph, ResourceNode, Synthesize};
use crate::network::Network;
use crate::policy::AccessPolicyDocument;
use crate::selector::SubnetSelector;
use crate::stack::logical_id;
use crate::{EndpointError, Result, Stack};
use endpoint_api::{AwsService, EndpointType, PolicyStatement, Reference, SubnetCriteria};
use tracing::{debug, info};

/// Options for a new gateway endpoint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayEndpointOptions {
    pub service: AwsService,
    /// Subnets whose route tables get the route. Empty means all private subnets.
    pub subnets: Vec<SubnetCriteria>,
}

impl GatewayEndpointOptions {
    pub fn new(service: AwsService) -> Self {
        Self {
            service,
            subnets: Vec::new(),
        }
    }

    pub fn with_subnets(mut self, subnets: Vec<SubnetCriteria>) -> Self {
        self.subnets = subnets;
        self
    }
}

/// A gateway endpoint owned by a network
#[derive(Clone, Debug)]
pub struct GatewayEndpoint {
    id: String,
    path: Vec<String>,
    logical_id: String,
    stack: Stack,
    service: AwsService,
    service_name: Reference,
    vpc_id: Reference,
    route_table_ids: Vec<Reference>,
    policy: AccessPolicyDocument,
}

impl GatewayEndpoint {
    /// Attach a gateway endpoint to the route tables of the selected subnets
    pub fn create(network: &Network, id: &str, options: &GatewayEndpointOptions) -> Result<Self> {
        let service = options.service.endpoint_service();
        if !service.supports(EndpointType::Gateway) {
            return Err(EndpointError::UnsupportedEndpointType {
                service: options.service,
                expected: EndpointType::Gateway,
            });
        }

        let criteria = if options.subnets.is_empty() {
            vec![SubnetCriteria::default()]
        } else {
            options.subnets.clone()
        };
        let selections = criteria
            .iter()
            .map(|c| SubnetSelector::resolve(network, c))
            .collect::<Result<Vec<_>>>()?;
        let route_table_ids = SubnetSelector::route_tables(&selections);

        let path = [network.id(), id];
        info!(
            "Created gateway endpoint {} for {} on {} route tables",
            path.join("/"),
            options.service,
            route_table_ids.len()
        );

        Ok(Self {
            id: id.to_string(),
            path: path.iter().map(|c| c.to_string()).collect(),
            logical_id: logical_id(&path),
            stack: network.stack().clone(),
            service: options.service,
            service_name: network.stack().service_name(service),
            vpc_id: network.vpc_id().clone(),
            route_table_ids,
            policy: AccessPolicyDocument::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn service(&self) -> AwsService {
        self.service
    }

    pub fn endpoint_id(&self) -> Reference {
        Reference::logical(self.logical_id.clone())
    }

    /// Route tables the endpoint is attached to, each once
    pub fn route_table_ids(&self) -> &[Reference] {
        &self.route_table_ids
    }

    pub fn policy(&self) -> &AccessPolicyDocument {
        &self.policy
    }

    /// Append a statement to the access policy, validated at render time
    pub fn add_to_policy(&mut self, statement: PolicyStatement) {
        debug!("Added policy statement to {}", self.logical_id);
        self.policy.add_statement(statement);
    }

    pub fn validate(&self) -> Result<()> {
        self.policy.validate()
    }

    /// Export the endpoint id; the policy stays with this stack
    pub fn export(&self) -> ExportTokens {
        let path: Vec<&str> = self.path.iter().map(String::as_str).collect();
        ExportTokens::new(&self.stack).with(&self.stack, &path, VPC_ENDPOINT_ID, "VpcEndpointId", self.endpoint_id())
    }

    pub fn to_node(&self) -> Result<EndpointNode> {
        Ok(EndpointNode {
            vpc_endpoint_type: EndpointType::Gateway,
            service_name: self.service_name.clone(),
            vpc_id: self.vpc_id.clone(),
            route_table_ids: self.route_table_ids.clone(),
            subnet_ids: Vec::new(),
            security_group_ids: Vec::new(),
            private_dns_enabled: None,
            policy_document: self.policy.to_json()?,
        })
    }
}

impl Synthesize for GatewayEndpoint {
    fn synthesize(&self, graph: &mut ResourceGraph) -> Result<()> {
        graph.add_resource(self.logical_id.clone(), ResourceNode::VpcEndpoint(self.to_node()?))
    }
}

/// A gateway endpoint owned by another stack
///
/// Only the identity crosses stacks; there is no way to change the policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportedGatewayEndpoint {
    id: String,
    endpoint_id: Reference,
}

impl ImportedGatewayEndpoint {
    pub fn import(stack: &Stack, id: &str, tokens: &ExportTokens) -> Result<Self> {
        let endpoint_id = tokens.resolve(stack, VPC_ENDPOINT_ID)?;
        debug!("Imported gateway endpoint {} into stack {} as {}", endpoint_id, stack.name(), id);
        Ok(Self {
            id: id.to_string(),
            endpoint_id,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn endpoint_id(&self) -> &Reference {
        &self.endpoint_id
    }
}
