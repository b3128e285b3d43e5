//! Interface endpoints: network interfaces in one subnet per availability zone

use crate::export::{ExportTokens, SECURITY_GROUP_ID, VPC_ENDPOINT_ID};
use crate::graph::{EndpointNode, ResourceGraph, ResourceNode, Synthesize};
use crate::network::Network;
use crate::security_group::{IngressRuleAcceptor, SecurityGroup};
use crate::selector::{SubnetSelection, SubnetSelector};
use crate::stack::logical_id;
use crate::{EndpointError, Result, Stack};
use endpoint_api::{AwsService, EndpointType, Peer, Port, Reference, SubnetCriteria};
use tracing::{debug, info};

/// Options for a new interface endpoint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceEndpointOptions {
    pub service: AwsService,
    /// Defaults to all private subnets
    pub subnets: SubnetCriteria,
    /// Overrides the service default when set
    pub private_dns_enabled: Option<bool>,
    /// Existing group to use instead of allocating one
    pub security_group_id: Option<Reference>,
}

impl InterfaceEndpointOptions {
    pub fn new(service: AwsService) -> Self {
        Self {
            service,
            subnets: SubnetCriteria::default(),
            private_dns_enabled: None,
            security_group_id: None,
        }
    }

    pub fn with_subnets(mut self, subnets: SubnetCriteria) -> Self {
        self.subnets = subnets;
        self
    }

    pub fn with_private_dns(mut self, enabled: bool) -> Self {
        self.private_dns_enabled = Some(enabled);
        self
    }

    pub fn with_security_group(mut self, group_id: Reference) -> Self {
        self.security_group_id = Some(group_id);
        self
    }
}

/// An interface endpoint owned by a network
#[derive(Clone, Debug)]
pub struct InterfaceEndpoint {
    id: String,
    path: Vec<String>,
    logical_id: String,
    stack: Stack,
    service: AwsService,
    service_name: Reference,
    vpc_id: Reference,
    subnets: SubnetSelection,
    security_group: SecurityGroup,
    private_dns_enabled: bool,
}

impl InterfaceEndpoint {
    /// Place an interface endpoint in the selected subnets
    ///
    /// The selection must hold at most one subnet per availability zone.
    pub fn create(network: &Network, id: &str, options: &InterfaceEndpointOptions) -> Result<Self> {
        let service_id = options.service;
        let service = service_id.endpoint_service();
        if !service.supports(EndpointType::Interface) {
            return Err(EndpointError::UnsupportedEndpointType {
                service: service_id,
                expected: EndpointType::Interface,
            });
        }

        let subnets = SubnetSelector::resolve_one_per_zone(network, &options.subnets)?;

        let path = [network.id(), id];
        let group_path = [network.id(), id, "SecurityGroup"];
        let security_group = match &options.security_group_id {
            Some(group_id) => SecurityGroup::from_id(&group_path, group_id.clone()),
            None => SecurityGroup::create(&group_path, network.vpc_id().clone()),
        };
        let private_dns_enabled = options
            .private_dns_enabled
            .unwrap_or_else(|| service.private_dns_required());

        info!(
            "Created interface endpoint {} for {} in {} availability zones",
            path.join("/"),
            service_id,
            subnets.len()
        );

        Ok(Self {
            id: id.to_string(),
            path: path.iter().map(|c| c.to_string()).collect(),
            logical_id: logical_id(&path),
            stack: network.stack().clone(),
            service: service_id,
            service_name: network.stack().service_name(service),
            vpc_id: network.vpc_id().clone(),
            subnets,
            security_group,
            private_dns_enabled,
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

    pub fn subnets(&self) -> &SubnetSelection {
        &self.subnets
    }

    pub fn subnet_ids(&self) -> Vec<Reference> {
        self.subnets.subnet_ids()
    }

    pub fn security_group(&self) -> &SecurityGroup {
        &self.security_group
    }

    pub fn private_dns_enabled(&self) -> bool {
        self.private_dns_enabled
    }

    /// Export the endpoint id and its security group id
    pub fn export(&self) -> ExportTokens {
        let path: Vec<&str> = self.path.iter().map(String::as_str).collect();
        ExportTokens::new(&self.stack)
            .with(&self.stack, &path, VPC_ENDPOINT_ID, "VpcEndpointId", self.endpoint_id())
            .with(
                &self.stack,
                &path,
                SECURITY_GROUP_ID,
                "SecurityGroupId",
                self.security_group.security_group_id().clone(),
            )
    }

    pub fn to_node(&self) -> EndpointNode {
        EndpointNode {
            vpc_endpoint_type: EndpointType::Interface,
            service_name: self.service_name.clone(),
            vpc_id: self.vpc_id.clone(),
            route_table_ids: Vec::new(),
            subnet_ids: self.subnet_ids(),
            security_group_ids: vec![self.security_group.security_group_id().clone()],
            private_dns_enabled: Some(self.private_dns_enabled),
            policy_document: None,
        }
    }
}

impl IngressRuleAcceptor for InterfaceEndpoint {
    fn security_group_id(&self) -> &Reference {
        self.security_group.security_group_id()
    }

    fn add_ingress_rule(&mut self, peer: Peer, port: Port, description: Option<String>) {
        self.security_group.add_ingress_rule(peer, port, description);
    }
}

impl Synthesize for InterfaceEndpoint {
    fn synthesize(&self, graph: &mut ResourceGraph) -> Result<()> {
        graph.add(&self.security_group)?;
        graph.add_resource(self.logical_id.clone(), ResourceNode::VpcEndpoint(self.to_node()))
    }
}

/// An interface endpoint owned by another stack
///
/// Holds resolved references only. Ingress rules added here are rendered in
/// the importing stack against the origin's security group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportedInterfaceEndpoint {
    id: String,
    endpoint_id: Reference,
    security_group: SecurityGroup,
}

impl ImportedInterfaceEndpoint {
    pub fn import(stack: &Stack, id: &str, tokens: &ExportTokens) -> Result<Self> {
        let endpoint_id = tokens.resolve(stack, VPC_ENDPOINT_ID)?;
        let group_id = tokens.resolve(stack, SECURITY_GROUP_ID)?;
        debug!("Imported interface endpoint {} into stack {} as {}", endpoint_id, stack.name(), id);

        Ok(Self {
            id: id.to_string(),
            endpoint_id,
            security_group: SecurityGroup::from_id(&[id, "SecurityGroup"], group_id),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn endpoint_id(&self) -> &Reference {
        &self.endpoint_id
    }

    pub fn security_group(&self) -> &SecurityGroup {
        &self.security_group
    }
}

impl IngressRuleAcceptor for ImportedInterfaceEndpoint {
    fn security_group_id(&self) -> &Reference {
        self.security_group.security_group_id()
    }

    fn add_ingress_rule(&mut self, peer: Peer, port: Port, description: Option<String>) {
        self.security_group.add_ingress_rule(peer, port, description);
    }
}

impl Synthesize for ImportedInterfaceEndpoint {
    fn synthesize(&self, graph: &mut ResourceGraph) -> Result<()> {
        graph.add(&self.security_group)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use endpoint_api::v1alpha1::NetworkSpec;
    use endpoint_api::{SubnetConfiguration, SubnetType};

    fn network() -> Network {
        Network::new(&Stack::new("Stack"), &NetworkSpec::new("VpcNetwork")).unwrap()
    }

    #[test]
    fn test_one_subnet_per_zone() {
        let vpc = network();
        let endpoint =
            InterfaceEndpoint::create(&vpc, "EcrDocker", &InterfaceEndpointOptions::new(AwsService::EcrDocker))
                .unwrap();

        assert_eq!(endpoint.subnets().availability_zones(), vec!["dummy1a", "dummy1b", "dummy1c"]);
        assert!(endpoint.private_dns_enabled());
        assert!(endpoint.security_group().is_owned());
        assert_eq!(endpoint.security_group().description(), Some("VpcNetwork/EcrDocker/SecurityGroup"));
    }

    #[test]
    fn test_rejects_gateway_service() {
        let vpc = network();
        let err = InterfaceEndpoint::create(&vpc, "Bad", &InterfaceEndpointOptions::new(AwsService::S3)).unwrap_err();
        assert!(err.to_string().contains("`Interface`"));
    }

    #[test]
    fn test_private_dns_override() {
        let vpc = network();
        let options = InterfaceEndpointOptions::new(AwsService::Sqs).with_private_dns(false);
        let endpoint = InterfaceEndpoint::create(&vpc, "Sqs", &options).unwrap();
        assert!(!endpoint.private_dns_enabled());
        assert_eq!(endpoint.to_node().private_dns_enabled, Some(false));
    }

    #[test]
    fn test_shared_zone_is_topology_error() {
        let spec = NetworkSpec {
            max_azs: 1,
            subnet_configuration: vec![
                SubnetConfiguration::new("app", SubnetType::Private),
                SubnetConfiguration::new("db", SubnetType::Private),
            ],
            ..NetworkSpec::new("VpcNetwork")
        };
        let vpc = Network::new(&Stack::new("Stack"), &spec).unwrap();

        let err = InterfaceEndpoint::create(&vpc, "Bad", &InterfaceEndpointOptions::new(AwsService::SecretsManager))
            .unwrap_err();
        assert!(matches!(err, EndpointError::Topology(_)));
        assert!(err.to_string().contains("availability zone"));

        // Explicitly one per zone is fine
        let options = InterfaceEndpointOptions::new(AwsService::SecretsManager)
            .with_subnets(SubnetCriteria::default().one_per_az());
        assert!(InterfaceEndpoint::create(&vpc, "Good", &options).is_ok());
    }

    #[test]
    fn test_external_security_group() {
        let vpc = network();
        let group_id = Reference::literal("sg-0123456789abcdef0");
        let options = InterfaceEndpointOptions::new(AwsService::Kms).with_security_group(group_id.clone());
        let mut endpoint = InterfaceEndpoint::create(&vpc, "Kms", &options).unwrap();
        endpoint.allow_from_any_ipv4(Port::tcp(443));

        let mut graph = ResourceGraph::new(vpc.stack());
        graph.add(&endpoint).unwrap();

        assert_eq!(graph.security_groups().count(), 0);
        let rules: Vec<_> = graph.ingress_rules().collect();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].group_id.as_ref(), Some(&group_id));
        assert_eq!(graph.endpoints().next().unwrap().security_group_ids, vec![group_id]);
    }

    #[test]
    fn test_import_targets_origin_group() {
        let vpc = network();
        let endpoint = InterfaceEndpoint::create(&vpc, "EC2", &InterfaceEndpointOptions::new(AwsService::Ec2)).unwrap();
        let tokens = endpoint.export();

        let consumer = Stack::new("Consumer");
        let mut imported = ImportedInterfaceEndpoint::import(&consumer, "ImportedEndpoint", &tokens).unwrap();
        imported.allow_from_any_ipv4(Port::tcp(443));

        let export_name = &tokens.get(SECURITY_GROUP_ID).unwrap().export_name;
        assert_eq!(imported.security_group_id(), &Reference::import_value(export_name.clone()));
        assert_eq!(endpoint.security_group().ingress_rules().len(), 0);
    }
}
