//! Building a stack's resource graph from its configuration document

use crate::graph::ResourceGraph;
use crate::network::Network;
use crate::{Result, Stack};
use endpoint_api::v1alpha1::StackSpec;
use tracing::info;

/// Build every network of the document and publish the flagged exports
pub fn synthesize_stack(spec: &StackSpec) -> Result<ResourceGraph> {
    let stack = Stack::from_spec(spec);
    let mut graph = ResourceGraph::new(&stack);

    for network_spec in &spec.networks {
        let network = Network::new(&stack, network_spec)?;
        graph.add(&network)?;

        for endpoint in network_spec.gateway_endpoints.iter().filter(|e| e.export) {
            if let Some(created) = network.gateway_endpoint(&endpoint.id) {
                graph.add(&created.export())?;
            }
        }
        for endpoint in network_spec.interface_endpoints.iter().filter(|e| e.export) {
            if let Some(created) = network.interface_endpoint(&endpoint.id) {
                graph.add(&created.export())?;
            }
        }
    }

    info!(
        "Synthesized stack {} with {} resources and {} outputs",
        stack.name(),
        graph.resources().count(),
        graph.outputs().count()
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ResourceNode;
    use crate::EndpointError;
    use endpoint_api::v1alpha1::{GatewayEndpointSpec, InterfaceEndpointSpec, NetworkSpec};
    use endpoint_api::{AwsService, PolicyStatement};

    #[test]
    fn test_exports_only_flagged_endpoints() {
        let mut s3 = GatewayEndpointSpec::new("S3", AwsService::S3);
        s3.export = true;
        let mut ecr = InterfaceEndpointSpec::new("Ecr", AwsService::Ecr);
        ecr.export = true;
        let sqs = InterfaceEndpointSpec::new("Sqs", AwsService::Sqs);

        let mut spec = StackSpec::new("Stack");
        spec.region = Some("us-east-1".to_string());
        spec.networks.push(NetworkSpec {
            gateway_endpoints: vec![s3],
            interface_endpoints: vec![ecr, sqs],
            ..NetworkSpec::new("VpcNetwork")
        });

        let graph = synthesize_stack(&spec).unwrap();
        // one for S3, two for Ecr
        assert_eq!(graph.outputs().count(), 3);
        assert_eq!(graph.endpoints().count(), 3);
        for (_, output) in graph.outputs() {
            assert!(output.export_name.starts_with("Stack:VpcNetwork"));
        }
    }

    #[test]
    fn test_service_names_use_region() {
        let mut spec = StackSpec::new("Stack");
        spec.region = Some("eu-west-1".to_string());
        spec.networks.push(NetworkSpec {
            gateway_endpoints: vec![GatewayEndpointSpec::new("S3", AwsService::S3)],
            ..NetworkSpec::new("VpcNetwork")
        });

        let graph = synthesize_stack(&spec).unwrap();
        let endpoint = graph.endpoints().next().unwrap();
        assert_eq!(endpoint.service_name.to_string(), "com.amazonaws.eu-west-1.s3");
    }

    #[test]
    fn test_invalid_policy_fails_synthesis() {
        let mut s3 = GatewayEndpointSpec::new("S3", AwsService::S3);
        s3.policy_statements.push(PolicyStatement::new().add_actions(["s3:GetObject"]));

        let mut spec = StackSpec::new("Stack");
        spec.networks.push(NetworkSpec {
            gateway_endpoints: vec![s3],
            ..NetworkSpec::new("VpcNetwork")
        });

        let err = synthesize_stack(&spec).unwrap_err();
        assert!(matches!(err, EndpointError::InvalidPolicy { index: 0 }));
    }

    #[test]
    fn test_two_networks() {
        let mut spec = StackSpec::new("Stack");
        spec.networks.push(NetworkSpec::new("Blue"));
        spec.networks.push(NetworkSpec {
            cidr: "10.1.0.0/16".to_string(),
            ..NetworkSpec::new("Green")
        });

        let graph = synthesize_stack(&spec).unwrap();
        let networks = graph
            .resources()
            .filter(|(_, node)| matches!(node, ResourceNode::Network(_)))
            .count();
        assert_eq!(networks, 2);
    }
}
