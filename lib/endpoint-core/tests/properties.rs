//! Properties of endpoint placement over generated network layouts

use endpoint_api::v1alpha1::NetworkSpec;
use endpoint_api::{AwsService, Reference, SubnetConfiguration, SubnetCriteria, SubnetType};
use endpoint_core::{
    logical_id, EndpointError, GatewayEndpointOptions, ImportedGatewayEndpoint, ImportedInterfaceEndpoint,
    InterfaceEndpointOptions, Network, Stack, Subnet, SubnetInventory, SubnetSelector,
};
use ipnetwork::Ipv4Network;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

fn subnet_type() -> impl Strategy<Value = SubnetType> {
    prop_oneof![
        Just(SubnetType::Public),
        Just(SubnetType::Private),
        Just(SubnetType::Isolated),
    ]
}

/// Network spec with 1-3 zones and 1-4 subnet groups
fn network_spec() -> impl Strategy<Value = NetworkSpec> {
    (1usize..=3, prop::collection::vec(subnet_type(), 1..=4)).prop_map(|(max_azs, types)| NetworkSpec {
        max_azs,
        subnet_configuration: types
            .into_iter()
            .enumerate()
            .map(|(i, subnet_type)| SubnetConfiguration::new(format!("Group{}", i), subnet_type))
            .collect(),
        ..NetworkSpec::new("Vpc")
    })
}

/// Private subnets spread over zones, some sharing a route table
fn shared_route_tables() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0usize..3, 0usize..3), 1..12)
}

fn inventory(placements: &[(usize, usize)]) -> Network {
    let subnets = placements
        .iter()
        .enumerate()
        .map(|(i, (zone, table))| {
            let name = format!("Subnet{}", i);
            Subnet {
                subnet_id: Reference::logical(logical_id(&["Shared", &name, "Subnet"])),
                route_table_id: Reference::logical(format!("Table{}", table)),
                name,
                group_name: "Private".to_string(),
                subnet_type: SubnetType::Private,
                availability_zone: format!("zone-{}", zone),
                cidr: Ipv4Network::new(Ipv4Addr::new(10, 0, i as u8, 0), 24).unwrap(),
            }
        })
        .collect();
    Network::from_subnets(
        &Stack::new("Stack"),
        "Shared",
        Ipv4Network::new(Ipv4Addr::new(10, 0, 0, 0), 16).unwrap(),
        subnets,
    )
}

proptest! {
    #[test]
    fn route_tables_are_unique_and_complete(placements in shared_route_tables()) {
        let mut network = inventory(&placements);
        let selected: BTreeSet<Reference> = network
            .subnets()
            .iter()
            .map(|s| s.route_table_id.clone())
            .collect();

        let endpoint = network
            .add_gateway_endpoint(
                "S3",
                GatewayEndpointOptions::new(AwsService::S3).with_subnets(vec![
                    SubnetCriteria::of_type(SubnetType::Private),
                    SubnetCriteria::group("Private"),
                ]),
            )
            .unwrap();

        let tables = endpoint.route_table_ids();
        let unique: BTreeSet<Reference> = tables.iter().cloned().collect();
        prop_assert_eq!(unique.len(), tables.len());
        prop_assert_eq!(unique, selected);
    }

    #[test]
    fn interface_placement_is_one_per_zone(spec in network_spec(), service_type in subnet_type()) {
        let mut network = Network::new(&Stack::new("Stack"), &spec).unwrap();

        let mut per_zone: BTreeMap<String, usize> = BTreeMap::new();
        for subnet in network.list_subnets(service_type) {
            *per_zone.entry(subnet.availability_zone.clone()).or_default() += 1;
        }

        let options = InterfaceEndpointOptions::new(AwsService::Sts)
            .with_subnets(SubnetCriteria::of_type(service_type));
        match network.add_interface_endpoint("Sts", options) {
            Ok(endpoint) => {
                let zones = endpoint.subnets().availability_zones();
                let unique: BTreeSet<&str> = zones.iter().copied().collect();
                prop_assert_eq!(unique.len(), zones.len());
                prop_assert!(per_zone.values().all(|count| *count == 1));
            }
            Err(EndpointError::Topology(message)) => {
                prop_assert!(message.contains("availability zone"));
                prop_assert!(per_zone.values().any(|count| *count > 1));
            }
            Err(EndpointError::Configuration(_)) => prop_assert!(per_zone.is_empty()),
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn explicit_one_per_zone_never_fails_on_topology(spec in network_spec()) {
        let network = Network::new(&Stack::new("Stack"), &spec).unwrap();
        let criteria = SubnetCriteria {
            subnet_type: network.subnets().first().map(|s| s.subnet_type),
            ..SubnetCriteria::default()
        }
        .one_per_az();

        let selection = SubnetSelector::resolve_one_per_zone(&network, &criteria).unwrap();
        prop_assert_eq!(selection.len(), spec.max_azs);
    }

    #[test]
    fn imports_are_idempotent(consumer in "[A-Z][a-z]{1,8}", network_id in "[A-Z][a-zA-Z0-9]{1,8}") {
        let origin = Stack::new("Origin");
        let consumer = Stack::new(consumer);
        let mut network = Network::new(&origin, &NetworkSpec::new(network_id)).unwrap();

        let gateway_tokens = network.add_s3_endpoint("S3", Vec::new()).unwrap().export();
        let interface_tokens = network
            .add_interface_endpoint("Ec2", InterfaceEndpointOptions::new(AwsService::Ec2))
            .unwrap()
            .export();

        prop_assert_eq!(
            ImportedGatewayEndpoint::import(&consumer, "Imported", &gateway_tokens).unwrap(),
            ImportedGatewayEndpoint::import(&consumer, "Imported", &gateway_tokens).unwrap()
        );
        prop_assert_eq!(
            ImportedInterfaceEndpoint::import(&consumer, "Imported", &interface_tokens).unwrap(),
            ImportedInterfaceEndpoint::import(&consumer, "Imported", &interface_tokens).unwrap()
        );
    }
}
