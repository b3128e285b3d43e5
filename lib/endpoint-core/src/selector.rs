//! Subnet selection for endpoint placement

use crate::network::{Subnet, SubnetInventory};
use crate::{EndpointError, Result};
use endpoint_api::{Reference, SubnetCriteria};
use std::collections::BTreeMap;
use tracing::debug;

/// A subnet picked by the selector
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedSubnet {
    pub availability_zone: String,
    pub subnet_id: Reference,
    pub route_table_id: Reference,
}

/// Subnets matched by one set of criteria, ordered by availability zone
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubnetSelection {
    pub subnets: Vec<SelectedSubnet>,
}

impl SubnetSelection {
    pub fn len(&self) -> usize {
        self.subnets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subnets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedSubnet> {
        self.subnets.iter()
    }

    pub fn subnet_ids(&self) -> Vec<Reference> {
        self.subnets.iter().map(|s| s.subnet_id.clone()).collect()
    }

    pub fn availability_zones(&self) -> Vec<&str> {
        self.subnets.iter().map(|s| s.availability_zone.as_str()).collect()
    }
}

/// Resolves subnet criteria against a network inventory
pub struct SubnetSelector;

impl SubnetSelector {
    /// Select the subnets matching `criteria`
    ///
    /// Fails when nothing matches or when an explicitly named subnet does not
    /// exist in the network.
    pub fn resolve<N>(network: &N, criteria: &SubnetCriteria) -> Result<SubnetSelection>
    where
        N: SubnetInventory + ?Sized,
    {
        for name in &criteria.subnets {
            if !network.subnets().iter().any(|s| s.matches_name(name)) {
                return Err(EndpointError::Configuration(format!(
                    "Subnet {} does not exist in the network",
                    name
                )));
            }
        }

        let candidates: Vec<&Subnet> = match criteria.effective_type() {
            Some(subnet_type) => network.list_subnets(subnet_type),
            None => network.subnets().iter().collect(),
        };

        let mut matched: Vec<&Subnet> = candidates
            .into_iter()
            .filter(|s| {
                criteria
                    .subnet_group_name
                    .as_ref()
                    .map_or(true, |group| &s.group_name == group)
            })
            .filter(|s| criteria.subnets.is_empty() || criteria.subnets.iter().any(|n| s.matches_name(n)))
            .filter(|s| {
                criteria.availability_zones.is_empty()
                    || criteria
                        .availability_zones
                        .iter()
                        .any(|z| z == network.availability_zone_of(s))
            })
            .collect();

        // Stable, so subnets of one zone keep inventory order
        matched.sort_by(|a, b| network.availability_zone_of(a).cmp(network.availability_zone_of(b)));
        if criteria.one_per_az {
            matched.dedup_by(|a, b| network.availability_zone_of(a) == network.availability_zone_of(b));
        }

        if matched.is_empty() {
            return Err(EndpointError::Configuration(format!(
                "No subnets match the selection ({})",
                criteria
            )));
        }

        debug!("Selected {} subnets for ({})", matched.len(), criteria);
        Ok(SubnetSelection {
            subnets: matched
                .into_iter()
                .map(|s| SelectedSubnet {
                    availability_zone: network.availability_zone_of(s).to_string(),
                    subnet_id: s.subnet_id.clone(),
                    route_table_id: network.route_table_of(s).clone(),
                })
                .collect(),
        })
    }

    /// Select subnets for network interfaces: at most one per availability zone
    ///
    /// Two matching subnets sharing a zone are a topology error, they are
    /// never silently dropped.
    pub fn resolve_one_per_zone<N>(network: &N, criteria: &SubnetCriteria) -> Result<SubnetSelection>
    where
        N: SubnetInventory + ?Sized,
    {
        let selection = Self::resolve(network, criteria)?;

        let mut zones: BTreeMap<&str, &Reference> = BTreeMap::new();
        for subnet in selection.iter() {
            if let Some(previous) = zones.insert(subnet.availability_zone.as_str(), &subnet.subnet_id) {
                return Err(EndpointError::Topology(format!(
                    "Only one subnet per availability zone is allowed, but {} and {} are both in availability zone {}",
                    previous, subnet.subnet_id, subnet.availability_zone
                )));
            }
        }

        Ok(selection)
    }

    /// Route tables of all selections, each once, in first-seen order
    pub fn route_tables(selections: &[SubnetSelection]) -> Vec<Reference> {
        let mut route_tables: Vec<Reference> = Vec::new();
        for subnet in selections.iter().flat_map(SubnetSelection::iter) {
            if !route_tables.contains(&subnet.route_table_id) {
                route_tables.push(subnet.route_table_id.clone());
            }
        }
        route_tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;
    use crate::Stack;
    use endpoint_api::v1alpha1::NetworkSpec;
    use endpoint_api::{SubnetConfiguration, SubnetType};

    fn network(groups: Vec<SubnetConfiguration>, max_azs: usize) -> Network {
        let spec = NetworkSpec {
            max_azs,
            subnet_configuration: groups,
            ..NetworkSpec::new("Vpc")
        };
        Network::new(&Stack::new("Stack"), &spec).unwrap()
    }

    #[test]
    fn test_default_criteria_select_private_subnets() {
        let vpc = network(SubnetConfiguration::default_layout(), 3);
        let selection = SubnetSelector::resolve(&vpc, &SubnetCriteria::default()).unwrap();

        assert_eq!(selection.len(), 3);
        assert_eq!(selection.availability_zones(), vec!["dummy1a", "dummy1b", "dummy1c"]);
        for subnet in selection.iter() {
            assert!(subnet.subnet_id.to_string().contains("PrivateSubnet"));
        }
    }

    #[test]
    fn test_no_match_is_configuration_error() {
        let vpc = network(vec![SubnetConfiguration::new("Public", SubnetType::Public)], 2);
        let err = SubnetSelector::resolve(&vpc, &SubnetCriteria::default()).unwrap_err();
        assert!(matches!(err, EndpointError::Configuration(_)));
    }

    #[test]
    fn test_unknown_explicit_subnet() {
        let vpc = network(SubnetConfiguration::default_layout(), 2);
        let err = SubnetSelector::resolve(&vpc, &SubnetCriteria::explicit(["PrivateSubnet9"])).unwrap_err();
        assert!(err.to_string().contains("PrivateSubnet9"));
    }

    #[test]
    fn test_explicit_subnets_ignore_type_default() {
        let vpc = network(SubnetConfiguration::default_layout(), 3);
        let selection =
            SubnetSelector::resolve(&vpc, &SubnetCriteria::explicit(["PublicSubnet2", "PrivateSubnet1"])).unwrap();

        assert_eq!(selection.len(), 2);
        // Ordered by zone, not by request order
        assert_eq!(selection.availability_zones(), vec!["dummy1a", "dummy1b"]);
    }

    #[test]
    fn test_zone_constraint() {
        let vpc = network(SubnetConfiguration::default_layout(), 3);
        let criteria = SubnetCriteria::of_type(SubnetType::Public).in_zones(["dummy1c"]);
        let selection = SubnetSelector::resolve(&vpc, &criteria).unwrap();
        assert_eq!(selection.availability_zones(), vec!["dummy1c"]);
    }

    #[test]
    fn test_one_per_az_keeps_first_group() {
        let vpc = network(
            vec![
                SubnetConfiguration::new("app", SubnetType::Private),
                SubnetConfiguration::new("db", SubnetType::Private),
            ],
            2,
        );

        let all = SubnetSelector::resolve(&vpc, &SubnetCriteria::default()).unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all.availability_zones(), vec!["dummy1a", "dummy1a", "dummy1b", "dummy1b"]);

        let one_per_az = SubnetSelector::resolve(&vpc, &SubnetCriteria::default().one_per_az()).unwrap();
        assert_eq!(one_per_az.len(), 2);
        for subnet in one_per_az.iter() {
            assert!(subnet.subnet_id.to_string().contains("appSubnet"));
        }
    }

    #[test]
    fn test_one_per_zone_rejects_shared_zone() {
        let vpc = network(
            vec![
                SubnetConfiguration::new("app", SubnetType::Private),
                SubnetConfiguration::new("db", SubnetType::Private),
            ],
            1,
        );

        let err = SubnetSelector::resolve_one_per_zone(&vpc, &SubnetCriteria::default()).unwrap_err();
        assert!(matches!(err, EndpointError::Topology(_)));
        assert!(err.to_string().contains("availability zone"));

        let selection = SubnetSelector::resolve_one_per_zone(&vpc, &SubnetCriteria::group("db")).unwrap();
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_route_tables_are_deduplicated() {
        let vpc = network(SubnetConfiguration::default_layout(), 3);
        let private = SubnetSelector::resolve(&vpc, &SubnetCriteria::default()).unwrap();
        let public = SubnetSelector::resolve(&vpc, &SubnetCriteria::of_type(SubnetType::Public)).unwrap();

        let tables = SubnetSelector::route_tables(&[public.clone(), private.clone(), private]);
        assert_eq!(tables.len(), 6);
        assert!(tables[0].to_string().contains("PublicSubnet1RouteTable"));
        assert!(tables[3].to_string().contains("PrivateSubnet1RouteTable"));
    }
}
