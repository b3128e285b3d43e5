//! Datum endpoint API types
//!
//! This library defines the value objects shared by the endpoint graph builder:
//! - AwsService: the fixed catalog of services reachable through VPC endpoints
//! - SubnetType / SubnetCriteria: how endpoints pick the subnets they attach to
//! - PolicyStatement: permission statements for gateway endpoint policies
//! - Peer / Port: security group ingress rule operands
//! - Reference: deferred values resolved by the template renderer
//! - v1alpha1: YAML configuration documents

pub mod connection;
pub mod error;
pub mod policy;
pub mod reference;
pub mod service;
pub mod subnet;
pub mod v1alpha1;

pub use connection::{Peer, Port};
pub use error::{ApiError, Result};
pub use policy::{Effect, PolicyStatement, Principal};
pub use reference::Reference;
pub use service::{AwsService, EndpointService, EndpointType};
pub use subnet::{SubnetConfiguration, SubnetCriteria, SubnetType};
