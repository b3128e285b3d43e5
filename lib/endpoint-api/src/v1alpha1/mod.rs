/// API version v1alpha1 for endpoint stack documents

pub mod endpoint;
pub mod network;
pub mod stack;

pub use endpoint::{GatewayEndpointSpec, IngressRuleSpec, InterfaceEndpointSpec};
pub use network::NetworkSpec;
pub use stack::StackSpec;

/// API group for endpoint documents
pub const API_GROUP: &str = "endpoints.datum.net";
/// API version for endpoint documents
pub const API_VERSION: &str = "v1alpha1";
/// Kind of a stack document
pub const KIND: &str = "EndpointStack";
