//! Core endpoint graph building
//!
//! This library provides:
//! - Networks with their subnet layout, and subnet selection
//! - Gateway and interface endpoints with their policies and security groups
//! - Export and import of endpoints across stacks
//! - Synthesis into the resource graph consumed by the template renderer

pub mod error;
pub mod export;
pub mod gateway;
pub mod graph;
pub mod interface;
pub mod network;
pub mod policy;
pub mod security_group;
pub mod selector;
pub mod stack;
pub mod synth;

pub use error::{EndpointError, Result};
pub use export::{ExportToken, ExportTokens};
pub use gateway::{GatewayEndpoint, GatewayEndpointOptions, ImportedGatewayEndpoint};
pub use graph::{ResourceGraph, ResourceNode, Synthesize};
pub use interface::{ImportedInterfaceEndpoint, InterfaceEndpoint, InterfaceEndpointOptions};
pub use network::{Network, Subnet, SubnetInventory};
pub use policy::AccessPolicyDocument;
pub use security_group::{IngressRule, IngressRuleAcceptor, SecurityGroup};
pub use selector::{SubnetSelection, SubnetSelector};
pub use stack::{logical_id, Stack};
pub use synth::synthesize_stack;
