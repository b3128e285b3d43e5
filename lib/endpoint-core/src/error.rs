use endpoint_api::{AwsService, EndpointType};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EndpointError>;

#[derive(Error, Debug)]
pub enum EndpointError {
    #[error("Invalid endpoint configuration: {0}")]
    Configuration(String),

    #[error("Service {service} cannot be used with an endpoint of type `{expected}`")]
    UnsupportedEndpointType {
        service: AwsService,
        expected: EndpointType,
    },

    #[error("Invalid endpoint topology: {0}")]
    Topology(String),

    #[error("Invalid policy document: statement {index} must specify a `Principal`")]
    InvalidPolicy { index: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
