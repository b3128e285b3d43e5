use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unknown endpoint service: {0}")]
    UnknownService(String),

    #[error("Unsupported document: expected {expected}, found {found}")]
    UnsupportedDocument { expected: String, found: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
