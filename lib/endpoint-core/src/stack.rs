//! Deployment units and the identifiers derived from construct paths

use endpoint_api::v1alpha1::StackSpec;
use endpoint_api::{EndpointService, Reference};
use sha2::{Digest, Sha256};

/// Zones assumed when the region is left to the renderer
const UNRESOLVED_ZONES: [&str; 3] = ["dummy1a", "dummy1b", "dummy1c"];

/// Logical id of the construct at `path`
///
/// The alphanumeric characters of the path followed by 8 hex digits of the
/// path hash, so ids stay readable and distinct paths never collide.
pub fn logical_id(path: &[&str]) -> String {
    let readable: String = path
        .iter()
        .flat_map(|component| component.chars())
        .filter(char::is_ascii_alphanumeric)
        .collect();
    let digest = Sha256::digest(path.join("/").as_bytes());
    format!("{}{}", readable, hex::encode_upper(&digest[..4]))
}

/// A deployment unit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stack {
    name: String,
    region: Option<String>,
    availability_zones: Vec<String>,
}

impl Stack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: None,
            availability_zones: Vec::new(),
        }
    }

    pub fn from_spec(spec: &StackSpec) -> Self {
        Self {
            name: spec.name.clone(),
            region: spec.region.clone(),
            availability_zones: spec.availability_zones.clone(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_availability_zones<I, S>(mut self, zones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.availability_zones = zones.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Zones of the stack: explicit ones, else `a`..`c` of the region
    pub fn availability_zones(&self) -> Vec<String> {
        if !self.availability_zones.is_empty() {
            return self.availability_zones.clone();
        }
        match &self.region {
            Some(region) => ["a", "b", "c"].iter().map(|z| format!("{}{}", region, z)).collect(),
            None => UNRESOLVED_ZONES.iter().map(|z| z.to_string()).collect(),
        }
    }

    /// Export name of the attribute at `path`, unique per stack
    pub fn export_name(&self, path: &[&str]) -> String {
        format!("{}:{}", self.name, logical_id(path))
    }

    /// DNS name of an endpoint service in this stack's region
    pub fn service_name(&self, service: &EndpointService) -> Reference {
        match &self.region {
            Some(region) => Reference::literal(service.name(region)),
            None => Reference::Join(vec![
                Reference::literal(format!("{}.", service.prefix)),
                Reference::region(),
                Reference::literal(format!(".{}", service.suffix)),
            ]),
        }
    }
}
