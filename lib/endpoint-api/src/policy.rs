//! Permission statements for endpoint access policies

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Statement effect
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Effect {
    #[default]
    Allow,
    Deny,
}

/// Who a statement applies to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Principal {
    /// Anyone (`*`)
    Any,
    /// AWS account or ARN
    Aws(String),
    /// Service principal, e.g. `ec2.amazonaws.com`
    Service(String),
}

/// A single permission statement
///
/// Statements are built incrementally and only checked for completeness when
/// the enclosing document is validated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PolicyStatement {
    #[serde(default)]
    pub effect: Effect,

    #[serde(default)]
    pub principals: Vec<Principal>,

    #[serde(default)]
    pub actions: Vec<String>,

    #[serde(default)]
    pub resources: Vec<String>,
}

impl PolicyStatement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(mut self) -> Self {
        self.effect = Effect::Allow;
        self
    }

    pub fn deny(mut self) -> Self {
        self.effect = Effect::Deny;
        self
    }

    pub fn add_any_principal(mut self) -> Self {
        self.principals.push(Principal::Any);
        self
    }

    pub fn add_aws_principal(mut self, arn: impl Into<String>) -> Self {
        self.principals.push(Principal::Aws(arn.into()));
        self
    }

    pub fn add_service_principal(mut self, service: impl Into<String>) -> Self {
        self.principals.push(Principal::Service(service.into()));
        self
    }

    pub fn add_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions.extend(actions.into_iter().map(Into::into));
        self
    }

    pub fn add_resources<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources.extend(resources.into_iter().map(Into::into));
        self
    }

    pub fn add_all_resources(self) -> Self {
        self.add_resources(["*"])
    }

    /// A statement is complete once it names at least one principal
    pub fn is_valid(&self) -> bool {
        !self.principals.is_empty()
    }

    /// Render in IAM policy JSON form
    ///
    /// Single-element lists collapse to a scalar, matching how IAM itself
    /// echoes documents back.
    pub fn to_json(&self) -> Value {
        let mut statement = Map::new();
        if !self.actions.is_empty() {
            statement.insert("Action".to_string(), collapse(&self.actions));
        }
        statement.insert("Effect".to_string(), json!(self.effect));
        if let Some(principal) = self.principal_json() {
            statement.insert("Principal".to_string(), principal);
        }
        if !self.resources.is_empty() {
            statement.insert("Resource".to_string(), collapse(&self.resources));
        }
        Value::Object(statement)
    }

    fn principal_json(&self) -> Option<Value> {
        if self.principals.is_empty() {
            return None;
        }
        if self.principals == [Principal::Any] {
            return Some(json!("*"));
        }

        let mut aws = Vec::new();
        let mut service = Vec::new();
        for principal in &self.principals {
            match principal {
                Principal::Any => aws.push("*".to_string()),
                Principal::Aws(arn) => aws.push(arn.clone()),
                Principal::Service(name) => service.push(name.clone()),
            }
        }

        let mut map = Map::new();
        if !aws.is_empty() {
            map.insert("AWS".to_string(), collapse(&aws));
        }
        if !service.is_empty() {
            map.insert("Service".to_string(), collapse(&service));
        }
        Some(Value::Object(map))
    }
}

fn collapse(values: &[String]) -> Value {
    match values {
        [single] => json!(single),
        _ => json!(values),
    }
}
