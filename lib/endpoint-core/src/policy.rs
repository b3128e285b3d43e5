//! Access policy documents of gateway endpoints

use crate::{EndpointError, Result};
use endpoint_api::PolicyStatement;
use serde_json::{json, Value};

/// IAM policy language version
pub const POLICY_VERSION: &str = "2012-10-17";

/// Ordered set of statements attached to a gateway endpoint
///
/// Statements are accepted as-is; completeness is only checked by
/// [`AccessPolicyDocument::validate`], which rendering always runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessPolicyDocument {
    statements: Vec<PolicyStatement>,
}

impl AccessPolicyDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_statement(&mut self, statement: PolicyStatement) {
        self.statements.push(statement);
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Every statement must name at least one principal
    pub fn validate(&self) -> Result<()> {
        match self.statements.iter().position(|s| !s.is_valid()) {
            Some(index) => Err(EndpointError::InvalidPolicy { index }),
            None => Ok(()),
        }
    }

    /// Validated JSON form, `None` for an empty document
    pub fn to_json(&self) -> Result<Option<Value>> {
        self.validate()?;
        if self.statements.is_empty() {
            return Ok(None);
        }

        let statements: Vec<Value> = self.statements.iter().map(PolicyStatement::to_json).collect();
        Ok(Some(json!({
            "Statement": statements,
            "Version": POLICY_VERSION,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document() {
        let document = AccessPolicyDocument::new();
        assert!(document.validate().is_ok());
        assert_eq!(document.to_json().unwrap(), None);
    }

    #[test]
    fn test_statement_without_principal_fails_lazily() {
        let mut document = AccessPolicyDocument::new();
        document.add_statement(PolicyStatement::new().add_any_principal().add_actions(["s3:GetObject"]));
        document.add_statement(PolicyStatement::new().add_actions(["s3:PutObject"]).add_all_resources());

        // Accepted when added
        assert_eq!(document.statements().len(), 2);

        let err = document.to_json().unwrap_err();
        assert!(matches!(err, EndpointError::InvalidPolicy { index: 1 }));
        assert!(err.to_string().contains("`Principal`"));
    }

    #[test]
    fn test_rendered_document() {
        let mut document = AccessPolicyDocument::new();
        document.add_statement(
            PolicyStatement::new()
                .add_any_principal()
                .add_actions(["s3:GetObject", "s3:ListBucket"])
                .add_all_resources(),
        );

        assert_eq!(
            document.to_json().unwrap(),
            Some(json!({
                "Statement": [{
                    "Action": ["s3:GetObject", "s3:ListBucket"],
                    "Effect": "Allow",
                    "Principal": "*",
                    "Resource": "*"
                }],
                "Version": "2012-10-17"
            }))
        );
    }
}
