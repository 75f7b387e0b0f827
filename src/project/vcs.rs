//! VCS root declarations

use super::Validate;
use super::errors::ValidationError;
use super::types::validate_id;
use serde::{Deserialize, Serialize};

fn default_branch() -> String {
    "refs/heads/main".to_string()
}

/// A version-control root build types can check out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsRoot {
    /// Identifier referenced by build types
    pub id: String,

    /// Display name
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,

    /// Repository URL
    pub url: String,

    /// Default branch
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Additional monitored branches, one rule per line
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub branch_spec: Vec<String>,
}

impl VcsRoot {
    /// Creates a VCS root on the default branch
    #[must_use]
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            url: url.into(),
            branch: default_branch(),
            branch_spec: Vec::new(),
        }
    }

    /// Sets the default branch
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Adds a branch specification rule such as `+:refs/heads/*`
    #[must_use]
    pub fn with_branch_spec(mut self, rule: impl Into<String>) -> Self {
        self.branch_spec.push(rule.into());
        self
    }
}

impl Validate for VcsRoot {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        validate_id(&self.id)?;
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingUrl {
                root: self.id.clone(),
            });
        }
        Ok(())
    }
}
