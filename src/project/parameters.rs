//! Build parameters
//!
//! Parameters are name/value pairs declared on a build type. A parameter
//! may carry display semantics (normal, hidden, prompt) and, for
//! checkbox-style parameters, the values written when checked or unchecked.

#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]

use super::errors::ValidationError;
use super::types::validate_parameter_name;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// How a parameter is presented when a build is started manually
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterDisplay {
    /// Shown in the run dialog
    #[default]
    Normal,
    /// Not shown in the run dialog
    Hidden,
    /// Must be confirmed before the build starts
    Prompt,
}

/// Values a checkbox parameter takes in each state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Checkbox {
    /// Value when checked
    pub checked: String,
    /// Value when unchecked
    #[serde(default)]
    pub unchecked: String,
}

/// A single parameter definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Parameter {
    /// Parameter name
    pub name: String,

    /// Current (default) value
    #[serde(default)]
    pub value: String,

    /// Display semantics
    #[serde(default)]
    pub display: ParameterDisplay,

    /// Label shown in the run dialog
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,

    /// Description shown in the run dialog
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,

    /// Checkbox values, for checkbox-style parameters
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub checkbox: Option<Checkbox>,
}

impl Parameter {
    /// Creates a plain text parameter
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            display: ParameterDisplay::Normal,
            label: None,
            description: None,
            checkbox: None,
        }
    }

    /// Creates a checkbox parameter whose value is `checked` or `unchecked`
    pub fn checkbox(
        name: impl Into<String>,
        value: impl Into<String>,
        checked: impl Into<String>,
        unchecked: impl Into<String>,
    ) -> Self {
        Self {
            checkbox: Some(Checkbox {
                checked: checked.into(),
                unchecked: unchecked.into(),
            }),
            ..Self::new(name, value)
        }
    }

    /// Sets display semantics
    pub fn with_display(mut self, display: ParameterDisplay) -> Self {
        self.display = display;
        self
    }

    /// Sets the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the checked state for checkbox parameters.
    ///
    /// `None` for non-checkbox parameters or values matching neither state.
    pub fn is_checked(&self) -> Option<bool> {
        let checkbox = self.checkbox.as_ref()?;
        if self.value == checkbox.checked {
            Some(true)
        } else if self.value == checkbox.unchecked {
            Some(false)
        } else {
            None
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Ordered collection of parameters with unique names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Parameters(Vec<Parameter>);

impl Parameters {
    /// Creates a new empty parameters set
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a parameter by name
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.0.iter().find(|p| p.name == name)
    }

    /// Gets a mutable parameter by name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.0.iter_mut().find(|p| p.name == name)
    }

    /// Returns the value of a parameter
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).map(|p| p.value.as_str())
    }

    /// Returns true if a parameter with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Adds a parameter to the parameters of `build_type`, keeping names
    /// unique.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateParameter`] if a parameter with
    /// the same name exists.
    pub fn insert(&mut self, build_type: &str, parameter: Parameter) -> Result<(), ValidationError> {
        if self.contains(&parameter.name) {
            return Err(ValidationError::DuplicateParameter {
                build_type: build_type.to_string(),
                name: parameter.name,
            });
        }
        self.0.push(parameter);
        Ok(())
    }

    /// Replaces the parameter with the same name, or appends it
    pub fn upsert(&mut self, parameter: Parameter) {
        match self.get_mut(&parameter.name) {
            Some(existing) => *existing = parameter,
            None => self.0.push(parameter),
        }
    }

    /// Appends without the uniqueness check; callers validate afterwards
    pub(crate) fn push(&mut self, parameter: Parameter) {
        self.0.push(parameter);
    }

    /// Removes a parameter by name
    pub fn remove(&mut self, name: &str) -> Option<Parameter> {
        let index = self.0.iter().position(|p| p.name == name)?;
        Some(self.0.remove(index))
    }

    /// Returns an iterator over all parameters
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.0.iter()
    }

    /// Returns the number of parameters
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no parameters
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Validates names and their uniqueness within `build_type`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidNameChars`] or
    /// [`ValidationError::DuplicateParameter`].
    pub fn validate_for(&self, build_type: &str) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for parameter in &self.0 {
            validate_parameter_name(&parameter.name)?;
            if !seen.insert(parameter.name.as_str()) {
                return Err(ValidationError::DuplicateParameter {
                    build_type: build_type.to_string(),
                    name: parameter.name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl From<Vec<Parameter>> for Parameters {
    fn from(params: Vec<Parameter>) -> Self {
        Self(params)
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
