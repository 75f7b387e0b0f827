//! Patch overlays
//!
//! A patch overlay is a diff against one previously declared build type:
//! it removes and adds parameters, replaces steps, and edits triggers and
//! failure conditions. Every edit checks the state it expects before
//! changing it, and an overlay is applied all-or-nothing: edits run on a
//! copy of the build type which replaces the original only when every edit
//! succeeded and both the build type and the tree around it still validate.

#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]

mod edits;
mod errors;

pub use edits::{
    Edit, ExpectedParameter, FailureConditionMatcher, ParameterOverride, VcsTriggerFields,
};
pub use errors::PatchError;

use crate::project::{BuildType, Parameter, Project, Step, Validate};
use serde::{Deserialize, Serialize};

/// A named, expectation-checked modification of one build type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchOverlay {
    /// Id of the build type to modify
    pub build_type: String,

    /// Why the overlay exists
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,

    /// Edits, applied in order
    #[serde(default)]
    pub edits: Vec<Edit>,
}

impl PatchOverlay {
    /// Creates an empty overlay targeting `build_type`
    pub fn new(build_type: impl Into<String>) -> Self {
        Self {
            build_type: build_type.into(),
            description: None,
            edits: Vec::new(),
        }
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends an edit
    pub fn edit(mut self, edit: Edit) -> Self {
        self.edits.push(edit);
        self
    }

    /// Removes a parameter that must currently equal `expected_value`
    pub fn remove_parameter(
        self,
        name: impl Into<String>,
        expected_value: impl Into<String>,
    ) -> Self {
        self.edit(Edit::RemoveParameter(ExpectedParameter::new(name, expected_value)))
    }

    /// Removes a parameter that must match every present field of `expected`
    pub fn remove_parameter_matching(self, expected: ExpectedParameter) -> Self {
        self.edit(Edit::RemoveParameter(expected))
    }

    /// Adds a parameter
    pub fn add_parameter(self, parameter: Parameter) -> Self {
        self.edit(Edit::AddParameter { parameter })
    }

    /// Changes a parameter that must currently equal `expected_value`
    pub fn update_parameter(
        self,
        name: impl Into<String>,
        expected_value: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.edit(Edit::UpdateParameter {
            name: name.into(),
            expected_value: expected_value.into(),
            value: value.into(),
        })
    }

    /// Appends the removals and additions of a parameter override
    pub fn parameter_override(mut self, parameters: ParameterOverride) -> Self {
        self.edits.extend(parameters.into_edits());
        self
    }

    /// Appends a step at the end
    pub fn add_step(self, step: Step) -> Self {
        self.edit(Edit::AddStep { step, after: None })
    }

    /// Inserts a step after the step `after`
    pub fn add_step_after(self, step: Step, after: impl Into<String>) -> Self {
        self.edit(Edit::AddStep {
            step,
            after: Some(after.into()),
        })
    }

    /// Removes step `id`, which must currently equal `expected`
    pub fn remove_step(self, id: impl Into<String>, expected: Step) -> Self {
        self.edit(Edit::RemoveStep {
            id: id.into(),
            expected,
        })
    }

    /// Replaces step `id`, which must currently equal `expected`
    pub fn update_step(self, id: impl Into<String>, expected: Step, replacement: Step) -> Self {
        self.edit(Edit::UpdateStep {
            id: id.into(),
            expected,
            replacement,
        })
    }

    /// Writes `set` into the single trigger matching `matching`
    pub fn update_trigger(self, matching: VcsTriggerFields, set: VcsTriggerFields) -> Self {
        self.edit(Edit::UpdateTrigger { matching, set })
    }

    /// Enables or disables the single failure condition matching `matching`
    pub fn update_failure_condition(
        self,
        matching: FailureConditionMatcher,
        enabled: bool,
    ) -> Self {
        self.edit(Edit::UpdateFailureCondition { matching, enabled })
    }

    /// Returns the patched copy of `build_type`, leaving it untouched.
    ///
    /// # Errors
    ///
    /// Returns the first failing edit's error, or
    /// [`PatchError::Validation`] if the result no longer validates.
    pub fn patch(&self, build_type: &BuildType) -> Result<BuildType, PatchError> {
        let mut working = build_type.clone();
        for (index, edit) in self.edits.iter().enumerate() {
            tracing::debug!(build_type = %build_type.id, index, %edit, "applying edit");
            edit.apply(&mut working).inspect_err(|err| {
                tracing::debug!(build_type = %build_type.id, index, %err, "edit rejected");
            })?;
        }
        working.validate()?;
        Ok(working)
    }

    /// Applies the overlay to its build type inside `project`.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::BuildTypeNotFound`] if the target does not
    /// exist, any error of [`patch`](Self::patch), or
    /// [`PatchError::Validation`] if the tree no longer validates, for
    /// instance once templates are merged in. The project is left unchanged
    /// on error.
    pub fn apply(&self, project: &mut Project) -> Result<(), PatchError> {
        let mut working = project.clone();
        let target =
            working
                .build_type_mut(&self.build_type)
                .ok_or_else(|| PatchError::BuildTypeNotFound {
                    id: self.build_type.clone(),
                })?;
        let patched = self.patch(target)?;
        *target = patched;
        working.validate()?;
        *project = working;
        tracing::info!(
            build_type = %self.build_type,
            edits = self.edits.len(),
            "patch overlay applied"
        );
        Ok(())
    }
}

/// Applies overlays in order; the project changes only if all succeed.
///
/// # Errors
///
/// Returns the first overlay error.
pub fn apply_all(project: &mut Project, overlays: &[PatchOverlay]) -> Result<(), PatchError> {
    let mut working = project.clone();
    for overlay in overlays {
        overlay.apply(&mut working)?;
    }
    *project = working;
    Ok(())
}
