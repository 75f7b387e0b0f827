//! Build triggers
//!
//! Only the VCS-change trigger is modeled.

use super::Validate;
use super::errors::ValidationError;
use serde::{Deserialize, Serialize};

/// How long to wait for further commits before triggering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuietPeriodMode {
    /// Trigger immediately
    DoNotUse,
    /// Use the server-wide quiet period
    #[default]
    UseDefault,
    /// Use `quiet_period` seconds
    UseCustom,
}

fn default_true() -> bool {
    true
}

/// Configuration of a VCS-change trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsTriggerConfig {
    /// Whether the trigger is active
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Quiet period mode
    #[serde(default)]
    pub quiet_period_mode: QuietPeriodMode,

    /// Custom quiet period in seconds
    #[serde(default)]
    pub quiet_period: u64,

    /// Trigger one build per check-in
    #[serde(default)]
    pub per_checkin_triggering: bool,

    /// Let the queue merge redundant builds
    #[serde(default = "default_true")]
    pub enable_queue_optimization: bool,

    /// Branch filter rules, one per line
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub branch_filter: Vec<String>,
}

impl Default for VcsTriggerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            quiet_period_mode: QuietPeriodMode::UseDefault,
            quiet_period: 0,
            per_checkin_triggering: false,
            enable_queue_optimization: true,
            branch_filter: Vec::new(),
        }
    }
}

/// Triggers for build type execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Start a build when the VCS root changes
    Vcs(VcsTriggerConfig),
}

impl Trigger {
    /// Creates an enabled VCS trigger with default settings
    #[must_use]
    pub fn vcs() -> Self {
        Self::Vcs(VcsTriggerConfig::default())
    }

    /// Returns the VCS configuration
    #[must_use]
    pub fn config(&self) -> &VcsTriggerConfig {
        match self {
            Self::Vcs(config) => config,
        }
    }

    /// Returns the mutable VCS configuration
    pub fn config_mut(&mut self) -> &mut VcsTriggerConfig {
        match self {
            Self::Vcs(config) => config,
        }
    }

    /// Sets the enabled flag
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.config_mut().enabled = enabled;
        self
    }

    /// Uses a custom quiet period
    #[must_use]
    pub fn with_quiet_period(mut self, seconds: u64) -> Self {
        let config = self.config_mut();
        config.quiet_period_mode = QuietPeriodMode::UseCustom;
        config.quiet_period = seconds;
        self
    }

    /// Sets per-checkin triggering
    #[must_use]
    pub fn with_per_checkin_triggering(mut self, per_checkin: bool) -> Self {
        self.config_mut().per_checkin_triggering = per_checkin;
        self
    }

    /// Sets queue optimization
    #[must_use]
    pub fn with_queue_optimization(mut self, enabled: bool) -> Self {
        self.config_mut().enable_queue_optimization = enabled;
        self
    }

    /// Adds a branch filter rule such as `+:*` or `-:refs/heads/wip/*`
    #[must_use]
    pub fn with_branch_filter(mut self, rule: impl Into<String>) -> Self {
        self.config_mut().branch_filter.push(rule.into());
        self
    }
}

impl Validate for Trigger {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        let config = self.config();
        if config.quiet_period_mode == QuietPeriodMode::UseCustom && config.quiet_period == 0 {
            return Err(ValidationError::InvalidQuietPeriod { value: 0 });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_vcs_defaults() {
        let trigger = Trigger::vcs();
        let config = trigger.config();
        assert!(config.enabled);
        assert_eq!(config.quiet_period_mode, QuietPeriodMode::UseDefault);
        assert!(config.enable_queue_optimization);
        assert!(!config.per_checkin_triggering);
        assert!(trigger.validate().is_ok());
    }

    #[test]
    fn test_trigger_custom_quiet_period() {
        let trigger = Trigger::vcs().with_quiet_period(10).with_enabled(false);
        assert_eq!(trigger.config().quiet_period, 10);
        assert_eq!(trigger.config().quiet_period_mode, QuietPeriodMode::UseCustom);
        assert!(!trigger.config().enabled);
        assert!(trigger.validate().is_ok());
    }

    #[test]
    fn test_trigger_zero_custom_quiet_period_invalid() {
        let trigger = Trigger::vcs().with_quiet_period(0);
        assert_eq!(
            trigger.validate(),
            Err(ValidationError::InvalidQuietPeriod { value: 0 })
        );
    }

    #[test]
    fn test_trigger_deserialize_fills_defaults() {
        let trigger: Trigger = serde_yaml::from_str("type: vcs\nquiet_period: 5\nquiet_period_mode: use_custom\n").unwrap();
        let config = trigger.config();
        assert!(config.enabled);
        assert!(config.enable_queue_optimization);
        assert_eq!(config.quiet_period, 5);
    }
}
