//! Declarative macros for build type definitions
//!
//! Shorthands for the constructors in [`crate::project`], so a build
//! type reads close to the CI server's own configuration DSL.

/// Creates a shell script step
#[macro_export]
macro_rules! script {
    ($id:expr, $($line:expr),+ $(,)?) => {
        $crate::project::Step::script($id, [$(::std::string::String::from($line)),+])
    };
}

/// Creates a PowerShell step
#[macro_export]
macro_rules! powershell {
    ($id:expr, $($line:expr),+ $(,)?) => {
        $crate::project::Step::powershell($id, [$(::std::string::String::from($line)),+])
    };
}

/// Creates a list of steps
#[macro_export]
macro_rules! steps {
    ($($step:expr),* $(,)?) => {
        vec![$($step),*]
    };
}

/// Creates a parameter
#[macro_export]
macro_rules! param {
    ($name:expr => $value:expr) => {
        $crate::project::Parameter::new($name, $value)
    };
}

/// Creates a checkbox parameter
#[macro_export]
macro_rules! checkbox {
    ($name:expr => $value:expr, checked = $checked:expr, unchecked = $unchecked:expr $(,)?) => {
        $crate::project::Parameter::checkbox($name, $value, $checked, $unchecked)
    };
    ($name:expr => $value:expr) => {
        $crate::project::Parameter::checkbox($name, $value, "true", "false")
    };
}

/// Creates a parameter toggle deriving a gate flag
#[macro_export]
macro_rules! toggle {
    ($source:expr => $derived:expr) => {
        $crate::project::ParameterToggle::new($source, $derived)
    };
}

/// Creates a VCS trigger
///
/// ```
/// use buildtree::vcs_trigger;
///
/// let trigger = vcs_trigger!(quiet_period = 10, enabled = false);
/// assert_eq!(trigger.config().quiet_period, 10);
/// ```
#[macro_export]
macro_rules! vcs_trigger {
    ($($key:ident = $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut trigger = $crate::project::Trigger::vcs();
        $(
            trigger = $crate::__vcs_trigger_field!(trigger, $key, $value);
        )*
        trigger
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __vcs_trigger_field {
    ($trigger:ident, enabled, $value:expr) => {
        $trigger.with_enabled($value)
    };
    ($trigger:ident, quiet_period, $value:expr) => {
        $trigger.with_quiet_period($value)
    };
    ($trigger:ident, per_checkin_triggering, $value:expr) => {
        $trigger.with_per_checkin_triggering($value)
    };
    ($trigger:ident, queue_optimization, $value:expr) => {
        $trigger.with_queue_optimization($value)
    };
    ($trigger:ident, branch_filter, $value:expr) => {
        $trigger.with_branch_filter($value)
    };
}

/// Creates a text failure condition, optionally gated on a derived flag
#[macro_export]
macro_rules! fail_on_text {
    ($pattern:expr) => {
        $crate::project::FailureCondition::text($crate::project::TextCondition::new(
            $crate::project::TextConditionType::Contains,
            $pattern,
        ))
    };
    ($pattern:expr, gate = $flag:expr) => {
        $crate::fail_on_text!($pattern).gated_by($flag)
    };
}
