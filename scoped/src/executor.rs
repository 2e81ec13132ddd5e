//! The scoped executor.
//!
//! One invocation walks a fixed sequence of phases:
//!
//! ```text
//! Validating -> Entering -> (EnterFailed | Working)
//!            -> (WorkFailed | WorkSucceeded) -> Exiting
//!            -> (Suppressed | Reraised | Completed)
//! ```
//!
//! Only a failed validation skips `Exiting`. For statically typed providers
//! validation is the trait bound and cannot fail at runtime; runtime-checked
//! providers are validated by [`crate::dynamic`].

pub mod config;

use std::fmt;

use tracing::{debug, debug_span, trace};

pub use config::ScopedExecutorConfig;

use crate::logging::event_at;
use crate::provider::ResourceProvider;

/// Phase of a single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Checking the provider's capability set
    Validating,
    /// Running `enter`
    Entering,
    /// `enter` failed; the work is skipped
    EnterFailed,
    /// Running the work
    Working,
    /// The work failed
    WorkFailed,
    /// The work succeeded
    WorkSucceeded,
    /// Running `exit`
    Exiting,
    /// `exit` returned `true` while a failure was in flight
    Suppressed,
    /// `exit` returned `false` and the failure went back to the caller
    Reraised,
    /// `exit` ran with no failure in flight
    Completed,
}

impl Phase {
    /// Stable lowercase name, used as a log field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::Entering => "entering",
            Self::EnterFailed => "enter_failed",
            Self::Working => "working",
            Self::WorkFailed => "work_failed",
            Self::WorkSucceeded => "work_succeeded",
            Self::Exiting => "exiting",
            Self::Suppressed => "suppressed",
            Self::Reraised => "reraised",
            Self::Completed => "completed",
        }
    }

    /// True for phases an invocation ends in after `exit` returned.
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Suppressed | Self::Reraised | Self::Completed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which hook raised the failure an invocation carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorSource {
    /// `enter` failed
    Enter,
    /// The work failed
    Work,
    /// `exit` itself failed
    Exit,
}

/// What happened during one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeReport {
    /// Last phase reached. `Exiting` when `exit` itself failed.
    pub phase: Phase,
    /// `enter` was invoked
    pub entered: bool,
    /// The work was invoked
    pub worked: bool,
    /// `exit` was invoked
    pub exited: bool,
    /// Origin of the failure that was last in flight, if any
    pub error_source: Option<ErrorSource>,
}

impl ScopeReport {
    const fn new() -> Self {
        Self {
            phase: Phase::Validating,
            entered: false,
            worked: false,
            exited: false,
            error_source: None,
        }
    }

    fn advance(&mut self, phase: Phase) {
        trace!(phase = %phase, from = %self.phase, "scope phase transition");
        self.phase = phase;
    }
}

/// Runs units of work inside resource scopes.
///
/// The executor holds only its configuration. It is cheap to clone and
/// independent invocations share nothing.
#[derive(Debug, Clone, Default)]
pub struct ScopedExecutor {
    config: ScopedExecutorConfig,
}

impl ScopedExecutor {
    /// Create an executor with the given configuration.
    pub const fn new(config: ScopedExecutorConfig) -> Self {
        Self { config }
    }

    /// Configuration of this executor.
    pub const fn config(&self) -> &ScopedExecutorConfig {
        &self.config
    }

    /// Run `work` inside the scope of `provider`.
    ///
    /// Returns the provider on success or when `exit` suppressed the failure.
    /// Otherwise returns the failure from `enter` or the work unchanged, or the
    /// failure `exit` raised.
    pub fn run<P, F, T>(&self, provider: P, work: F) -> Result<P, P::Error>
    where
        P: ResourceProvider,
        P::Error: fmt::Debug,
        F: FnOnce(&mut P::Value) -> Result<T, P::Error>,
    {
        self.run_with_report(provider, work).0
    }

    /// Like [`run`](Self::run), also reporting which hooks ran and where the
    /// invocation ended.
    pub fn run_with_report<P, F, T>(
        &self,
        mut provider: P,
        work: F,
    ) -> (Result<P, P::Error>, ScopeReport)
    where
        P: ResourceProvider,
        P::Error: fmt::Debug,
        F: FnOnce(&mut P::Value) -> Result<T, P::Error>,
    {
        let span = debug_span!("scope", label = %self.config.label);
        let _entered = span.enter();
        let mut report = ScopeReport::new();

        report.advance(Phase::Entering);
        report.entered = true;
        let (mut value, mut failure) = match provider.enter() {
            Ok(value) => (Some(value), None),
            Err(error) => {
                debug!(phase = %Phase::EnterFailed, error = ?error, "enter failed; skipping work");
                report.advance(Phase::EnterFailed);
                report.error_source = Some(ErrorSource::Enter);
                (None, Some(error))
            }
        };

        if let Some(value) = value.as_mut() {
            report.advance(Phase::Working);
            report.worked = true;
            match work(value) {
                Ok(_) => report.advance(Phase::WorkSucceeded),
                Err(error) => {
                    debug!(phase = %Phase::WorkFailed, error = ?error, "work failed");
                    report.advance(Phase::WorkFailed);
                    report.error_source = Some(ErrorSource::Work);
                    failure = Some(error);
                }
            }
        }

        report.advance(Phase::Exiting);
        report.exited = true;
        let suppress = match provider.exit(value, failure.as_ref()) {
            Ok(suppress) => suppress,
            Err(error) => {
                debug!(phase = %Phase::Exiting, error = ?error, "exit failed; propagating its failure");
                report.error_source = Some(ErrorSource::Exit);
                return (Err(error), report);
            }
        };

        let outcome = match failure {
            None => {
                report.advance(Phase::Completed);
                Ok(provider)
            }
            Some(error) if suppress => {
                event_at!(
                    self.config.suppressed_error_level,
                    phase = %Phase::Suppressed,
                    error = ?error,
                    "exit suppressed failure"
                );
                report.advance(Phase::Suppressed);
                Ok(provider)
            }
            Some(error) => {
                debug!(phase = %Phase::Reraised, error = ?error, "exit declined to suppress; re-raising");
                report.advance(Phase::Reraised);
                Err(error)
            }
        };

        (outcome, report)
    }
}

/// Run `work` inside the scope of `provider` with the default executor.
///
/// See [`ScopedExecutor::run`].
pub fn run<P, F, T>(provider: P, work: F) -> Result<P, P::Error>
where
    P: ResourceProvider,
    P::Error: fmt::Debug,
    F: FnOnce(&mut P::Value) -> Result<T, P::Error>,
{
    ScopedExecutor::default().run(provider, work)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use tracing_test::traced_test;

    /// Minimal provider whose behavior is fixed at construction.
    #[derive(Debug, Default)]
    struct Gate {
        fail_enter: bool,
        fail_exit: bool,
        suppress: bool,
        exits: Vec<(Option<u8>, Option<String>)>,
    }

    impl ResourceProvider for Gate {
        type Value = u8;
        type Error = String;

        fn enter(&mut self) -> Result<u8, String> {
            if self.fail_enter {
                Err("enter failed".to_string())
            } else {
                Ok(7)
            }
        }

        fn exit(&mut self, value: Option<u8>, error: Option<&String>) -> Result<bool, String> {
            self.exits.push((value, error.cloned()));
            if self.fail_exit {
                Err("exit failed".to_string())
            } else {
                Ok(self.suppress)
            }
        }
    }

    #[test]
    fn clean_run_completes() {
        let (result, report) =
            ScopedExecutor::default().run_with_report(Gate::default(), |value| Ok::<_, String>(*value));

        let gate = result.unwrap();
        assert_eq!(gate.exits, vec![(Some(7), None)]);
        assert_eq!(report.phase, Phase::Completed);
        assert!(report.entered && report.worked && report.exited);
        assert_eq!(report.error_source, None);
    }

    #[test]
    fn enter_failure_skips_work() {
        let gate = Gate {
            fail_enter: true,
            ..Gate::default()
        };
        let mut work_ran = false;

        let (result, report) = ScopedExecutor::default().run_with_report(gate, |_| {
            work_ran = true;
            Ok::<_, String>(())
        });

        assert_eq!(result.unwrap_err(), "enter failed");
        assert!(!work_ran);
        assert!(!report.worked);
        assert_eq!(report.phase, Phase::Reraised);
        assert_eq!(report.error_source, Some(ErrorSource::Enter));
    }

    #[test]
    fn work_failure_is_suppressed_when_exit_returns_true() {
        let gate = Gate {
            suppress: true,
            ..Gate::default()
        };

        let (result, report) = ScopedExecutor::default()
            .run_with_report(gate, |_| Err::<(), _>("work failed".to_string()));

        let gate = result.unwrap();
        assert_eq!(gate.exits, vec![(Some(7), Some("work failed".to_string()))]);
        assert_eq!(report.phase, Phase::Suppressed);
        assert_eq!(report.error_source, Some(ErrorSource::Work));
    }

    #[test]
    fn exit_failure_overrides_work_failure() {
        let gate = Gate {
            fail_exit: true,
            suppress: true,
            ..Gate::default()
        };

        let (result, report) = ScopedExecutor::default()
            .run_with_report(gate, |_| Err::<(), _>("work failed".to_string()));

        assert_eq!(result.unwrap_err(), "exit failed");
        assert_eq!(report.phase, Phase::Exiting);
        assert!(!report.phase.is_settled());
        assert_eq!(report.error_source, Some(ErrorSource::Exit));
    }

    #[test]
    fn suppress_flag_is_ignored_without_failure() {
        let gate = Gate {
            suppress: true,
            ..Gate::default()
        };

        let (result, report) = ScopedExecutor::default().run_with_report(gate, |_| Ok::<_, String>(()));

        assert!(result.is_ok());
        assert_eq!(report.phase, Phase::Completed);
    }

    #[test]
    fn borrowed_provider_is_handed_back() {
        let mut gate = Gate::default();

        let returned = run(&mut gate, |_| Ok::<_, String>(())).unwrap();
        returned.suppress = true;

        assert!(gate.suppress);
        assert_eq!(gate.exits.len(), 1);
    }

    #[test]
    fn phase_names_are_stable() {
        assert_eq!(Phase::EnterFailed.to_string(), "enter_failed");
        assert_eq!(Phase::Reraised.as_str(), "reraised");
        assert!(Phase::Completed.is_settled());
        assert!(!Phase::Working.is_settled());
    }

    #[traced_test]
    #[test]
    fn suppressed_failure_is_logged_at_configured_level() {
        let executor = ScopedExecutor::new(
            ScopedExecutorConfig::default().with_suppressed_error_level(LogLevel::Error),
        );
        let gate = Gate {
            suppress: true,
            ..Gate::default()
        };

        executor
            .run(gate, |_| Err::<(), _>("disk full".to_string()))
            .unwrap();

        assert!(logs_contain("exit suppressed failure"));
        assert!(logs_contain("disk full"));
        assert!(logs_contain("ERROR"));
    }

    #[traced_test]
    #[test]
    fn reraise_is_logged_inside_labelled_span() {
        let label = crate::types::ScopeLabel::try_new("nightly-import".to_string()).unwrap();
        let executor = ScopedExecutor::new(ScopedExecutorConfig::default().with_label(label));

        let result = executor.run(Gate::default(), |_| Err::<(), _>("bad row".to_string()));

        assert!(result.is_err());
        assert!(logs_contain("exit declined to suppress"));
        assert!(logs_contain("nightly-import"));
    }

    #[traced_test]
    #[test]
    fn phase_transitions_carry_the_new_phase() {
        ScopedExecutor::default()
            .run(Gate::default(), |_| Ok::<_, String>(()))
            .unwrap();

        assert!(logs_contain("scope phase transition"));
        assert!(logs_contain("phase=entering"));
        assert!(logs_contain("phase=work_succeeded"));
        assert!(logs_contain("phase=completed"));
    }
}
