//! End-to-end behavior of the scope protocol with statically typed providers.

use scoped::testing::prelude::*;
use scoped::{ErrorSource, OperationError, Phase, ResourceProvider, ScopedExecutor};

type Recorder = RecordingProvider<u32, OperationError>;

#[test]
fn enter_and_work_succeed() {
    let provider = Recorder::entering(42);
    let log = provider.log();

    let result = scoped::run(provider, |value| {
        log.record_work(*value);
        Ok::<_, OperationError>(())
    });

    assert!(result.is_ok());
    assert_eq!(
        log.calls(),
        vec![
            Call::Enter,
            Call::Work { value: 42 },
            Call::Exit {
                value: Some(42),
                error: None
            },
        ]
    );
}

#[test]
fn run_returns_the_provider_not_the_enter_value() {
    let provider = Recorder::entering(42).suppressing();
    let log = provider.log();

    let returned = scoped::run(provider, |_| Ok::<_, OperationError>(())).unwrap();

    // The returned provider shares the original's log.
    assert_eq!(returned.log().exit_count(), 1);
    assert_eq!(log.exit_count(), 1);
}

#[test]
fn work_failure_propagates_when_exit_declines() {
    let failure = OperationError::new("__exit() did not suppress me");
    let raised = failure.clone();
    let provider = Recorder::entering(42).propagating();
    let log = provider.log();

    let error = scoped::run(provider, move |_| Err::<(), _>(raised)).unwrap_err();

    assert_eq!(error, failure);
    assert_eq!(error.id(), failure.id());
    assert_eq!(error.message(), "__exit() did not suppress me");
    assert_eq!(log.exits(), vec![(Some(42), Some(failure))]);
}

#[test]
fn work_failure_is_suppressed_when_exit_accepts() {
    let failure = OperationError::new("handled by exit");
    let raised = failure.clone();
    let provider = Recorder::entering(42).suppressing();
    let log = provider.log();

    let result = scoped::run(provider, move |_| Err::<(), _>(raised));

    assert!(result.is_ok());
    assert_eq!(log.exits(), vec![(Some(42), Some(failure))]);
}

#[test]
fn enter_failure_skips_work_and_still_exits() {
    let failure = OperationError::new("enter refused");
    let provider = Recorder::failing_enter(failure.clone()).suppressing();
    let log = provider.log();

    let result = scoped::run(provider, |value| {
        log.record_work(*value);
        Ok::<_, OperationError>(())
    });

    assert!(result.is_ok());
    assert_eq!(log.work_count(), 0);
    assert_eq!(log.enter_count(), 1);
    assert_eq!(log.exits(), vec![(None, Some(failure))]);
}

#[test]
fn enter_failure_is_reraised_when_exit_declines() {
    let failure = OperationError::new("enter refused");
    let provider = Recorder::failing_enter(failure.clone());
    let log = provider.log();

    let error = scoped::run(provider, |_| Ok::<_, OperationError>(())).unwrap_err();

    assert_eq!(error, failure);
    assert_eq!(log.exit_count(), 1);
    assert_eq!(log.work_count(), 0);
}

#[test]
fn exit_failure_replaces_the_failure_in_flight() {
    let work_failure = OperationError::new("work failed");
    let exit_failure = OperationError::new("rollback failed");
    let provider = Recorder::entering(1).failing_exit(exit_failure.clone());
    let log = provider.log();

    let raised = work_failure.clone();
    let error = scoped::run(provider, move |_| Err::<(), _>(raised)).unwrap_err();

    assert_eq!(error, exit_failure);
    assert_ne!(error, work_failure);
    assert_eq!(log.exits(), vec![(Some(1), Some(work_failure))]);
}

#[test]
fn exit_failure_on_the_happy_path_propagates() {
    let exit_failure = OperationError::new("close failed");
    let provider = Recorder::entering(1).failing_exit(exit_failure.clone());

    let error = scoped::run(provider, |_| Ok::<_, OperationError>(())).unwrap_err();

    assert_eq!(error, exit_failure);
}

#[test]
fn suppression_is_repeatable_with_the_returned_provider() {
    let provider = Recorder::entering(42).suppressing();
    let log = provider.log();

    let provider = scoped::run(provider, |_| Err::<(), _>(OperationError::new("first"))).unwrap();
    let provider = scoped::run(provider, |_| Err::<(), _>(OperationError::new("second"))).unwrap();

    assert_eq!(provider.log().exit_count(), 2);
    assert_eq!(log.enter_count(), 2);
}

#[test]
fn work_may_mutate_the_enter_value_before_exit_sees_it() {
    let provider = Recorder::entering(1);
    let log = provider.log();

    scoped::run(provider, |value| {
        *value += 41;
        Ok::<_, OperationError>(())
    })
    .unwrap();

    assert_eq!(log.exits(), vec![(Some(42), None)]);
}

#[test]
fn report_tracks_every_path() {
    let executor = ScopedExecutor::default();

    let (_, clean) = executor.run_with_report(Recorder::entering(1), |_| Ok::<_, OperationError>(()));
    assert_eq!(clean.phase, Phase::Completed);
    assert_eq!(clean.error_source, None);

    let (_, suppressed) = executor.run_with_report(Recorder::entering(1).suppressing(), |_| {
        Err::<(), _>(OperationError::new("x"))
    });
    assert_eq!(suppressed.phase, Phase::Suppressed);
    assert_eq!(suppressed.error_source, Some(ErrorSource::Work));

    let (_, reraised) = executor.run_with_report(
        Recorder::failing_enter(OperationError::new("x")),
        |_| Ok::<_, OperationError>(()),
    );
    assert_eq!(reraised.phase, Phase::Reraised);
    assert_eq!(reraised.error_source, Some(ErrorSource::Enter));
    assert!(reraised.entered && !reraised.worked && reraised.exited);
}

/// A provider written by hand, the way a downstream crate would.
#[derive(Debug)]
struct TempDir {
    created: Vec<String>,
    removed: Vec<String>,
}

impl ResourceProvider for TempDir {
    type Value = String;
    type Error = std::io::Error;

    fn enter(&mut self) -> Result<String, std::io::Error> {
        let path = format!("/tmp/scope-{}", self.created.len());
        self.created.push(path.clone());
        Ok(path)
    }

    fn exit(
        &mut self,
        value: Option<String>,
        _error: Option<&std::io::Error>,
    ) -> Result<bool, std::io::Error> {
        if let Some(path) = value {
            self.removed.push(path);
        }
        Ok(false)
    }
}

#[test]
fn hand_written_provider_through_a_mutable_borrow() {
    let mut dir = TempDir {
        created: Vec::new(),
        removed: Vec::new(),
    };

    let error = scoped::run(&mut dir, |path| {
        Err::<(), _>(std::io::Error::other(format!("cannot write into {path}")))
    })
    .unwrap_err();

    assert_eq!(error.to_string(), "cannot write into /tmp/scope-0");
    assert_eq!(dir.created, dir.removed);
}
