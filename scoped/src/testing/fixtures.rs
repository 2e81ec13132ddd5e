//! A scripted resource provider that records every hook invocation.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::provider::ResourceProvider;

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call<V, E> {
    /// `enter` was called
    Enter,
    /// The work was called with this value (recorded by the work itself)
    Work {
        /// Value the work received
        value: V,
    },
    /// `exit` was called
    Exit {
        /// Enter value handed to `exit`
        value: Option<V>,
        /// Failure handed to `exit`
        error: Option<E>,
    },
}

/// Shared, cloneable log of calls.
///
/// The provider and the test both hold a handle; clones observe the same log.
#[derive(Debug)]
pub struct CallLog<V, E> {
    calls: Arc<Mutex<Vec<Call<V, E>>>>,
}

impl<V, E> Clone for CallLog<V, E> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<V, E> Default for CallLog<V, E> {
    fn default() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<V: Clone, E: Clone> CallLog<V, E> {
    /// Snapshot of all calls so far, in order.
    pub fn calls(&self) -> Vec<Call<V, E>> {
        self.calls.lock().clone()
    }

    /// Arguments of every `exit` call, in order.
    pub fn exits(&self) -> Vec<(Option<V>, Option<E>)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Exit { value, error } => Some((value.clone(), error.clone())),
                Call::Enter | Call::Work { .. } => None,
            })
            .collect()
    }
}

impl<V, E> CallLog<V, E> {
    /// Record that the work ran with `value`.
    pub fn record_work(&self, value: V) {
        self.calls.lock().push(Call::Work { value });
    }

    /// Number of `enter` calls.
    pub fn enter_count(&self) -> usize {
        self.count(|call| matches!(call, Call::Enter))
    }

    /// Number of work calls.
    pub fn work_count(&self) -> usize {
        self.count(|call| matches!(call, Call::Work { .. }))
    }

    /// Number of `exit` calls.
    pub fn exit_count(&self) -> usize {
        self.count(|call| matches!(call, Call::Exit { .. }))
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    fn count(&self, predicate: impl Fn(&Call<V, E>) -> bool) -> usize {
        self.calls.lock().iter().filter(|&call| predicate(call)).count()
    }

    fn push(&self, call: Call<V, E>) {
        self.calls.lock().push(call);
    }
}

/// What the provider's `exit` does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitScript<E> {
    /// Return this decision
    Return(bool),
    /// Fail with this error
    Fail(E),
}

/// A provider whose hooks follow a script and record their arguments.
///
/// `enter` yields a clone of the scripted value (or fails with a clone of the
/// scripted error) on every invocation, so the returned provider can be run
/// again with identical behavior.
#[derive(Debug, Clone)]
pub struct RecordingProvider<V, E> {
    enter: Result<V, E>,
    exit: ExitScript<E>,
    log: CallLog<V, E>,
}

impl<V, E> RecordingProvider<V, E> {
    /// `enter` succeeds with `value`; `exit` propagates failures.
    pub fn entering(value: V) -> Self {
        Self::scripted(Ok(value))
    }

    /// `enter` fails with `error`; `exit` propagates failures.
    pub fn failing_enter(error: E) -> Self {
        Self::scripted(Err(error))
    }

    fn scripted(enter: Result<V, E>) -> Self {
        Self {
            enter,
            exit: ExitScript::Return(false),
            log: CallLog::default(),
        }
    }

    /// `exit` returns `true`.
    #[must_use]
    pub fn suppressing(self) -> Self {
        self.exit_with(ExitScript::Return(true))
    }

    /// `exit` returns `false`.
    #[must_use]
    pub fn propagating(self) -> Self {
        self.exit_with(ExitScript::Return(false))
    }

    /// `exit` fails with `error`.
    #[must_use]
    pub fn failing_exit(self, error: E) -> Self {
        self.exit_with(ExitScript::Fail(error))
    }

    /// `exit` follows `script`.
    #[must_use]
    pub fn exit_with(mut self, script: ExitScript<E>) -> Self {
        self.exit = script;
        self
    }

    /// Handle to the call log.
    pub fn log(&self) -> CallLog<V, E> {
        self.log.clone()
    }
}

impl<V: Clone, E: Clone> ResourceProvider for RecordingProvider<V, E> {
    type Value = V;
    type Error = E;

    fn enter(&mut self) -> Result<V, E> {
        self.log.push(Call::Enter);
        self.enter.clone()
    }

    fn exit(&mut self, value: Option<V>, error: Option<&E>) -> Result<bool, E> {
        self.log.push(Call::Exit {
            value,
            error: error.cloned(),
        });
        match &self.exit {
            ExitScript::Return(decision) => Ok(*decision),
            ExitScript::Fail(error) => Err(error.clone()),
        }
    }
}
