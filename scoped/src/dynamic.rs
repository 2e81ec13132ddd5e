//! Runtime-checked resource providers.
//!
//! Some providers are only known at runtime: assembled from plugin hooks,
//! scripted from configuration, or bridged from another system. A
//! [`DynValue`] is whatever the caller handed over. Converting it into a
//! [`DynProvider`] checks the capability set once, before anything runs:
//!
//! 1. the value must be an object,
//! 2. it must have a public `enter` hook,
//! 3. it must have a public `exit` hook.
//!
//! The first unmet requirement is reported as a [`ContractError`] and neither
//! hook nor the work is invoked. Hooks exchange [`serde_json::Value`]s, so
//! `exit` can return a non-boolean; that is reported as
//! [`ContractError::ExitNotBoolean`] through exit's own failure channel and is
//! never suppressible.

use std::fmt;

use serde_json::Value;
use tracing::error;

use crate::errors::{ContractError, ContractResult, DynError, OperationError};
use crate::executor::{Phase, ScopedExecutor};
use crate::provider::ResourceProvider;

/// Boxed `enter` hook.
pub type EnterHook = Box<dyn FnMut() -> Result<Value, OperationError>>;

/// Boxed `exit` hook. Receives the enter value (`Value::Null` if `enter`
/// failed) and the failure in flight.
pub type ExitHook = Box<dyn FnMut(Value, Option<&DynError>) -> Result<Value, DynError>>;

/// Whether a hook can be called from outside the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Callable by the executor
    #[default]
    Public,
    /// Present but not callable; counts as missing
    Private,
}

struct Hook<F> {
    visibility: Visibility,
    call: F,
}

impl<F> Hook<F> {
    fn callable(self) -> Option<F> {
        match self.visibility {
            Visibility::Public => Some(self.call),
            Visibility::Private => None,
        }
    }
}

/// An object assembled at runtime, with optional `enter` and `exit` hooks.
///
/// ```rust
/// use scoped::dynamic::{self, DynObject};
/// use serde_json::{json, Value};
///
/// let object = DynObject::new("Install")
///     .with_enter(|| Ok(json!(42)))
///     .with_exit(|_value, error| Ok(Value::Bool(error.is_some())));
///
/// let provider = dynamic::run(object, |value| {
///     assert_eq!(*value, json!(42));
///     Ok(())
/// })
/// .unwrap();
///
/// assert_eq!(provider.class(), "Install");
/// ```
pub struct DynObject {
    class: String,
    enter: Option<Hook<EnterHook>>,
    exit: Option<Hook<ExitHook>>,
}

impl DynObject {
    /// An object of the given class with no hooks.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            enter: None,
            exit: None,
        }
    }

    /// Class name of the object.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Attach a public `enter` hook.
    #[must_use]
    pub fn with_enter<F>(self, hook: F) -> Self
    where
        F: FnMut() -> Result<Value, OperationError> + 'static,
    {
        self.with_enter_hook(Visibility::Public, hook)
    }

    /// Attach a private `enter` hook, which the capability check rejects.
    #[must_use]
    pub fn with_private_enter<F>(self, hook: F) -> Self
    where
        F: FnMut() -> Result<Value, OperationError> + 'static,
    {
        self.with_enter_hook(Visibility::Private, hook)
    }

    /// Attach an `enter` hook with explicit visibility.
    #[must_use]
    pub fn with_enter_hook<F>(mut self, visibility: Visibility, hook: F) -> Self
    where
        F: FnMut() -> Result<Value, OperationError> + 'static,
    {
        self.enter = Some(Hook {
            visibility,
            call: Box::new(hook),
        });
        self
    }

    /// Attach a public `exit` hook.
    #[must_use]
    pub fn with_exit<F>(self, hook: F) -> Self
    where
        F: FnMut(Value, Option<&DynError>) -> Result<Value, DynError> + 'static,
    {
        self.with_exit_hook(Visibility::Public, hook)
    }

    /// Attach a private `exit` hook, which the capability check rejects.
    #[must_use]
    pub fn with_private_exit<F>(self, hook: F) -> Self
    where
        F: FnMut(Value, Option<&DynError>) -> Result<Value, DynError> + 'static,
    {
        self.with_exit_hook(Visibility::Private, hook)
    }

    /// Attach an `exit` hook with explicit visibility.
    #[must_use]
    pub fn with_exit_hook<F>(mut self, visibility: Visibility, hook: F) -> Self
    where
        F: FnMut(Value, Option<&DynError>) -> Result<Value, DynError> + 'static,
    {
        self.exit = Some(Hook {
            visibility,
            call: Box::new(hook),
        });
        self
    }
}

impl fmt::Debug for DynObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynObject")
            .field("class", &self.class)
            .field("enter", &self.enter.as_ref().map(|hook| hook.visibility))
            .field("exit", &self.exit.as_ref().map(|hook| hook.visibility))
            .finish()
    }
}

/// Anything a caller may hand to the executor at runtime.
#[derive(Debug)]
pub enum DynValue {
    /// An object that may satisfy the capability set
    Object(DynObject),
    /// A plain value, never a provider
    Scalar(Value),
}

impl From<DynObject> for DynValue {
    fn from(object: DynObject) -> Self {
        Self::Object(object)
    }
}

impl From<Value> for DynValue {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

/// A runtime object that passed the capability check.
pub struct DynProvider {
    class: String,
    enter: EnterHook,
    exit: ExitHook,
}

impl DynProvider {
    /// Class name of the provider.
    pub fn class(&self) -> &str {
        &self.class
    }
}

impl fmt::Debug for DynProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynProvider")
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}

impl TryFrom<DynValue> for DynProvider {
    type Error = ContractError;

    fn try_from(value: DynValue) -> ContractResult<Self> {
        let object = match value {
            DynValue::Object(object) => object,
            DynValue::Scalar(scalar) => {
                return Err(ContractError::NotAnObject {
                    value: scalar.to_string(),
                })
            }
        };

        let DynObject { class, enter, exit } = object;
        let Some(enter) = enter.and_then(Hook::callable) else {
            return Err(ContractError::MissingEnter { class });
        };
        let Some(exit) = exit.and_then(Hook::callable) else {
            return Err(ContractError::MissingExit { class });
        };

        Ok(Self { class, enter, exit })
    }
}

impl TryFrom<DynObject> for DynProvider {
    type Error = ContractError;

    fn try_from(object: DynObject) -> ContractResult<Self> {
        Self::try_from(DynValue::Object(object))
    }
}

impl ResourceProvider for DynProvider {
    type Value = Value;
    type Error = DynError;

    fn enter(&mut self) -> Result<Value, DynError> {
        (self.enter)().map_err(DynError::Operation)
    }

    fn exit(&mut self, value: Option<Value>, error: Option<&DynError>) -> Result<bool, DynError> {
        let returned = (self.exit)(value.unwrap_or(Value::Null), error)?;
        let Value::Bool(suppress) = returned else {
            error!(
                class = %self.class,
                phase = %Phase::Exiting,
                returned = %returned,
                "exit hook returned a non-boolean"
            );
            return Err(ContractError::ExitNotBoolean {
                class: self.class.clone(),
                returned: returned.to_string(),
            }
            .into());
        };

        // Contract violations in flight are not the hook's to swallow.
        Ok(suppress && !error.is_some_and(DynError::is_contract))
    }
}

impl ScopedExecutor {
    /// Check `value` against the capability set, then run `work` in its scope.
    ///
    /// A failed check returns the [`ContractError`] without invoking any hook
    /// or the work.
    pub fn run_dynamic<F, T>(
        &self,
        value: impl Into<DynValue>,
        work: F,
    ) -> Result<DynProvider, DynError>
    where
        F: FnOnce(&mut Value) -> Result<T, OperationError>,
    {
        let value: DynValue = value.into();
        let provider = DynProvider::try_from(value).inspect_err(|violation| {
            error!(
                label = %self.config().label,
                phase = %Phase::Validating,
                error = %violation,
                "provider failed capability check"
            );
        })?;

        self.run(provider, |value| work(value).map_err(DynError::Operation))
    }
}

/// Check `value` and run `work` in its scope with the default executor.
///
/// See [`ScopedExecutor::run_dynamic`].
pub fn run<F, T>(value: impl Into<DynValue>, work: F) -> Result<DynProvider, DynError>
where
    F: FnOnce(&mut Value) -> Result<T, OperationError>,
{
    ScopedExecutor::default().run_dynamic(value, work)
}
