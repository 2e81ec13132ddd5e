//! Error types for `scoped`.
//!
//! Failures fall into two camps:
//!
//! - **ContractError**: the caller handed over something that is not a resource
//!   provider, or a provider's `exit` broke its return contract. Always fatal,
//!   never offered to `exit` for suppression.
//! - **Operation errors**: failures from `enter` or from the work. These are
//!   handed to `exit`, which may suppress them. Statically typed providers pick
//!   their own error type; runtime-checked providers use [`OperationError`].
//!
//! [`DynError`] is the error channel of runtime-checked providers and carries
//! either camp.

use crate::types::ErrorId;
use thiserror::Error;

/// The provider does not satisfy the resource capability contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// The provider is not an object at all.
    #[error("{value} is not an object")]
    NotAnObject {
        /// Rendering of the rejected value
        value: String,
    },

    /// The provider has no public `enter` method.
    #[error("class \"{class}\" has no public enter method")]
    MissingEnter {
        /// Class name of the provider
        class: String,
    },

    /// The provider has no public `exit` method.
    #[error("class \"{class}\" has no public exit method")]
    MissingExit {
        /// Class name of the provider
        class: String,
    },

    /// `exit` returned something other than a boolean.
    #[error("class \"{class}\": exit must return boolean, got {returned}")]
    ExitNotBoolean {
        /// Class name of the provider
        class: String,
        /// Rendering of the value `exit` returned
        returned: String,
    },
}

/// Result alias for capability checks.
pub type ContractResult<T> = Result<T, ContractError>;

/// A failure raised by `enter` or by the work of a runtime-checked provider.
///
/// Every error gets a fresh [`ErrorId`] at construction. Equality includes the
/// id, so an error only compares equal to itself and its clones.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct OperationError {
    id: ErrorId,
    message: String,
}

impl OperationError {
    /// Creates a new operation error with a fresh identity.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            id: ErrorId::new(),
            message: message.into(),
        }
    }

    /// Identity of this error.
    pub const fn id(&self) -> ErrorId {
        self.id
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Error channel of runtime-checked providers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DynError {
    /// The provider broke the capability contract.
    #[error("Contract violation: {0}")]
    Contract(#[from] ContractError),

    /// `enter`, the work, or `exit` failed.
    #[error("Operation failed: {0}")]
    Operation(#[from] OperationError),
}

impl DynError {
    /// Returns the contract violation, if this is one.
    pub const fn as_contract(&self) -> Option<&ContractError> {
        match self {
            Self::Contract(error) => Some(error),
            Self::Operation(_) => None,
        }
    }

    /// Returns the operation failure, if this is one.
    pub const fn as_operation(&self) -> Option<&OperationError> {
        match self {
            Self::Operation(error) => Some(error),
            Self::Contract(_) => None,
        }
    }

    /// True for contract violations, which are never suppressible.
    pub const fn is_contract(&self) -> bool {
        matches!(self, Self::Contract(_))
    }
}

/// Errors raised while loading executor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON or fails field validation.
    #[error("Invalid executor configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
