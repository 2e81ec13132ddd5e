//! Validated value types shared across the crate.
//!
//! Both types use smart constructors, so a value that exists is a value that
//! passed validation.

use nutype::nutype;
use uuid::Uuid;

/// Label used when a configuration does not name its scope.
pub const DEFAULT_SCOPE_LABEL: &str = "scope";

/// Name of a scope, attached to the tracing span of every invocation.
///
/// Trimmed, non-empty, and at most 64 characters.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 64),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct ScopeLabel(String);

impl Default for ScopeLabel {
    fn default() -> Self {
        Self::try_new(DEFAULT_SCOPE_LABEL.to_string())
            .expect("the default scope label is a valid ScopeLabel")
    }
}

/// Identity of an operation failure, as a UUIDv7.
///
/// Two failures with the same message are still distinct errors; the id lets
/// callers check that the error they got back is the one that was raised.
#[nutype(
    validate(predicate = |id: &Uuid| id.get_version() == Some(uuid::Version::SortRand)),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct ErrorId(Uuid);

impl ErrorId {
    /// Creates a new `ErrorId` with the current timestamp.
    pub fn new() -> Self {
        // Uuid::now_v7() always produces a version 7 UUID
        Self::try_new(Uuid::now_v7()).expect("Uuid::now_v7() should always return a valid v7 UUID")
    }
}

impl Default for ErrorId {
    fn default() -> Self {
        Self::new()
    }
}
