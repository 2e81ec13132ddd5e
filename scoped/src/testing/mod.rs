//! Testing utilities for code built on `scoped`.
//!
//! - [`fixtures`]: a scripted, recording resource provider
//!
//! # Example
//!
//! ```rust
//! use scoped::testing::prelude::*;
//!
//! let provider = RecordingProvider::<u32, String>::entering(42).propagating();
//! let log = provider.log();
//!
//! let result = scoped::run(provider, |value| {
//!     log.record_work(*value);
//!     Err::<(), _>("boom".to_string())
//! });
//!
//! assert_eq!(result.unwrap_err(), "boom");
//! assert_eq!(
//!     log.calls(),
//!     vec![
//!         Call::Enter,
//!         Call::Work { value: 42 },
//!         Call::Exit { value: Some(42), error: Some("boom".to_string()) },
//!     ]
//! );
//! ```

pub mod fixtures;

/// Everything a test usually needs.
pub mod prelude {
    pub use super::fixtures::{Call, CallLog, ExitScript, RecordingProvider};
}
