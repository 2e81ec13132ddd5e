//! `scoped` - Scoped resource execution
//!
//! A resource provider exposes two hooks: `enter` sets the resource up and
//! hands back a value, `exit` tears it down. The executor runs a unit of work
//! between the two and guarantees that `exit` observes the outcome:
//!
//! - `exit` runs exactly once for every invocation, whether `enter` failed,
//!   the work failed, or everything succeeded.
//! - A failure from `enter` or from the work is handed to `exit`, which
//!   decides whether it is suppressed (`true`) or propagated (`false`).
//! - A failure raised by `exit` itself is never intercepted.
//!
//! # Example
//!
//! ```rust
//! use scoped::ResourceProvider;
//!
//! struct Counter {
//!     opened: u32,
//!     closed: u32,
//! }
//!
//! impl ResourceProvider for Counter {
//!     type Value = u32;
//!     type Error = String;
//!
//!     fn enter(&mut self) -> Result<u32, String> {
//!         self.opened += 1;
//!         Ok(42)
//!     }
//!
//!     fn exit(&mut self, _value: Option<u32>, error: Option<&String>) -> Result<bool, String> {
//!         self.closed += 1;
//!         // Swallow failures, the scope already cleaned up.
//!         Ok(error.is_some())
//!     }
//! }
//!
//! let counter = scoped::run(Counter { opened: 0, closed: 0 }, |value| {
//!     assert_eq!(*value, 42);
//!     Err::<(), _>("boom".to_string())
//! })
//! .unwrap();
//!
//! assert_eq!((counter.opened, counter.closed), (1, 1));
//! ```
//!
//! Providers only known at runtime go through [`dynamic`], which checks the
//! capability set before anything runs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dynamic;
pub mod errors;
pub mod executor;
pub mod logging;
pub mod provider;
pub mod testing;
pub mod types;

pub use errors::{ConfigError, ContractError, ContractResult, DynError, OperationError};
pub use executor::{run, ErrorSource, Phase, ScopeReport, ScopedExecutor, ScopedExecutorConfig};
pub use logging::LogLevel;
pub use provider::ResourceProvider;
pub use types::{ErrorId, ScopeLabel};
