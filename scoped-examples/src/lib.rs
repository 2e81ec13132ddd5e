//! Example resource providers built on `scoped`
//!
//! Providers here live outside the core and show what one looks like in
//! practice.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Ledger example: a transactional store whose scope commits or rolls back
pub mod ledger;
