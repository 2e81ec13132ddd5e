//! Ledger demo: one committed transfer, one rolled back.
//!
//! Run with `RUST_LOG=debug cargo run --example ledger` to also see the
//! executor's phase logging.

use scoped::{ScopeLabel, ScopedExecutor, ScopedExecutorConfig};
use scoped_examples::ledger::{AccountId, Ledger, LedgerError};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let alice = AccountId::try_new("alice".to_string())?;
    let bob = AccountId::try_new("bob".to_string())?;
    let carol = AccountId::try_new("carol".to_string())?;

    let mut ledger = Ledger::new();
    ledger.open_account(alice.clone(), 100);
    ledger.open_account(bob.clone(), 20);

    let executor = ScopedExecutor::new(
        ScopedExecutorConfig::default().with_label(ScopeLabel::try_new("ledger-demo".to_string())?),
    );

    executor.run(ledger.session(), |tx| tx.transfer(&alice, &bob, 30))?;
    println!("after transfer: alice={:?} bob={:?}", ledger.balance(&alice), ledger.balance(&bob));

    match executor.run(ledger.session(), |tx| tx.transfer(&alice, &carol, 30)) {
        Err(LedgerError::UnknownAccount(id)) => println!("rolled back, no account {id}"),
        Err(other) => return Err(other.into()),
        Ok(_) => println!("unexpectedly committed"),
    }
    println!("after rollback: alice={:?} bob={:?}", ledger.balance(&alice), ledger.balance(&bob));

    Ok(())
}
