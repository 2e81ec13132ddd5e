//! An in-memory ledger with transactional sessions.
//!
//! `enter` opens a transaction over a snapshot of the balances, the work
//! stages deposits, withdrawals and transfers on it, and `exit` commits the
//! snapshot back when nothing failed or throws it away otherwise. A normal
//! session lets the failure reach the caller after rolling back; a tolerant
//! session swallows it.

use std::collections::BTreeMap;

use nutype::nutype;
use scoped::ResourceProvider;
use thiserror::Error;
use tracing::{info, warn};

/// Identifier of a ledger account.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 64),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct AccountId(String);

/// Ledger failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The ledger no longer accepts transactions
    #[error("Ledger is closed")]
    Closed,

    /// No account with this id
    #[error("Unknown account: {0}")]
    UnknownAccount(AccountId),

    /// The account cannot cover the withdrawal
    #[error("Insufficient funds in {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Account being debited
        account: AccountId,
        /// Balance at the time of the request
        balance: u64,
        /// Requested amount
        requested: u64,
    },

    /// The credit would overflow the balance
    #[error("Balance overflow in {0}")]
    Overflow(AccountId),
}

/// Account balances plus an open/closed switch.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    balances: BTreeMap<AccountId, u64>,
    closed: bool,
    commits: u64,
}

impl Ledger {
    /// An empty, open ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an account with an opening balance, replacing any previous one.
    pub fn open_account(&mut self, id: AccountId, balance: u64) {
        self.balances.insert(id, balance);
    }

    /// Committed balance of an account.
    pub fn balance(&self, id: &AccountId) -> Option<u64> {
        self.balances.get(id).copied()
    }

    /// Stop accepting transactions.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Number of committed transactions.
    pub const fn commits(&self) -> u64 {
        self.commits
    }

    /// A session whose failures reach the caller after rollback.
    pub fn session(&mut self) -> LedgerSession<'_> {
        LedgerSession::new(self, false)
    }

    /// A session that rolls back and swallows failures.
    pub fn tolerant_session(&mut self) -> LedgerSession<'_> {
        LedgerSession::new(self, true)
    }
}

/// Staged changes over a snapshot of the ledger.
#[derive(Debug)]
pub struct Transaction {
    balances: BTreeMap<AccountId, u64>,
    operations: usize,
}

impl Transaction {
    /// Balance of an account as seen by this transaction.
    pub fn balance(&self, id: &AccountId) -> Result<u64, LedgerError> {
        self.balances
            .get(id)
            .copied()
            .ok_or_else(|| LedgerError::UnknownAccount(id.clone()))
    }

    /// Credit an account.
    pub fn deposit(&mut self, id: &AccountId, amount: u64) -> Result<(), LedgerError> {
        let balance = self.entry(id)?;
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow(id.clone()))?;
        self.operations += 1;
        Ok(())
    }

    /// Debit an account.
    pub fn withdraw(&mut self, id: &AccountId, amount: u64) -> Result<(), LedgerError> {
        let balance = self.entry(id)?;
        if *balance < amount {
            return Err(LedgerError::InsufficientFunds {
                account: id.clone(),
                balance: *balance,
                requested: amount,
            });
        }
        *balance -= amount;
        self.operations += 1;
        Ok(())
    }

    /// Move funds between accounts. Not atomic on its own; the scope is.
    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        self.withdraw(from, amount)?;
        self.deposit(to, amount)
    }

    /// Number of staged operations.
    pub const fn operations(&self) -> usize {
        self.operations
    }

    fn entry(&mut self, id: &AccountId) -> Result<&mut u64, LedgerError> {
        self.balances
            .get_mut(id)
            .ok_or_else(|| LedgerError::UnknownAccount(id.clone()))
    }
}

/// How the last transaction of a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionOutcome {
    /// Staged changes were written to the ledger
    Committed,
    /// Staged changes were discarded
    RolledBack,
}

/// Resource provider that wraps work in a ledger transaction.
#[derive(Debug)]
pub struct LedgerSession<'a> {
    ledger: &'a mut Ledger,
    tolerant: bool,
    outcome: Option<TransactionOutcome>,
}

impl<'a> LedgerSession<'a> {
    fn new(ledger: &'a mut Ledger, tolerant: bool) -> Self {
        Self {
            ledger,
            tolerant,
            outcome: None,
        }
    }

    /// Outcome of the last transaction, `None` if none was opened.
    pub const fn outcome(&self) -> Option<TransactionOutcome> {
        self.outcome
    }

    /// The ledger behind this session.
    pub fn ledger(&self) -> &Ledger {
        self.ledger
    }
}

impl ResourceProvider for LedgerSession<'_> {
    type Value = Transaction;
    type Error = LedgerError;

    fn enter(&mut self) -> Result<Transaction, LedgerError> {
        if self.ledger.closed {
            return Err(LedgerError::Closed);
        }
        Ok(Transaction {
            balances: self.ledger.balances.clone(),
            operations: 0,
        })
    }

    fn exit(
        &mut self,
        transaction: Option<Transaction>,
        error: Option<&LedgerError>,
    ) -> Result<bool, LedgerError> {
        match (transaction, error) {
            (Some(transaction), None) => {
                info!(operations = transaction.operations, "transaction committed");
                self.ledger.balances = transaction.balances;
                self.ledger.commits += 1;
                self.outcome = Some(TransactionOutcome::Committed);
                Ok(false)
            }
            (Some(transaction), Some(error)) => {
                warn!(
                    operations = transaction.operations,
                    %error,
                    tolerant = self.tolerant,
                    "transaction failed; rolling back"
                );
                self.outcome = Some(TransactionOutcome::RolledBack);
                Ok(self.tolerant)
            }
            (None, Some(error)) => {
                warn!(%error, tolerant = self.tolerant, "no transaction was opened");
                Ok(self.tolerant)
            }
            (None, None) => Ok(false),
        }
    }
}
