use std::sync::Arc;

use dashmap::DashMap;
use log::{debug, warn};

use crate::errors::{LedgerError, Result};
use crate::state::{Loan, LoanPayment};
use crate::types::LoanId;

/// persistence seam for loans and their payment rows
pub trait LoanStore: Send + Sync {
    /// insert a newly originated loan
    fn insert(&self, loan: Loan) -> Result<()>;

    /// read the current loan snapshot
    fn get(&self, id: LoanId) -> Result<Loan>;

    /// payment rows for a loan, in acceptance order
    fn payments(&self, id: LoanId) -> Result<Vec<LoanPayment>>;

    /// apply a loan update plus a payment append as one transaction
    ///
    /// The updated loan must carry a version exactly one ahead of the stored
    /// record. Anything else means another writer committed after the
    /// caller's snapshot was read; the call fails with `PersistenceConflict`
    /// and changes nothing.
    fn commit(&self, loan: Loan, payment: LoanPayment) -> Result<()>;
}

/// in-memory store
///
/// Each map entry holds the loan together with its payment rows, so the
/// entry's exclusive guard covers both writes of a commit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    accounts: Arc<DashMap<LoanId, LoanAccount>>,
}

#[derive(Debug)]
struct LoanAccount {
    loan: Loan,
    payments: Vec<LoanPayment>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl LoanStore for MemoryStore {
    fn insert(&self, loan: Loan) -> Result<()> {
        debug!("inserting loan {} with principal {}", loan.id, loan.principal);
        self.accounts.insert(
            loan.id,
            LoanAccount {
                loan,
                payments: Vec::new(),
            },
        );
        Ok(())
    }

    fn get(&self, id: LoanId) -> Result<Loan> {
        self.accounts
            .get(&id)
            .map(|account| account.loan.clone())
            .ok_or(LedgerError::LoanNotFound { id })
    }

    fn payments(&self, id: LoanId) -> Result<Vec<LoanPayment>> {
        self.accounts
            .get(&id)
            .map(|account| account.payments.clone())
            .ok_or(LedgerError::LoanNotFound { id })
    }

    fn commit(&self, loan: Loan, payment: LoanPayment) -> Result<()> {
        let id = loan.id;
        let mut account = self
            .accounts
            .get_mut(&id)
            .ok_or(LedgerError::LoanNotFound { id })?;

        let snapshot = loan.version.saturating_sub(1);
        if loan.version.checked_sub(1) != Some(account.loan.version) {
            warn!(
                "stale commit on loan {}: stored version {}, snapshot version {}",
                id, account.loan.version, snapshot
            );
            return Err(LedgerError::PersistenceConflict {
                id,
                stored: account.loan.version,
                snapshot,
            });
        }

        debug!(
            "committing payment {} on loan {}: principal {}, remaining {}",
            payment.id, id, payment.principal, loan.remaining
        );
        account.payments.push(payment);
        account.loan = loan;
        Ok(())
    }
}
