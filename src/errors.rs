use thiserror::Error;

use crate::decimal::{Money, Rate};
use crate::types::{LoanId, LoanStatus};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("payment does not cover interest due: interest {interest_due}, provided {provided}")]
    PaymentBelowInterest {
        interest_due: Money,
        provided: Money,
    },

    #[error("loan not active: current status is {status:?}")]
    LoanNotActive {
        status: LoanStatus,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },

    #[error("persistence conflict on loan {id}: stored version {stored}, snapshot version {snapshot}")]
    PersistenceConflict {
        id: LoanId,
        stored: u64,
        snapshot: u64,
    },

    #[error("invalid loan terms: {message}")]
    InvalidLoanTerms {
        message: String,
    },

    #[error("invalid interest rate: {rate}")]
    InvalidInterestRate {
        rate: Rate,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
