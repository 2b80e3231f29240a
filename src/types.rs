use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a loan payment
pub type PaymentId = Uuid;

/// loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// loan outstanding and accepting payments
    Active,
    /// fully paid off, terminal
    Completed,
}

impl LoanStatus {
    /// check whether any further transition is defined
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Completed)
    }
}

/// interest/principal split of a single payment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PaymentSplit {
    pub interest: Money,
    pub principal: Money,
}

impl PaymentSplit {
    pub fn total(&self) -> Money {
        self.interest + self.principal
    }
}
