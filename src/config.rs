use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};

/// terms a loan is originated under
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// amount disbursed at origination
    pub principal: Money,
    /// annual percentage rate
    pub annual_rate: Rate,
}

impl LoanTerms {
    pub fn new(principal: Money, annual_rate: Rate) -> Self {
        Self {
            principal,
            annual_rate,
        }
    }

    /// validate terms before a loan exists
    pub fn validate(&self) -> Result<()> {
        if self.principal.is_zero() || self.principal.is_negative() {
            return Err(LedgerError::InvalidLoanTerms {
                message: format!("principal must be positive, got {}", self.principal),
            });
        }

        if self.annual_rate.is_negative() {
            return Err(LedgerError::InvalidInterestRate {
                rate: self.annual_rate,
            });
        }

        Ok(())
    }
}
