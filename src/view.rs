/// serialization support for loan snapshots
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::state::Loan;
use crate::types::{LoanId, LoanStatus};

/// serializable view of a loan's state
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanView {
    pub id: LoanId,
    pub status: LoanStatus,
    pub origination_date: DateTime<Utc>,
    pub financial: FinancialView,
    pub payments: PaymentHistoryView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FinancialView {
    pub principal: Money,
    pub remaining: Money,
    pub annual_rate: Rate,
    pub total_principal_paid: Money,
    pub total_interest_paid: Money,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentHistoryView {
    pub payment_count: u32,
    pub last_payment_date: Option<DateTime<Utc>>,
}

impl LoanView {
    pub fn from_loan(loan: &Loan) -> Self {
        LoanView {
            id: loan.id,
            status: loan.status,
            origination_date: loan.origination_date,
            financial: FinancialView {
                principal: loan.principal,
                remaining: loan.remaining,
                annual_rate: loan.annual_rate,
                total_principal_paid: loan.total_principal_paid(),
                total_interest_paid: loan.total_interest_paid,
            },
            payments: PaymentHistoryView {
                payment_count: loan.payment_count,
                last_payment_date: loan.last_payment_date,
            },
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
