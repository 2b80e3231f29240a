use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::LoanTerms;
use crate::decimal::{Money, Rate};
use crate::types::{LoanId, LoanStatus, PaymentId, PaymentSplit};

/// loan record
///
/// `remaining` always equals `principal` minus the sum of the principal
/// components of all committed payments. Mutated only through payment
/// application; `version` bumps once per committed mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub principal: Money,
    pub annual_rate: Rate,
    pub remaining: Money,
    pub status: LoanStatus,
    pub version: u64,

    // payment tracking
    pub total_interest_paid: Money,
    pub payment_count: u32,
    pub last_payment_date: Option<DateTime<Utc>>,

    // dates
    pub origination_date: DateTime<Utc>,
    pub last_status_change: DateTime<Utc>,
}

impl Loan {
    /// create a new active loan from validated terms
    pub fn new(terms: LoanTerms, origination_date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            principal: terms.principal,
            annual_rate: terms.annual_rate,
            remaining: terms.principal,
            status: LoanStatus::Active,
            version: 0,
            total_interest_paid: Money::ZERO,
            payment_count: 0,
            last_payment_date: None,
            origination_date,
            last_status_change: origination_date,
        }
    }

    /// check if the loan accepts payments
    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    /// total principal repaid so far
    pub fn total_principal_paid(&self) -> Money {
        self.principal - self.remaining
    }

    /// update status
    pub fn update_status(&mut self, new_status: LoanStatus, timestamp: DateTime<Utc>) {
        self.status = new_status;
        self.last_status_change = timestamp;
    }

    /// apply an allocated split to the balance and lifecycle state
    ///
    /// The split's principal is already capped at `remaining`, so the balance
    /// never goes below zero. A zero balance is the terminal transition.
    pub fn apply_split(&mut self, split: &PaymentSplit, payment_date: DateTime<Utc>) {
        self.remaining -= split.principal;
        self.total_interest_paid += split.interest;
        self.payment_count += 1;
        self.last_payment_date = Some(payment_date);
        self.version += 1;

        if self.remaining <= Money::ZERO {
            self.update_status(LoanStatus::Completed, payment_date);
        }
    }
}

/// accepted payment row, append-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPayment {
    pub id: PaymentId,
    pub loan_id: LoanId,
    /// cash amount paid this installment
    pub amount: Money,
    /// portion attributed to interest for the period
    pub interest: Money,
    /// portion reducing the outstanding balance
    pub principal: Money,
    pub payment_date: DateTime<Utc>,
    pub note: Option<String>,
}

impl LoanPayment {
    pub fn new(
        loan_id: LoanId,
        amount: Money,
        split: &PaymentSplit,
        payment_date: DateTime<Utc>,
        note: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id,
            amount,
            interest: split.interest,
            principal: split.principal,
            payment_date,
            note,
        }
    }
}
