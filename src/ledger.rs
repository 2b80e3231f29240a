use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use log::debug;

use crate::allocation::allocate;
use crate::config::LoanTerms;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::state::{Loan, LoanPayment};
use crate::store::LoanStore;
use crate::types::{LoanId, LoanStatus};

/// payment request
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub amount: Money,
    pub payment_date: DateTime<Utc>,
    pub note: Option<String>,
}

impl PaymentRequest {
    pub fn new(amount: Money, payment_date: DateTime<Utc>) -> Self {
        Self {
            amount,
            payment_date,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// outcome of an accepted payment: the created row and the updated loan
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceipt {
    pub payment: LoanPayment,
    pub loan: Loan,
}

/// loan ledger
///
/// Applies payments against loans held in a `LoanStore`: reads a snapshot,
/// allocates the payment into interest and principal, and commits the
/// balance decrement, lifecycle transition, and payment row as one
/// version-guarded transaction. Nothing is retried internally; a
/// `PersistenceConflict` caller retries from a fresh read.
pub struct LoanLedger<S: LoanStore> {
    store: S,
}

impl<S: LoanStore> LoanLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// the backing store, for reads
    pub fn store(&self) -> &S {
        &self.store
    }

    /// originate a new loan
    pub fn originate(
        &self,
        terms: LoanTerms,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<Loan> {
        terms.validate()?;

        let loan = Loan::new(terms, time_provider.now());
        self.store.insert(loan.clone())?;

        events.emit(Event::LoanOriginated {
            loan_id: loan.id,
            principal: loan.principal,
            annual_rate: loan.annual_rate,
            timestamp: loan.origination_date,
        });

        debug!("originated loan {} for {}", loan.id, loan.principal);
        Ok(loan)
    }

    /// apply a payment with system time as the payment date
    pub fn apply_payment_now(
        &self,
        loan_id: LoanId,
        amount: Money,
        events: &mut EventStore,
    ) -> Result<PaymentReceipt> {
        let time = SafeTimeProvider::new(hourglass_rs::TimeSource::System);
        self.apply_payment(loan_id, PaymentRequest::new(amount, time.now()), events)
    }

    /// apply a single payment to a loan
    ///
    /// Rejects payments against non-active loans, payments outside
    /// `(0, remaining]`, and payments that do not cover the period's
    /// interest. On success the loan's balance has been decremented, the
    /// payment row appended, and the loan moved to `Completed` if the
    /// balance reached zero.
    pub fn apply_payment(
        &self,
        loan_id: LoanId,
        request: PaymentRequest,
        events: &mut EventStore,
    ) -> Result<PaymentReceipt> {
        let snapshot = self.store.get(loan_id)?;

        if snapshot.status != LoanStatus::Active {
            return Err(LedgerError::LoanNotActive {
                status: snapshot.status,
            });
        }

        let split = allocate(snapshot.remaining, snapshot.annual_rate, request.amount)?;

        let payment = LoanPayment::new(
            loan_id,
            request.amount,
            &split,
            request.payment_date,
            request.note,
        );

        let mut updated = snapshot;
        updated.apply_split(&split, request.payment_date);

        self.store.commit(updated.clone(), payment.clone())?;

        events.emit(Event::PaymentReceived {
            loan_id,
            payment_id: payment.id,
            amount: payment.amount,
            interest_portion: payment.interest,
            principal_portion: payment.principal,
            remaining_after: updated.remaining,
            timestamp: request.payment_date,
        });

        if updated.status == LoanStatus::Completed {
            events.emit(Event::LoanCompleted {
                loan_id,
                final_payment: payment.amount,
                timestamp: request.payment_date,
            });
        }

        Ok(PaymentReceipt {
            payment,
            loan: updated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;
    use std::sync::Arc;

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        ))
    }

    fn ledger_with_loan(principal: i64, rate_pct: u32) -> (LoanLedger<MemoryStore>, Loan) {
        let ledger = LoanLedger::new(MemoryStore::new());
        let time = test_time();
        let mut events = EventStore::new();
        let loan = ledger
            .originate(
                LoanTerms::new(Money::from_major(principal), Rate::from_percentage(rate_pct)),
                &time,
                &mut events,
            )
            .unwrap();
        (ledger, loan)
    }

    #[test]
    fn test_originate_validates_and_emits() {
        let ledger = LoanLedger::new(MemoryStore::new());
        let time = test_time();
        let mut events = EventStore::new();

        let loan = ledger
            .originate(
                LoanTerms::new(Money::from_major(120_000), Rate::from_percentage(12)),
                &time,
                &mut events,
            )
            .unwrap();

        assert_eq!(loan.origination_date, time.now());
        assert_eq!(ledger.store().get(loan.id).unwrap(), loan);

        let emitted = events.take_events();
        assert_eq!(emitted.len(), 1);
        assert!(matches!(
            &emitted[0],
            Event::LoanOriginated { loan_id, principal, .. }
                if *loan_id == loan.id && *principal == Money::from_major(120_000)
        ));

        // invalid terms never reach the store
        assert!(ledger
            .originate(
                LoanTerms::new(Money::ZERO, Rate::from_percentage(12)),
                &time,
                &mut events,
            )
            .is_err());
        assert_eq!(ledger.store().len(), 1);
    }

    #[test]
    fn test_payment_splits_interest_and_principal() {
        // 120000 at 12% apr, paying 11000
        let (ledger, loan) = ledger_with_loan(120_000, 12);
        let mut events = EventStore::new();

        let receipt = ledger
            .apply_payment(
                loan.id,
                PaymentRequest::new(Money::from_major(11_000), test_time().now()),
                &mut events,
            )
            .unwrap();

        assert_eq!(receipt.payment.interest, Money::from_major(1_200));
        assert_eq!(receipt.payment.principal, Money::from_major(9_800));
        assert_eq!(receipt.loan.remaining, Money::from_major(110_200));
        assert_eq!(receipt.loan.status, LoanStatus::Active);
        assert_eq!(receipt.loan.version, 1);

        // the receipt matches what the store now holds
        assert_eq!(ledger.store().get(loan.id).unwrap(), receipt.loan);
        assert_eq!(
            ledger.store().payments(loan.id).unwrap(),
            vec![receipt.payment.clone()]
        );

        let emitted = events.take_events();
        assert_eq!(emitted.len(), 1);
        assert!(matches!(
            &emitted[0],
            Event::PaymentReceived { remaining_after, .. }
                if *remaining_after == Money::from_major(110_200)
        ));
    }

    #[test]
    fn test_full_payoff_completes_loan() {
        let (ledger, loan) = ledger_with_loan(5_000, 0);
        let mut events = EventStore::new();

        let receipt = ledger
            .apply_payment(
                loan.id,
                PaymentRequest::new(Money::from_major(5_000), test_time().now()),
                &mut events,
            )
            .unwrap();

        assert_eq!(receipt.payment.interest, Money::ZERO);
        assert_eq!(receipt.payment.principal, Money::from_major(5_000));
        assert_eq!(receipt.loan.remaining, Money::ZERO);
        assert_eq!(receipt.loan.status, LoanStatus::Completed);

        let emitted = events.take_events();
        assert_eq!(emitted.len(), 2);
        assert!(matches!(&emitted[1], Event::LoanCompleted { .. }));
    }

    #[test]
    fn test_completed_loan_rejects_further_payments() {
        let (ledger, loan) = ledger_with_loan(5_000, 0);
        let mut events = EventStore::new();
        let date = test_time().now();

        ledger
            .apply_payment(
                loan.id,
                PaymentRequest::new(Money::from_major(5_000), date),
                &mut events,
            )
            .unwrap();

        let result = ledger.apply_payment(
            loan.id,
            PaymentRequest::new(Money::from_major(100), date),
            &mut events,
        );

        assert!(matches!(
            result,
            Err(LedgerError::LoanNotActive {
                status: LoanStatus::Completed
            })
        ));

        // no row recorded, balance untouched
        assert_eq!(ledger.store().payments(loan.id).unwrap().len(), 1);
        assert_eq!(ledger.store().get(loan.id).unwrap().remaining, Money::ZERO);
    }

    #[test]
    fn test_overpayment_leaves_loan_unmodified() {
        let (ledger, loan) = ledger_with_loan(1_000, 12);
        let mut events = EventStore::new();

        let result = ledger.apply_payment(
            loan.id,
            PaymentRequest::new(Money::from_major(1_500), test_time().now()),
            &mut events,
        );

        assert!(matches!(
            result,
            Err(LedgerError::InvalidPaymentAmount { .. })
        ));
        assert_eq!(ledger.store().get(loan.id).unwrap(), loan);
        assert!(ledger.store().payments(loan.id).unwrap().is_empty());
        assert!(events.events().is_empty());
    }

    #[test]
    fn test_payment_below_interest_leaves_loan_unmodified() {
        // 600% apr on 100: interest due 50 exceeds a 40 payment
        let (ledger, loan) = ledger_with_loan(100, 600);
        let mut events = EventStore::new();

        let result = ledger.apply_payment(
            loan.id,
            PaymentRequest::new(Money::from_major(40), test_time().now()),
            &mut events,
        );

        assert!(matches!(
            result,
            Err(LedgerError::PaymentBelowInterest { interest_due, .. })
                if interest_due == Money::from_major(50)
        ));
        assert_eq!(ledger.store().get(loan.id).unwrap(), loan);
    }

    #[test]
    fn test_unknown_loan() {
        let ledger = LoanLedger::new(MemoryStore::new());
        let mut events = EventStore::new();

        let result = ledger.apply_payment(
            uuid::Uuid::new_v4(),
            PaymentRequest::new(Money::from_major(100), test_time().now()),
            &mut events,
        );

        assert!(matches!(result, Err(LedgerError::LoanNotFound { .. })));
    }

    #[test]
    fn test_balance_reconciles_with_payment_history() {
        let (ledger, loan) = ledger_with_loan(120_000, 12);
        let mut events = EventStore::new();
        let date = test_time().now();

        for amount in [11_000, 9_000, 20_000] {
            ledger
                .apply_payment(
                    loan.id,
                    PaymentRequest::new(Money::from_major(amount), date),
                    &mut events,
                )
                .unwrap();
        }

        let current = ledger.store().get(loan.id).unwrap();
        let payments = ledger.store().payments(loan.id).unwrap();
        assert_eq!(payments.len(), 3);

        let principal_sum = payments
            .iter()
            .fold(Money::ZERO, |acc, p| acc + p.principal);
        assert_eq!(current.remaining, loan.principal - principal_sum);
        assert!(current.remaining >= Money::ZERO);

        // balance never increased across the sequence
        assert!(current.remaining < loan.principal);

        // each split fully accounts for its payment
        for p in &payments {
            assert_eq!(p.interest + p.principal, p.amount);
        }
    }

    #[test]
    fn test_note_carried_onto_payment_row() {
        let (ledger, loan) = ledger_with_loan(10_000, 12);
        let mut events = EventStore::new();

        let receipt = ledger
            .apply_payment(
                loan.id,
                PaymentRequest::new(Money::from_major(500), test_time().now())
                    .with_note("march installment"),
                &mut events,
            )
            .unwrap();

        assert_eq!(receipt.payment.note.as_deref(), Some("march installment"));
    }

    #[test]
    fn test_concurrent_payments_never_overdraw() {
        let (ledger, loan) = ledger_with_loan(10_000, 0);
        let ledger = Arc::new(ledger);
        let date = test_time().now();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                let loan_id = loan.id;
                std::thread::spawn(move || {
                    let mut events = EventStore::new();
                    ledger.apply_payment(
                        loan_id,
                        PaymentRequest::new(Money::from_major(2_000), date),
                        &mut events,
                    )
                })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            match handle.join().unwrap() {
                Ok(_) => accepted += 1,
                // losers of the version race surface the conflict to retry
                Err(LedgerError::PersistenceConflict { .. }) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        let current = ledger.store().get(loan.id).unwrap();
        let payments = ledger.store().payments(loan.id).unwrap();
        assert_eq!(payments.len(), accepted);

        let principal_sum = payments
            .iter()
            .fold(Money::ZERO, |acc, p| acc + p.principal);
        assert_eq!(current.remaining, loan.principal - principal_sum);
        assert!(current.remaining >= Money::ZERO);
        assert_eq!(current.version, accepted as u64);
    }
}
