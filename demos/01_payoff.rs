/// payoff lifecycle - drive a loan from active to completed
use loan_ledger_rs::chrono::Duration;
use loan_ledger_rs::{
    Event, EventStore, LoanLedger, LoanStatus, LoanStore, LoanTerms, MemoryStore, Money,
    PaymentRequest, Rate, SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let ledger = LoanLedger::new(MemoryStore::new());
    let time = SafeTimeProvider::new(TimeSource::System);
    let mut events = EventStore::new();

    // interest-free employee advance, repaid in monthly installments
    let loan = ledger.originate(
        LoanTerms::new(Money::from_major(5_000), Rate::ZERO),
        &time,
        &mut events,
    )?;

    let mut payment_date = time.now();
    for installment in [2_000, 2_000, 1_000] {
        let receipt = ledger.apply_payment(
            loan.id,
            PaymentRequest::new(Money::from_major(installment), payment_date),
            &mut events,
        )?;
        println!(
            "paid {}, remaining {} ({:?})",
            installment, receipt.loan.remaining, receipt.loan.status
        );
        payment_date += Duration::days(30);
    }

    let current = ledger.store().get(loan.id)?;
    assert_eq!(current.status, LoanStatus::Completed);

    for event in events.take_events() {
        if let Event::LoanCompleted { final_payment, .. } = event {
            println!("loan completed with final payment of {}", final_payment);
        }
    }

    Ok(())
}
