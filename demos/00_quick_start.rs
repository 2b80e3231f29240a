/// quick start - originate a loan and apply one payment
use loan_ledger_rs::{
    EventStore, LoanLedger, LoanTerms, LoanView, MemoryStore, Money, PaymentRequest, Rate,
    SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let ledger = LoanLedger::new(MemoryStore::new());
    let time = SafeTimeProvider::new(TimeSource::System);
    let mut events = EventStore::new();

    // originate a $120,000 loan at 12% apr
    let loan = ledger.originate(
        LoanTerms::new(Money::from_major(120_000), Rate::from_percentage(12)),
        &time,
        &mut events,
    )?;

    // pay $11,000: interest first, remainder to principal
    let receipt = ledger.apply_payment(
        loan.id,
        PaymentRequest::new(Money::from_major(11_000), time.now()),
        &mut events,
    )?;

    println!(
        "interest {}, principal {}, remaining {}",
        receipt.payment.interest, receipt.payment.principal, receipt.loan.remaining
    );

    // print current state
    println!("{}", LoanView::from_loan(&receipt.loan).to_json_pretty()?);

    Ok(())
}
