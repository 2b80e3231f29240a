/// conflict retry - a stale commit loses the version race and retries
use loan_ledger_rs::{
    EventStore, LedgerError, LoanLedger, LoanPayment, LoanStore, LoanTerms, MemoryStore, Money,
    PaymentSplit, Rate, SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let store = MemoryStore::new();
    let ledger = LoanLedger::new(store.clone());
    let time = SafeTimeProvider::new(TimeSource::System);
    let mut events = EventStore::new();

    let loan = ledger.originate(
        LoanTerms::new(Money::from_major(10_000), Rate::ZERO),
        &time,
        &mut events,
    )?;

    // two writers read the same snapshot
    let snapshot_a = store.get(loan.id)?;
    let snapshot_b = store.get(loan.id)?;

    let commit_from = |snapshot: &loan_ledger_rs::Loan, amount: i64| {
        let split = PaymentSplit {
            interest: Money::ZERO,
            principal: Money::from_major(amount),
        };
        let payment =
            LoanPayment::new(snapshot.id, Money::from_major(amount), &split, time.now(), None);
        let mut updated = snapshot.clone();
        updated.apply_split(&split, time.now());
        (updated, payment)
    };

    // writer A commits first
    let (updated_a, payment_a) = commit_from(&snapshot_a, 1_000);
    store.commit(updated_a, payment_a)?;
    println!("writer A committed");

    // writer B's snapshot is now stale
    let (updated_b, payment_b) = commit_from(&snapshot_b, 2_000);
    match store.commit(updated_b, payment_b) {
        Err(LedgerError::PersistenceConflict { stored, snapshot, .. }) => {
            println!("writer B conflicted: stored version {stored}, snapshot version {snapshot}");
        }
        other => panic!("expected conflict, got {other:?}"),
    }

    // writer B retries from a fresh read and succeeds
    let fresh = store.get(loan.id)?;
    let (updated_b, payment_b) = commit_from(&fresh, 2_000);
    store.commit(updated_b, payment_b)?;
    println!("writer B retried and committed");

    let current = store.get(loan.id)?;
    println!(
        "remaining {} after {} payments",
        current.remaining, current.payment_count
    );

    Ok(())
}
