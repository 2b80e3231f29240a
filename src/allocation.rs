use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::types::PaymentSplit;

/// split a payment against an outstanding balance into interest and principal
///
/// Interest is charged at a flat monthly rate (annual rate / 12, no
/// compounding, no day count) on the balance before the payment. The payment
/// covers interest first; the remainder reduces principal, capped at the
/// outstanding balance.
///
/// A payment may never overpay the loan, and a payment that does not cover
/// the period's interest is rejected rather than recorded with a negative
/// principal portion.
pub fn allocate(remaining: Money, annual_rate: Rate, amount: Money) -> Result<PaymentSplit> {
    if amount.is_zero() || amount.is_negative() {
        return Err(LedgerError::InvalidPaymentAmount { amount });
    }

    if amount > remaining {
        return Err(LedgerError::InvalidPaymentAmount { amount });
    }

    let monthly_rate = annual_rate.monthly_rate();
    let interest = remaining * monthly_rate.as_decimal();

    if interest > amount {
        return Err(LedgerError::PaymentBelowInterest {
            interest_due: interest,
            provided: amount,
        });
    }

    let principal = (amount - interest).min(remaining);

    Ok(PaymentSplit {
        interest,
        principal,
    })
}
