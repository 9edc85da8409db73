//! Amount bounds and overflow-checked totals.

use rust_decimal::Decimal;

use taxifleet_core::{DomainError, DomainResult};

/// Upper bound for a single earnings, expense or deposit amount.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Non-negative and at most [`MAX_AMOUNT`].
pub fn validate_amount(field: &str, amount: Decimal) -> DomainResult<()> {
    if amount.is_sign_negative() {
        return Err(DomainError::validation(format!("{field} must not be negative")));
    }
    if amount > Decimal::from(MAX_AMOUNT) {
        return Err(DomainError::validation(format!("{field} must not exceed {MAX_AMOUNT}")));
    }
    Ok(())
}

pub fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> DomainResult<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount).ok_or_else(out_of_range))
}

pub fn checked_sub(lhs: Decimal, rhs: Decimal) -> DomainResult<Decimal> {
    lhs.checked_sub(rhs).ok_or_else(out_of_range)
}

fn out_of_range() -> DomainError {
    DomainError::validation("amount total is out of range")
}
