//! Withdrawal validation.
//!
//! No real transfer happens here: a valid request points the user at the
//! external activation link, and the caller re-fetches the profile rather
//! than decrementing anything locally.

use thiserror::Error;

pub const MIN_WITHDRAWAL_KSH: f64 = 100.0;
pub const MAX_WITHDRAWAL_KSH: f64 = 2000.0;
/// Balance floor before any withdrawal is allowed.
pub const MIN_BALANCE_FOR_WITHDRAWAL_KSH: f64 = 250.0;

#[derive(Debug, Error, PartialEq)]
pub enum WithdrawalError {
    #[error("Minimum withdrawal amount is {MIN_WITHDRAWAL_KSH} KSH")]
    BelowMinimum,
    #[error("Maximum withdrawal amount is {MAX_WITHDRAWAL_KSH} KSH per task")]
    AboveMaximum,
    #[error(
        "You need at least {MIN_BALANCE_FOR_WITHDRAWAL_KSH} KSH before you can withdraw. \
         Watch more videos to earn!"
    )]
    BalanceBelowFloor,
    #[error("You don't have enough balance for this withdrawal")]
    InsufficientBalance,
}

/// Check an amount against the static thresholds and the current balance.
/// Checks run in form order: min, max, balance floor, then coverage.
pub fn validate_withdrawal(amount: f64, available_balance: f64) -> Result<(), WithdrawalError> {
    if !amount.is_finite() || amount < MIN_WITHDRAWAL_KSH {
        return Err(WithdrawalError::BelowMinimum);
    }
    if amount > MAX_WITHDRAWAL_KSH {
        return Err(WithdrawalError::AboveMaximum);
    }
    if available_balance < MIN_BALANCE_FOR_WITHDRAWAL_KSH {
        return Err(WithdrawalError::BalanceBelowFloor);
    }
    if amount > available_balance {
        return Err(WithdrawalError::InsufficientBalance);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_below_minimum() {
        assert_eq!(validate_withdrawal(99.0, 1000.0), Err(WithdrawalError::BelowMinimum));
        assert_eq!(validate_withdrawal(f64::NAN, 1000.0), Err(WithdrawalError::BelowMinimum));
    }

    #[test]
    fn rejects_above_maximum() {
        assert_eq!(validate_withdrawal(2001.0, 5000.0), Err(WithdrawalError::AboveMaximum));
    }

    #[test]
    fn rejects_balance_below_floor() {
        // Amount itself is fine, but the balance has not reached the floor.
        assert_eq!(validate_withdrawal(100.0, 249.0), Err(WithdrawalError::BalanceBelowFloor));
    }

    #[test]
    fn rejects_amount_over_balance() {
        assert_eq!(
            validate_withdrawal(400.0, 300.0),
            Err(WithdrawalError::InsufficientBalance)
        );
    }

    #[test]
    fn accepts_valid_requests() {
        assert_eq!(validate_withdrawal(100.0, 250.0), Ok(()));
        assert_eq!(validate_withdrawal(2000.0, 2000.0), Ok(()));
        assert_eq!(validate_withdrawal(250.0, 1000.0), Ok(()));
    }
}
