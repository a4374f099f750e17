//! Profile/earnings aggregation, the commit handshake, and withdrawal rules.
//!
//! The backend is the single source of truth for balances: after every
//! mutation the profile is re-fetched, never locally incremented.

pub mod aggregate;
pub mod commit;
pub mod withdraw;

pub use aggregate::{load_profile, recent_activity, today_earnings, weekly_summary, DayEarnings};
pub use commit::{commit_reward, CommitError};
pub use withdraw::{
    validate_withdrawal, WithdrawalError, MAX_WITHDRAWAL_KSH, MIN_BALANCE_FOR_WITHDRAWAL_KSH,
    MIN_WITHDRAWAL_KSH,
};
