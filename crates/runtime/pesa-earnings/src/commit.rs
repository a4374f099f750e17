//! The earnings-commit handshake.
//!
//! One atomic remote call (`add_earnings_and_log`) followed by a full
//! profile re-fetch. Never a client-side read-modify-write -- concurrent
//! sessions (multiple tabs) would lose updates -- and never an automatic
//! retry, since the failure is not assumed transient.

use thiserror::Error;
use uuid::Uuid;

use pesa_core::Profile;
use pesa_core::StoreError;
use pesa_gateway::DataStore;

#[derive(Debug, Error)]
pub enum CommitError {
    /// A non-positive amount must never reach the backend.
    #[error("earn amount must be positive, got {0}")]
    InvalidAmount(f64),
    /// The atomic procedure failed; the balance is untouched on both sides.
    #[error("failed to save new balance: {0}")]
    Rpc(#[source] StoreError),
    /// The commit landed but the re-fetch did not; the local balance is
    /// stale until the next load.
    #[error("could not refetch profile: {0}")]
    Refetch(#[source] StoreError),
}

/// Commit one completed watch and return the authoritative profile.
pub async fn commit_reward(
    store: &dyn DataStore,
    user_id: Uuid,
    amount: f64,
    video_title: &str,
) -> Result<Profile, CommitError> {
    if !(amount.is_finite() && amount > 0.0) {
        return Err(CommitError::InvalidAmount(amount));
    }
    let description = format!("Watched \"{video_title}\"");
    tracing::info!(amount, %description, "committing earnings");

    store
        .add_earnings_and_log(amount, &description)
        .await
        .map_err(CommitError::Rpc)?;

    let profile = store
        .profile(user_id)
        .await
        .map_err(CommitError::Refetch)?;
    tracing::debug!(earnings = profile.earnings, "profile refetched after commit");
    Ok(profile)
}
