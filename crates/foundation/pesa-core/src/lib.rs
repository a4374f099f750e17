//! Core domain types for WatchPesa.
//!
//! Everything here is backend-shape: structs deserialize straight from the
//! hosted store's rows and carry no UI state. Higher tiers (gateway, runtime,
//! web) depend on this crate and never the other way around.

pub mod error;
pub mod tier;
pub mod types;

pub use error::StoreError;
pub use tier::Tier;
pub use types::{Category, EarningsRecord, Profile, Video};
