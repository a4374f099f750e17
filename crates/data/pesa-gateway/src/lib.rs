//! Remote Data Gateway -- the only crate that talks to the hosted backend.
//!
//! Three pieces:
//!   - [`auth::AuthClient`]: sign-up / sign-in / current-user over the
//!     hosted auth API.
//!   - [`store::DataStore`]: the typed seam the runtime crates program
//!     against.
//!   - [`rest::SupabaseStore`]: the production `DataStore` over PostgREST,
//!     including the atomic `add_earnings_and_log` procedure.
//!
//! [`memory::MemoryStore`] is a seedable in-process implementation used when
//! no backend is configured and by the runtime crates' tests.

pub mod auth;
pub mod memory;
pub mod rest;
pub mod store;

pub use auth::{AuthClient, AuthSession, AuthUser};
pub use memory::MemoryStore;
pub use rest::SupabaseStore;
pub use store::{CategoryDraft, DataStore, VideoDraft};
