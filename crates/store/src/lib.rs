//! `userward-store` — the Principal Store collaborator.
//!
//! Defines the [`UserStore`] contract the service layer mutates through, the
//! search-query model pushed into it, and an in-memory implementation for
//! tests/dev.

pub mod memory;
pub mod query;
pub mod store;

pub use memory::InMemoryUserStore;
pub use query::{QueryParseError, SearchQuery};
pub use store::{StoreError, UserStore};
