//! # Ledger
//!
//! Records shared by the HTTP server and the import tool.
//!
//! Every record is a flat, camelCase JSON document keyed by an `i64` id. The
//! store never interprets documents, so all derived fields (customer tiers,
//! invoice balances, default statuses) are computed here, at the moment a
//! record is created or patched.
//!
//! ## Lifecycle
//!
//! - `New*` payloads are validated, then turned into records with
//!   `create(.., now)`. The id is assigned later by the store.
//! - `*Patch` payloads are partial: absent fields keep their current value.
//! - Time is always passed in so the rules stay deterministic under test.

use serde::{Serialize, de::DeserializeOwned};

#[macro_use]
mod macros;

pub mod analytics;
pub mod customer;
pub mod employee;
pub mod error;
pub mod invoice;
pub mod product;
pub mod project;
pub mod purchase_order;
pub mod report;
pub mod sales_order;
pub mod supplier;
pub mod transaction;
pub mod user;
pub mod validate;
pub mod warehouse;

pub use error::LedgerError;

/// A document persisted in its own table.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const TABLE: &'static str;

    fn id(&self) -> i64;

    fn set_id(&mut self, id: i64);

    /// Field name and value pairs that must not repeat within the table.
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

pub(crate) fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

pub(crate) fn merge_opt<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}
