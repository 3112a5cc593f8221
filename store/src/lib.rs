//! Persistent account store for the well3 runner.
//!
//! The whole address → state map lives in memory behind one async mutex and
//! is written to a single JSON file only at explicit save points. Between
//! saves the file and the map may differ.

pub mod error;
pub mod snapshot;

pub use error::StoreError;
pub use snapshot::AccountStore;
