//! Pre-built [`tracing::Span`] constructors for runner work units.
//!
//! Consistent span names and fields make a multi-batch run easy to filter:
//! every line logged while an account is processed carries its index and
//! address, every batch its id.

use tracing::{info_span, Span};
use well3_types::Address;

/// Span covering one batch worker.
pub fn batch_span(batch: usize, accounts: usize) -> Span {
    info_span!("batch", id = batch, accounts = accounts)
}

/// Span covering one account job.
pub fn account_span(index: usize, address: &Address) -> Span {
    info_span!("account", idx = index, address = %address)
}

/// Span covering one invite pool refill.
pub fn refill_span() -> Span {
    info_span!("invite_refill")
}
