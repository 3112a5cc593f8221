//! Nullable collaborators for deterministic testing.
//!
//! Each null implements one collaborator trait from `well3-clients` with
//! scripted, in-memory behaviour:
//! - Responses are deterministic and can be queued up front
//! - Every call is recorded for assertions
//! - Nothing touches the network
//!
//! Nulls are cheap handles over shared state: clone one, hand the clone to
//! the code under test and inspect the original afterwards.

pub mod chain;
pub mod connector;
pub mod platform;
pub mod social;

pub use chain::NullChain;
pub use connector::NullConnector;
pub use platform::NullPlatform;
pub use social::NullSocial;
