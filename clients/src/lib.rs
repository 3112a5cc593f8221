//! Collaborator interfaces consumed by the runner core.
//!
//! The platform, the social network and the chain are reached only through
//! the traits in this crate. Errors carry a tagged [`ClientError`] kind so
//! callers branch on the kind instead of matching message text.
//!
//! [`gateway`] provides the production implementation: every operation is a
//! JSON-RPC request to a sidecar service that speaks the real protocols.

pub mod chain;
pub mod connector;
pub mod error;
pub mod gateway;
pub mod platform;
pub mod social;

pub use chain::ChainClient;
pub use connector::{Clients, Connector};
pub use error::ClientError;
pub use gateway::{GatewayConnector, GatewaySession};
pub use platform::PlatformClient;
pub use social::SocialClient;
