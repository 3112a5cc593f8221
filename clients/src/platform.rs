//! Quest platform session.

use std::future::Future;
use well3_types::{InviteCode, Profile};

use crate::ClientError;

/// One signed-in platform session, bound to a single account.
pub trait PlatformClient: Send + Sync {
    /// Sign in, starting registration for new accounts.
    ///
    /// Returns `true` when registration cannot finish without an invite code.
    fn sign_in_or_register(&self) -> impl Future<Output = Result<bool, ClientError>> + Send;

    /// Finish registration with an invite code.
    ///
    /// Fails with [`ClientError::CodeAlreadyUsed`] for spent or unknown codes.
    fn redeem_invite(
        &self,
        code: &InviteCode,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Ask the platform to mint any referral codes the account is entitled to.
    fn generate_codes(&self) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn fetch_profile(&self) -> impl Future<Output = Result<Profile, ClientError>> + Send;

    /// Link the wallet that produced `signature` over `message`.
    fn link_wallet(
        &self,
        message: &str,
        signature: &str,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Claim quest experience (or submit the quest for verification).
    fn claim_quest_exp(&self, task_id: &str)
        -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Complete one session of the timed activity.
    fn complete_timed_activity(&self) -> impl Future<Output = Result<(), ClientError>> + Send;
}
