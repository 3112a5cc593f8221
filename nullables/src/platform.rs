//! Nullable platform session.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use well3_clients::{ClientError, PlatformClient};
use well3_types::{Address, InviteCode, Profile};

#[derive(Default)]
struct State {
    needs_invite: bool,
    sign_in_error: Option<ClientError>,
    spent_codes: HashSet<InviteCode>,
    redeem_attempts: Vec<InviteCode>,
    profiles: VecDeque<Profile>,
    profile_error: Option<ClientError>,
    wallet: Option<Address>,
    sign_ins: usize,
    generate_calls: usize,
    profile_fetches: usize,
    links: Vec<(String, String)>,
    claimed: Vec<String>,
    timed_sessions: usize,
}

/// A platform session with a scripted profile sequence.
///
/// `fetch_profile` pops queued profiles and keeps returning the last one.
/// Linking the wallet marks every remaining profile as linked to the
/// address given to [`with_wallet`](Self::with_wallet).
#[derive(Clone, Default)]
pub struct NullPlatform {
    state: Arc<Mutex<State>>,
}

impl NullPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registration stays incomplete until an unspent code is redeemed.
    pub fn needing_invite(self) -> Self {
        self.lock().needs_invite = true;
        self
    }

    /// Queue `profile` after any profiles already queued.
    pub fn with_profile(self, profile: Profile) -> Self {
        self.lock().profiles.push_back(profile);
        self
    }

    pub fn with_wallet(self, address: Address) -> Self {
        self.lock().wallet = Some(address);
        self
    }

    /// Reject `code` as already used.
    pub fn spend_code(&self, code: InviteCode) {
        self.lock().spent_codes.insert(code);
    }

    pub fn fail_sign_in(&self, err: ClientError) {
        self.lock().sign_in_error = Some(err);
    }

    pub fn fail_profile(&self, err: ClientError) {
        self.lock().profile_error = Some(err);
    }

    pub fn redeem_attempts(&self) -> Vec<InviteCode> {
        self.lock().redeem_attempts.clone()
    }

    pub fn sign_ins(&self) -> usize {
        self.lock().sign_ins
    }

    pub fn generate_calls(&self) -> usize {
        self.lock().generate_calls
    }

    pub fn profile_fetches(&self) -> usize {
        self.lock().profile_fetches
    }

    pub fn links(&self) -> Vec<(String, String)> {
        self.lock().links.clone()
    }

    pub fn claimed(&self) -> Vec<String> {
        self.lock().claimed.clone()
    }

    pub fn timed_sessions(&self) -> usize {
        self.lock().timed_sessions
    }
}

impl PlatformClient for NullPlatform {
    async fn sign_in_or_register(&self) -> Result<bool, ClientError> {
        let mut state = self.lock();
        state.sign_ins += 1;
        if let Some(err) = state.sign_in_error.clone() {
            return Err(err);
        }
        Ok(state.needs_invite)
    }

    async fn redeem_invite(&self, code: &InviteCode) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.redeem_attempts.push(code.clone());
        if !state.spent_codes.insert(code.clone()) {
            return Err(ClientError::CodeAlreadyUsed);
        }
        state.needs_invite = false;
        Ok(())
    }

    async fn generate_codes(&self) -> Result<(), ClientError> {
        self.lock().generate_calls += 1;
        Ok(())
    }

    async fn fetch_profile(&self) -> Result<Profile, ClientError> {
        let mut state = self.lock();
        state.profile_fetches += 1;
        if let Some(err) = state.profile_error.clone() {
            return Err(err);
        }
        if state.profiles.len() > 1 {
            if let Some(profile) = state.profiles.pop_front() {
                return Ok(profile);
            }
        }
        Ok(state.profiles.front().cloned().unwrap_or_default())
    }

    async fn link_wallet(&self, message: &str, signature: &str) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.links.push((message.to_string(), signature.to_string()));
        let wallet = state.wallet.clone();
        for profile in state.profiles.iter_mut() {
            profile.contract_info.linked_address = wallet.clone();
        }
        Ok(())
    }

    async fn claim_quest_exp(&self, task_id: &str) -> Result<(), ClientError> {
        self.lock().claimed.push(task_id.to_string());
        Ok(())
    }

    async fn complete_timed_activity(&self) -> Result<(), ClientError> {
        self.lock().timed_sessions += 1;
        Ok(())
    }
}
