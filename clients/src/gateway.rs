//! JSON-RPC gateway client.
//!
//! Every collaborator operation becomes one POST to the gateway URL:
//!
//! ```json
//! { "action": "fetch_profile", "session": { "label": "3", "address": "0x..", "proxy": "..", "social_token": ".." }, ... }
//! ```
//!
//! The gateway answers `{ "result": ... }` on success or
//! `{ "error": "message", "kind": "code_already_used" }` on failure; `kind`
//! maps onto [`ClientError`] via [`ClientError::from_kind`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use well3_types::{
    AccountState, Address, ContractCall, InviteCode, PrivateKey, Profile, Receipt, SignedTx,
    TxHash, UnsignedTx,
};

use crate::{ChainClient, ClientError, Clients, Connector, PlatformClient, SocialClient};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

fn build_http() -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| ClientError::Transport(format!("failed to create HTTP client: {e}")))
}

/// Session identity sent with every request.
#[derive(Clone, Debug, Serialize)]
struct SessionInfo {
    label: String,
    address: Address,
    proxy: String,
    social_token: String,
}

/// Connector that opens gateway-backed sessions.
#[derive(Clone)]
pub struct GatewayConnector {
    http: reqwest::Client,
    url: String,
}

impl GatewayConnector {
    pub fn new(url: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            http: build_http()?,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Connector for GatewayConnector {
    type Platform = GatewaySession;
    type Social = GatewaySession;
    type Chain = GatewaySession;

    async fn address_of(&self, key: &PrivateKey) -> Result<Address, ClientError> {
        let result = rpc_call(
            &self.http,
            &self.url,
            "address_of",
            serde_json::json!({ "private_key": key.to_hex() }),
        )
        .await?;
        decode(result)
    }

    async fn rotate_proxy(&self, link: &str) -> Result<(), ClientError> {
        let response = self.http.get(link).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Transport(format!(
                "failed to change ip: status = {status}, response = {body}"
            )));
        }
        Ok(())
    }

    async fn connect(
        &self,
        label: &str,
        state: &AccountState,
    ) -> Result<Clients<GatewaySession, GatewaySession, GatewaySession>, ClientError> {
        let session = GatewaySession {
            http: self.http.clone(),
            url: self.url.clone(),
            info: SessionInfo {
                label: label.to_string(),
                address: state.address.clone(),
                proxy: state.proxy_url().to_string(),
                social_token: state.social_token.clone(),
            },
        };
        session.call::<serde_json::Value>("start", serde_json::json!({})).await?;
        Ok(Clients {
            platform: session.clone(),
            social: session.clone(),
            chain: session,
        })
    }
}

/// One account's gateway session; implements all three collaborator traits.
#[derive(Clone)]
pub struct GatewaySession {
    http: reqwest::Client,
    url: String,
    info: SessionInfo,
}

impl GatewaySession {
    async fn call<T: DeserializeOwned>(
        &self,
        action: &str,
        params: serde_json::Value,
    ) -> Result<T, ClientError> {
        let mut body = params;
        let session = serde_json::to_value(&self.info)
            .map_err(|e| ClientError::Protocol(format!("session encoding: {e}")))?;
        body.as_object_mut()
            .ok_or_else(|| ClientError::Protocol("params must be a JSON object".into()))?
            .insert("session".to_string(), session);
        let result = rpc_call(&self.http, &self.url, action, body).await?;
        decode(result)
    }
}

/// Send one request and return the `result` field.
async fn rpc_call(
    http: &reqwest::Client,
    url: &str,
    action: &str,
    params: serde_json::Value,
) -> Result<serde_json::Value, ClientError> {
    let mut body = params;
    body.as_object_mut()
        .ok_or_else(|| ClientError::Protocol("params must be a JSON object".into()))?
        .insert("action".to_string(), serde_json::json!(action));

    tracing::trace!(action, "gateway request");
    let response = http.post(url).json(&body).send().await?;
    let status = response.status();
    let json: serde_json::Value = response.json().await?;

    if let Some(message) = json.get("error").and_then(|e| e.as_str()) {
        let kind = json.get("kind").and_then(|k| k.as_str()).unwrap_or("rejected");
        return Err(ClientError::from_kind(kind, message));
    }
    if !status.is_success() {
        return Err(ClientError::Transport(format!("gateway returned HTTP {status}")));
    }
    Ok(json.get("result").cloned().unwrap_or(serde_json::Value::Null))
}

fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|e| ClientError::Protocol(e.to_string()))
}

impl PlatformClient for GatewaySession {
    async fn sign_in_or_register(&self) -> Result<bool, ClientError> {
        self.call("sign_in_or_register", serde_json::json!({})).await
    }

    async fn redeem_invite(&self, code: &InviteCode) -> Result<(), ClientError> {
        self.call::<serde_json::Value>("redeem_invite", serde_json::json!({ "code": code }))
            .await
            .map(drop)
    }

    async fn generate_codes(&self) -> Result<(), ClientError> {
        self.call::<serde_json::Value>("generate_codes", serde_json::json!({}))
            .await
            .map(drop)
    }

    async fn fetch_profile(&self) -> Result<Profile, ClientError> {
        self.call("fetch_profile", serde_json::json!({})).await
    }

    async fn link_wallet(&self, message: &str, signature: &str) -> Result<(), ClientError> {
        self.call::<serde_json::Value>(
            "link_wallet",
            serde_json::json!({ "message": message, "signature": signature }),
        )
        .await
        .map(drop)
    }

    async fn claim_quest_exp(&self, task_id: &str) -> Result<(), ClientError> {
        self.call::<serde_json::Value>("claim_quest_exp", serde_json::json!({ "task_id": task_id }))
            .await
            .map(drop)
    }

    async fn complete_timed_activity(&self) -> Result<(), ClientError> {
        self.call::<serde_json::Value>("complete_timed_activity", serde_json::json!({}))
            .await
            .map(drop)
    }
}

impl SocialClient for GatewaySession {
    async fn post(&self, text: &str) -> Result<String, ClientError> {
        self.call("social_post", serde_json::json!({ "text": text })).await
    }

    async fn follow(&self, username: &str) -> Result<(), ClientError> {
        self.call::<serde_json::Value>("social_follow", serde_json::json!({ "username": username }))
            .await
            .map(drop)
    }

    async fn retweet(&self, tweet_id: &str) -> Result<(), ClientError> {
        self.call::<serde_json::Value>("social_retweet", serde_json::json!({ "tweet_id": tweet_id }))
            .await
            .map(drop)
    }

    async fn like(&self, tweet_id: &str) -> Result<bool, ClientError> {
        self.call("social_like", serde_json::json!({ "tweet_id": tweet_id })).await
    }
}

impl ChainClient for GatewaySession {
    async fn get_nonce(&self, address: &Address) -> Result<u64, ClientError> {
        self.call("get_nonce", serde_json::json!({ "address": address })).await
    }

    async fn estimate_gas(&self, tx: &UnsignedTx) -> Result<u64, ClientError> {
        self.call("estimate_gas", serde_json::json!({ "tx": tx })).await
    }

    async fn sign(&self, tx: &UnsignedTx, key: &PrivateKey) -> Result<SignedTx, ClientError> {
        self.call(
            "sign",
            serde_json::json!({ "tx": tx, "private_key": key.to_hex() }),
        )
        .await
    }

    async fn send_raw(&self, tx: &SignedTx) -> Result<TxHash, ClientError> {
        self.call("send_raw", serde_json::json!({ "raw": tx })).await
    }

    async fn get_receipt(&self, hash: &TxHash) -> Result<Option<Receipt>, ClientError> {
        self.call("get_receipt", serde_json::json!({ "hash": hash })).await
    }

    async fn call_view(
        &self,
        contract: &Address,
        call: &ContractCall,
    ) -> Result<serde_json::Value, ClientError> {
        self.call(
            "call_view",
            serde_json::json!({ "contract": contract, "call": call }),
        )
        .await
    }

    async fn sign_message(&self, key: &PrivateKey, message: &str) -> Result<String, ClientError> {
        self.call(
            "sign_message",
            serde_json::json!({ "private_key": key.to_hex(), "message": message }),
        )
        .await
    }
}
