//! Transaction and receipt shapes exchanged with the chain collaborator.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Address, TypesError};

/// A contract method invocation: ABI method name plus JSON-encoded arguments.
///
/// ABI encoding is the chain collaborator's job; the runner only decides what
/// to call and with which server-issued parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractCall {
    pub method: String,
    pub args: Vec<serde_json::Value>,
}

impl ContractCall {
    pub fn new(method: impl Into<String>, args: Vec<serde_json::Value>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }
}

/// Transaction parameters before signing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnsignedTx {
    pub from: Address,
    pub to: Address,
    pub nonce: u64,
    pub gas_price: u64,
    /// Gas limit; set only after simulation succeeds.
    pub gas: Option<u64>,
    pub call: ContractCall,
}

/// Raw signed transaction bytes, ready for broadcast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx(#[serde(with = "hex_bytes")] pub Vec<u8>);

/// A transaction receipt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// `true` when the transaction executed successfully.
    pub status: bool,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

/// One emitted event log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub topics: Vec<Word>,
    #[serde(default, with = "hex_bytes")]
    pub data: Vec<u8>,
}

/// A 32-byte ABI word (event topics, decoded log fields).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Word(pub [u8; 32]);

impl Word {
    pub fn from_hex(s: &str) -> Result<Self, TypesError> {
        let body = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(body).map_err(|_| TypesError::InvalidHash(s.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| TypesError::InvalidHash(s.to_string()))?;
        Ok(Self(arr))
    }
}

impl Serialize for Word {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(self.0)))
    }
}

impl<'de> Deserialize<'de> for Word {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Word::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(serde::de::Error::custom)
    }
}
