use thiserror::Error;
use well3_utils::Retryable;

/// Failure reported by a collaborator, tagged by kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The invite code does not exist or was redeemed by someone else.
    #[error("invite code not found or already used")]
    CodeAlreadyUsed,

    /// The social network rejected a post as a duplicate of an earlier one.
    #[error("post is a duplicate")]
    DuplicatePost,

    /// Gas estimation (dry run) of a transaction reverted.
    #[error("simulation failed: {0}")]
    Simulation(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Protocol(String),

    #[error("rejected: {0}")]
    Rejected(String),
}

impl ClientError {
    /// Stable wire tag for this kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::CodeAlreadyUsed => "code_already_used",
            ClientError::DuplicatePost => "duplicate_post",
            ClientError::Simulation(_) => "simulation",
            ClientError::Transport(_) => "transport",
            ClientError::Protocol(_) => "protocol",
            ClientError::Rejected(_) => "rejected",
        }
    }

    /// Rebuild an error from its wire tag. Unknown tags become [`ClientError::Rejected`].
    pub fn from_kind(kind: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            "code_already_used" => ClientError::CodeAlreadyUsed,
            "duplicate_post" => ClientError::DuplicatePost,
            "simulation" => ClientError::Simulation(message),
            "transport" => ClientError::Transport(message),
            "protocol" => ClientError::Protocol(message),
            _ => ClientError::Rejected(message),
        }
    }
}

impl Retryable for ClientError {
    fn is_retryable(&self) -> bool {
        !matches!(self, ClientError::CodeAlreadyUsed | ClientError::DuplicatePost)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Protocol(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_round_trip_through_tags() {
        for err in [
            ClientError::CodeAlreadyUsed,
            ClientError::DuplicatePost,
            ClientError::Simulation("revert".into()),
            ClientError::Transport("reset".into()),
            ClientError::Protocol("bad json".into()),
        ] {
            let rebuilt = ClientError::from_kind(err.kind(), extract(&err));
            assert_eq!(rebuilt, err);
        }
    }

    fn extract(err: &ClientError) -> String {
        match err {
            ClientError::Simulation(m)
            | ClientError::Transport(m)
            | ClientError::Protocol(m)
            | ClientError::Rejected(m) => m.clone(),
            _ => String::new(),
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert_eq!(
            ClientError::from_kind("banned", "account banned"),
            ClientError::Rejected("account banned".into())
        );
    }

    #[test]
    fn domain_errors_are_not_retried() {
        assert!(!ClientError::CodeAlreadyUsed.is_retryable());
        assert!(!ClientError::DuplicatePost.is_retryable());
        assert!(ClientError::Transport("x".into()).is_retryable());
        assert!(ClientError::Simulation("x".into()).is_retryable());
    }
}
