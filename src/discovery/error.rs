use crate::{bearer::TokenError, error::ErrorKind};
use reqwest::StatusCode;
use std::{error::Error as StdError, time::Duration};

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Discovery base URL is not configured")]
    MissingBaseUrl,
    #[error("Could not obtain credential: {}", _0)]
    Token(#[from] TokenError),
    #[error("Invalid discovery URL \"{}\": {}", url, err)]
    UrlParse { url: String, err: url::ParseError },
    #[error("Request to discovery failed: {}", cause_chain(source))]
    Transport { source: reqwest::Error },
    #[error("Request to discovery timed out after {}s", _0.as_secs_f32())]
    Timeout(Duration),
    #[error("Discovery responded with {}: {}", status, message)]
    Remote { status: StatusCode, message: String },
    #[error("Could not decode discovery response: {}", _0)]
    Decode(#[from] serde_json::Error),
    #[error("Discovery response is missing \"id\"")]
    MissingId,
}

impl DiscoveryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DiscoveryError::MissingBaseUrl => ErrorKind::NotConfigured,
            DiscoveryError::Token(err) => err.kind(),
            DiscoveryError::UrlParse { .. } | DiscoveryError::Transport { .. } => ErrorKind::Transport,
            DiscoveryError::Timeout(_) => ErrorKind::Timeout,
            DiscoveryError::Remote { .. } => ErrorKind::Remote,
            DiscoveryError::Decode(_) | DiscoveryError::MissingId => ErrorKind::Decode,
        }
    }
}

// reqwest keeps the interesting part (dns, refused, bad scheme) in the source chain
fn cause_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
