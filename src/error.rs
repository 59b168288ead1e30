use crate::{config::ConfigError, discovery::DiscoveryError, kubeconfig::KubeconfigError};
use std::fmt;

/// Closed set of failure categories; callers branch on this instead of message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotConfigured,
    Parse,
    Decode,
    Transport,
    Timeout,
    Remote,
    NoCurrentContext,
    InvalidArgument,
    Write,
    Credential,
    Interrupted,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotConfigured => "not configured",
            ErrorKind::Parse => "parse error",
            ErrorKind::Decode => "decode error",
            ErrorKind::Transport => "transport error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Remote => "remote error",
            ErrorKind::NoCurrentContext => "no current context",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::Write => "write error",
            ErrorKind::Credential => "credential error",
            ErrorKind::Interrupted => "interrupted",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Kubeconfig(#[from] KubeconfigError),
    #[error("Interrupted")]
    Interrupted,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(err) => err.kind(),
            Error::Discovery(err) => err.kind(),
            Error::Kubeconfig(err) => err.kind(),
            Error::Interrupted => ErrorKind::Interrupted,
        }
    }
}
