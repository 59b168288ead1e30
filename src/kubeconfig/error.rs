use crate::{discovery::DiscoveryError, error::ErrorKind};
use std::{io, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum KubeconfigError {
    #[error("No kubeconfig at \"{}\"", path.display())]
    NotConfigured { path: PathBuf },
    #[error("Could not locate home directory for the default kubeconfig path")]
    HomeDir,
    #[error("Could not read file \"{}\": {}", path.display(), err)]
    FileRead { path: PathBuf, err: io::Error },
    #[error("Could not deserialize yaml \"{}\": {}", path.display(), err)]
    FileDeserialize { path: PathBuf, err: serde_yaml::Error },
    #[error("No current context set in \"{}\"", path.display())]
    NoCurrentContext { path: PathBuf },
    #[error("Missing context \"{}\"", _0)]
    MissingContext(String),
    #[error("Invalid cluster id {:?}", _0)]
    InvalidClusterId(String),
    #[error("Discovery returned cluster \"{}\" when asked for \"{}\"", returned, requested)]
    IdMismatch { requested: String, returned: String },
    #[error("Invalid base64 in \"cluster_authority_data\": {}", _0)]
    InvalidBase64Cacert(base64::DecodeError),
    #[error("Invalid server URL \"{}\": {}", url, err)]
    InvalidServerUrl { url: String, err: url::ParseError },
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error("Could not serialize kubeconfig: {}", _0)]
    Serialize(serde_yaml::Error),
    #[error("Could not write file \"{}\": {}", path.display(), err)]
    FileWrite { path: PathBuf, err: io::Error },
}

impl KubeconfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KubeconfigError::NotConfigured { .. } | KubeconfigError::HomeDir => ErrorKind::NotConfigured,
            KubeconfigError::FileRead { .. } | KubeconfigError::FileDeserialize { .. } => ErrorKind::Parse,
            KubeconfigError::NoCurrentContext { .. } => ErrorKind::NoCurrentContext,
            KubeconfigError::MissingContext(_) | KubeconfigError::InvalidClusterId(_) => ErrorKind::InvalidArgument,
            KubeconfigError::IdMismatch { .. }
            | KubeconfigError::InvalidBase64Cacert(_)
            | KubeconfigError::InvalidServerUrl { .. } => ErrorKind::Decode,
            KubeconfigError::Discovery(err) => err.kind(),
            KubeconfigError::Serialize(_) | KubeconfigError::FileWrite { .. } => ErrorKind::Write,
        }
    }
}
