use crate::error::ErrorKind;
use std::{io, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("pharos hasn't been configured yet (no configuration at \"{}\")", path.display())]
    NotConfigured { path: PathBuf },
    #[error("Could not locate home directory for the default configuration path")]
    HomeDir,
    #[error("Could not read file \"{}\": {}", path.display(), err)]
    FileRead { path: PathBuf, err: io::Error },
    #[error("Could not deserialize yaml \"{}\": {}", path.display(), err)]
    FileDeserialize { path: PathBuf, err: serde_yaml::Error },
    #[error("Could not serialize configuration: {}", _0)]
    Serialize(serde_yaml::Error),
    #[error("Could not write file \"{}\": {}", path.display(), err)]
    FileWrite { path: PathBuf, err: io::Error },
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::NotConfigured { .. } | ConfigError::HomeDir => ErrorKind::NotConfigured,
            ConfigError::FileRead { .. } | ConfigError::FileDeserialize { .. } => ErrorKind::Parse,
            ConfigError::Serialize(_) | ConfigError::FileWrite { .. } => ErrorKind::Write,
        }
    }
}
