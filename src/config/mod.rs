mod error;

pub use error::ConfigError;

use crate::utils::{parse_document, read_optional, write_atomic};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use ConfigError as Error;

/// Persisted CLI settings: where discovery lives and which cloud profile signs requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "baseURL", default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(rename = "cloudProfile", default, skip_serializing_if = "Option::is_none")]
    pub cloud_profile: Option<String>,
    #[serde(skip)]
    path: PathBuf,
}

impl Config {
    /// References the configuration at `path`, or at `$HOME/.kube/pharos/config` when no path
    /// is given. Nothing is read until [`Config::load`].
    pub fn new<P: AsRef<Path>>(path: Option<P>) -> Result<Self, Error> {
        let path = match path {
            Some(path) => path.as_ref().to_path_buf(),
            None => Self::default_path()?,
        };
        Ok(Self {
            path,
            ..Self::default()
        })
    }

    pub fn default_path() -> Result<PathBuf, Error> {
        let homedir = dirs::home_dir().ok_or(Error::HomeDir)?;
        Ok(homedir.join(".kube").join("pharos").join("config"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&mut self) -> Result<(), Error> {
        let content = read_optional(&self.path)
            .map_err(|err| Error::FileRead {
                path: self.path.clone(),
                err,
            })?
            .unwrap_or_default();

        let loaded = parse_document::<Config>(&content)
            .map_err(|err| Error::FileDeserialize {
                path: self.path.clone(),
                err,
            })?
            .filter(|loaded| loaded.base_url.is_some() || loaded.cloud_profile.is_some())
            .ok_or_else(|| Error::NotConfigured {
                path: self.path.clone(),
            })?;

        log::debug!("loaded configuration from {}", self.path.display());
        self.base_url = loaded.base_url;
        self.cloud_profile = loaded.cloud_profile;
        Ok(())
    }

    pub fn save(&self) -> Result<(), Error> {
        let yaml = serde_yaml::to_string(self).map_err(Error::Serialize)?;
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|err| Error::FileWrite {
                path: dir.to_path_buf(),
                err,
            })?;
        }
        write_atomic(&self.path, yaml.as_bytes()).map_err(|err| Error::FileWrite {
            path: self.path.clone(),
            err,
        })?;
        log::debug!("saved configuration to {}", self.path.display());
        Ok(())
    }
}
