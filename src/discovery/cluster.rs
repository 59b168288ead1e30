use super::DiscoveryError;
use crate::utils::nullable;
use serde::Deserialize;
use std::fmt;

/// One cluster as described by the discovery service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Cluster {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub environment: String,
    #[serde(rename = "cluster_authority_data", default, deserialize_with = "nullable")]
    pub authority_data: String,
    pub server_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub active: bool,
}

impl Cluster {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DiscoveryError> {
        let cluster: Cluster = serde_json::from_slice(bytes)?;
        if cluster.id.is_empty() {
            return Err(DiscoveryError::MissingId);
        }
        Ok(cluster)
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "id:          {}", self.id)?;
        writeln!(f, "environment: {}", self.environment)?;
        writeln!(f, "server:      {}", self.server_url)?;
        write!(f, "active:      {}", self.active)
    }
}
