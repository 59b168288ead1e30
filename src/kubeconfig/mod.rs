mod document;
mod error;

pub use document::{
    Cluster, Context, ExecConfig, ExecEnvVar, Extra, Kubeconfig, NamedCluster, NamedContext, User,
};
pub use error::KubeconfigError;

use crate::discovery::{self, DiscoveryClient};
use std::path::Path;
use url::Url;
use KubeconfigError as Error;

/// Result of a successful switch.
#[derive(Debug, Clone, PartialEq)]
pub struct Switched {
    pub cluster_id: String,
    pub environment: String,
    pub active: bool,
    pub user_created: bool,
}

impl Switched {
    /// Caution for the caller when discovery does not consider the cluster live.
    pub fn warning(&self) -> Option<String> {
        if self.active {
            return None;
        }
        Some(format!(
            "cluster {} ({}) is not marked active in discovery",
            self.cluster_id, self.environment
        ))
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Fetching,
    Merging,
    Writing,
    Done,
}

/// Name of the context `current-context` points at.
pub fn current_cluster<P: AsRef<Path>>(path: P) -> Result<String, Error> {
    let path = path.as_ref();
    let kubeconfig = Kubeconfig::from_path(path)?;
    kubeconfig
        .current()
        .map(|context| context.name.clone())
        .ok_or_else(|| Error::NoCurrentContext { path: path.into() })
}

/// Fetches `cluster_id` from discovery, folds it into the kubeconfig at `path` and makes it the
/// current context. The file is only replaced once every step before the write succeeded.
pub async fn switch_cluster<P: AsRef<Path>>(
    path: P,
    cluster_id: &str,
    client: &DiscoveryClient,
) -> Result<Switched, Error> {
    let path = path.as_ref();
    if cluster_id.trim().is_empty() {
        return Err(Error::InvalidClusterId(cluster_id.to_string()));
    }

    log::debug!("switch {}: {:?}", cluster_id, Phase::Fetching);
    let cluster = client.fetch_cluster(cluster_id).await?;

    log::debug!("switch {}: {:?}", cluster_id, Phase::Merging);
    let mut kubeconfig = Kubeconfig::from_path(path)?;
    let user_created = merge(&mut kubeconfig, cluster_id, &cluster, || {
        client.credential_reference(cluster_id)
    })?;

    log::debug!(
        "user entry {} {}",
        cluster_id,
        if user_created { "created" } else { "reused" }
    );
    log::debug!("switch {}: {:?}", cluster_id, Phase::Writing);
    kubeconfig.write(path)?;

    log::debug!("switch {}: {:?}", cluster_id, Phase::Done);
    Ok(Switched {
        cluster_id: cluster.id,
        environment: cluster.environment,
        active: cluster.active,
        user_created,
    })
}

/// Upserts the cluster and context named `id`, creates the user `id` unless it already exists,
/// and points `current-context` at it. Entries under other names are not touched.
pub fn merge<F>(
    kubeconfig: &mut Kubeconfig,
    id: &str,
    cluster: &discovery::Cluster,
    credential: F,
) -> Result<bool, Error>
where
    F: FnOnce() -> ExecConfig,
{
    if cluster.id != id {
        return Err(Error::IdMismatch {
            requested: id.to_string(),
            returned: cluster.id.clone(),
        });
    }
    Url::parse(&cluster.server_url).map_err(|err| Error::InvalidServerUrl {
        url: cluster.server_url.clone(),
        err,
    })?;
    let certificate_authority_data = if cluster.authority_data.is_empty() {
        None
    } else {
        base64::decode(&cluster.authority_data).map_err(Error::InvalidBase64Cacert)?;
        Some(cluster.authority_data.clone())
    };

    kubeconfig.upsert_cluster(NamedCluster {
        name: id.to_string(),
        cluster: Cluster {
            server: cluster.server_url.clone(),
            certificate_authority_data,
            other: Extra::new(),
        },
    });
    let user_created = kubeconfig.ensure_user(id, || User {
        exec: Some(credential()),
        other: Extra::new(),
    });
    kubeconfig.upsert_context(NamedContext {
        name: id.to_string(),
        context: Context {
            cluster: id.to_string(),
            user: id.to_string(),
            namespace: None,
            other: Extra::new(),
        },
    });
    kubeconfig.set_current(id)?;
    Ok(user_created)
}
