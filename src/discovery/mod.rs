mod api;
mod cluster;
mod error;

use api::{check_error, ApiGetter, ClusterGetter};
pub use cluster::Cluster;
pub use error::DiscoveryError;

use crate::{
    bearer::TokenProvider,
    config::Config,
    kubeconfig::ExecConfig,
};
use reqwest::{header::AUTHORIZATION, Method, Request, StatusCode, Url};
use std::{fmt, sync::Arc, time::Duration};

/// Authenticated client for the cluster discovery service.
#[derive(Clone)]
pub struct DiscoveryClient {
    base_url: String,
    profile: String,
    timeout: Duration,
    client: reqwest::Client,
    tokens: Arc<dyn TokenProvider>,
}

impl fmt::Debug for DiscoveryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryClient")
            .field("base_url", &self.base_url)
            .field("profile", &self.profile)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl DiscoveryClient {
    pub const TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new<B, P>(base_url: B, profile: P, tokens: Arc<dyn TokenProvider>) -> Result<Self, DiscoveryError>
    where
        B: Into<String>,
        P: Into<String>,
    {
        Self::build(base_url.into(), profile.into(), Self::TIMEOUT, tokens)
    }

    pub fn from_config(config: &Config, tokens: Arc<dyn TokenProvider>) -> Result<Self, DiscoveryError> {
        let base_url = match config.base_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url,
            _ => return Err(DiscoveryError::MissingBaseUrl),
        };
        let profile = config.cloud_profile.clone().unwrap_or_default();
        Self::new(base_url, profile, tokens)
    }

    fn build(
        base_url: String,
        profile: String,
        timeout: Duration,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, DiscoveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| DiscoveryError::Transport { source })?;
        Ok(Self {
            base_url,
            profile,
            timeout,
            client,
            tokens,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The kubeconfig credential entry for `cluster_id`, minted through the same provider and
    /// profile this client authenticates with.
    pub fn credential_reference(&self, cluster_id: &str) -> ExecConfig {
        self.tokens.credential_reference(cluster_id, &self.profile)
    }

    fn url(&self, relative: &str) -> Result<Url, DiscoveryError> {
        let parse_err = |err| DiscoveryError::UrlParse {
            url: self.base_url.clone(),
            err,
        };
        let mut url = Url::parse(self.base_url.trim()).map_err(parse_err)?;
        url.path_segments_mut()
            .map_err(|_| parse_err(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(relative);
        Ok(url)
    }

    fn request_error(&self, err: reqwest::Error) -> DiscoveryError {
        if err.is_timeout() {
            DiscoveryError::Timeout(self.timeout)
        } else {
            DiscoveryError::Transport { source: err }
        }
    }

    async fn send(&self, method: &Method, url: Url) -> Result<(StatusCode, Vec<u8>), DiscoveryError> {
        let token = self.tokens.token(&self.profile).await?;
        log::debug!("{} {}", method, url);

        let mut req = Request::new(method.clone(), url);
        req.headers_mut().insert(AUTHORIZATION, token.header_value()?);
        let resp = self.client.execute(req).await.map_err(|err| self.request_error(err))?;
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|err| self.request_error(err))?;
        log::debug!("discovery responded with {} ({} bytes)", status, bytes.len());
        Ok((status, bytes.to_vec()))
    }

    pub async fn get<T: ApiGetter>(&self, getter: &T) -> Result<T::Output, DiscoveryError> {
        let req = getter.get();
        let url = self.url(&req.relative_url)?;
        let (status, body) = self.send(&req.method, url).await?;
        check_error(status, &body)?;
        (req.response)(&body)
    }

    /// Fetches the descriptor for `id`; an empty id addresses the service's default endpoint.
    pub async fn fetch_cluster(&self, id: &str) -> Result<Cluster, DiscoveryError> {
        self.get(&ClusterGetter { id }).await
    }
}
