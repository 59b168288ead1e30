use super::{Cluster, DiscoveryError};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use std::fmt;

pub trait ApiGetter {
    type Output;
    fn get(&self) -> Req<Self::Output>;
}

#[derive(Clone)]
pub struct Req<T> {
    pub method: Method,
    /// Path segment appended to the discovery base URL; empty for the default endpoint.
    pub relative_url: String,
    pub response: fn(&[u8]) -> Result<T, DiscoveryError>,
}

impl<T> fmt::Debug for Req<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Req")
            .field("method", &self.method)
            .field("relative_url", &self.relative_url)
            .field("response", &"fn(...)")
            .finish()
    }
}

impl<T> Req<T> {
    fn get<S: Into<String>>(relative_url: S, f: fn(&[u8]) -> Result<T, DiscoveryError>) -> Self {
        Self {
            method: Method::GET,
            relative_url: relative_url.into(),
            response: f,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClusterGetter<'a> {
    pub id: &'a str,
}

impl<'a> ApiGetter for ClusterGetter<'a> {
    type Output = Cluster;
    fn get(&self) -> Req<Self::Output> {
        Req::get(self.id, Cluster::from_slice)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

/// Maps a non-2xx response to `Remote`, preferring the service's `{"error": {"message"}}` text.
pub fn check_error(status: StatusCode, body: &[u8]) -> Result<(), DiscoveryError> {
    if status.is_success() {
        return Ok(());
    }
    let message = match serde_json::from_slice::<ErrorBody>(body) {
        Ok(body) => body.error.message,
        Err(_) => "unexpected response".to_string(),
    };
    Err(DiscoveryError::Remote { status, message })
}
