use crate::{
    error::ErrorKind,
    kubeconfig::{ExecConfig, ExecEnvVar},
};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, InvalidHeaderValue};
use serde::Deserialize;
use std::{
    fmt::{self},
    io,
    process::ExitStatus,
};
use tokio::process::Command;

pub const EXEC_API_VERSION: &str = "client.authentication.k8s.io/v1beta1";
const PROFILE_ENV: &str = "AWS_PROFILE";

/// Short-lived credential attached to discovery requests.
#[derive(Clone, PartialEq)]
pub struct Bearer(String);

impl Bearer {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self(token.into())
    }

    pub fn header_value(&self) -> Result<HeaderValue, TokenError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0)).map_err(TokenError::InvalidToken)?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for Bearer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Bearer(<redacted>)")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Could not run \"{}\": {}", program, err)]
    Spawn { program: String, err: io::Error },
    #[error("\"{}\" exited with {}: {}", program, status, stderr)]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("Could not decode credential from \"{}\": {}", program, err)]
    Decode { program: String, err: serde_json::Error },
    #[error("\"{}\" returned an empty token", _0)]
    Empty(String),
    #[error("Invalid token: {}", _0)]
    InvalidToken(InvalidHeaderValue),
}

impl TokenError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Credential
    }
}

/// Produces credentials for a cloud profile. Injected into the discovery client so tests can
/// substitute a deterministic implementation.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self, profile: &str) -> Result<Bearer, TokenError>;

    /// The kubeconfig `exec` block that lets kubectl mint its own credential for `cluster_id`.
    fn credential_reference(&self, cluster_id: &str, profile: &str) -> ExecConfig;
}

#[derive(Debug, Deserialize)]
struct ExecCredential {
    status: ExecCredentialStatus,
}

#[derive(Debug, Deserialize)]
struct ExecCredentialStatus {
    #[serde(default)]
    token: String,
}

/// Shells out to `aws-iam-authenticator token -i <audience>` and reads the token from the
/// returned `ExecCredential`.
#[derive(Debug, Clone)]
pub struct IamAuthenticator {
    program: String,
    args: Vec<String>,
    audience: String,
}

impl IamAuthenticator {
    pub const PROGRAM: &'static str = "aws-iam-authenticator";

    pub fn new<S: Into<String>>(audience: S) -> Self {
        Self::with_command(Self::PROGRAM, Vec::new(), audience)
    }

    /// `args` are placed before the `token -i <id>` arguments.
    pub fn with_command<P: Into<String>, S: Into<String>>(program: P, args: Vec<String>, audience: S) -> Self {
        Self {
            program: program.into(),
            args,
            audience: audience.into(),
        }
    }

    fn token_args(&self, cluster_id: &str) -> Vec<String> {
        let mut args = self.args.clone();
        args.extend(["token", "-i", cluster_id].iter().map(|arg| arg.to_string()));
        args
    }
}

impl Default for IamAuthenticator {
    fn default() -> Self {
        Self::new("pharos")
    }
}

#[async_trait]
impl TokenProvider for IamAuthenticator {
    async fn token(&self, profile: &str) -> Result<Bearer, TokenError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.token_args(&self.audience));
        if !profile.is_empty() {
            cmd.env(PROFILE_ENV, profile);
        }
        let output = cmd.output().await.map_err(|err| TokenError::Spawn {
            program: self.program.clone(),
            err,
        })?;
        if !output.status.success() {
            return Err(TokenError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let credential: ExecCredential = serde_json::from_slice(&output.stdout).map_err(|err| TokenError::Decode {
            program: self.program.clone(),
            err,
        })?;
        if credential.status.token.is_empty() {
            return Err(TokenError::Empty(self.program.clone()));
        }
        Ok(Bearer::new(credential.status.token))
    }

    fn credential_reference(&self, cluster_id: &str, profile: &str) -> ExecConfig {
        let env = if profile.is_empty() {
            None
        } else {
            Some(vec![ExecEnvVar {
                name: PROFILE_ENV.to_string(),
                value: profile.to_string(),
            }])
        };
        ExecConfig {
            api_version: EXEC_API_VERSION.to_string(),
            command: self.program.clone(),
            args: Some(self.token_args(cluster_id)),
            env,
            other: Default::default(),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Hands out the same token for every profile.
    pub struct StaticToken(pub &'static str);

    #[async_trait]
    impl TokenProvider for StaticToken {
        async fn token(&self, _profile: &str) -> Result<Bearer, TokenError> {
            Ok(Bearer::new(self.0))
        }

        fn credential_reference(&self, cluster_id: &str, profile: &str) -> ExecConfig {
            ExecConfig {
                api_version: EXEC_API_VERSION.to_string(),
                command: "static-token".to_string(),
                args: Some(vec![cluster_id.to_string()]),
                env: Some(vec![ExecEnvVar {
                    name: PROFILE_ENV.to_string(),
                    value: profile.to_string(),
                }]),
                other: Default::default(),
            }
        }
    }

    pub struct NoToken;

    #[async_trait]
    impl TokenProvider for NoToken {
        async fn token(&self, _profile: &str) -> Result<Bearer, TokenError> {
            Err(TokenError::Empty("no-token".to_string()))
        }

        fn credential_reference(&self, cluster_id: &str, profile: &str) -> ExecConfig {
            StaticToken("").credential_reference(cluster_id, profile)
        }
    }
}
