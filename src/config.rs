use std::{env, fmt, path::PathBuf, time::Duration};

use crate::params::{AuthArgs, ParamResult, ParameterError};

pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// SSO token obtained elsewhere, e.g. by an `ovirt_auth` task.
    Token(String),
    Password { username: String, password: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
            Credentials::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Everything needed to open a session against the engine API.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// API entry point, e.g. `https://engine.example.com/ovirt-engine/api`.
    pub url: String,
    pub credentials: Credentials,
    pub insecure: bool,
    pub ca_file: Option<PathBuf>,
    pub timeout: Duration,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &self.url)
            .field("credentials", &self.credentials)
            .field("insecure", &self.insecure)
            .field("ca_file", &self.ca_file)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ConnectionConfig {
    /// Resolve from module arguments, falling back to `OVIRT_*` environment variables.
    pub fn resolve(auth: Option<&AuthArgs>, timeout: Option<u64>) -> ParamResult<Self> {
        Self::resolve_with(auth, timeout, |key| env::var(key).ok())
    }

    pub fn resolve_with(
        auth: Option<&AuthArgs>,
        timeout: Option<u64>,
        env: impl Fn(&str) -> Option<String>,
    ) -> ParamResult<Self> {
        let empty = AuthArgs::default();
        let auth = auth.unwrap_or(&empty);
        let lookup = |value: &Option<String>, key: &str| {
            value
                .clone()
                .or_else(|| env(key))
                .filter(|v| !v.is_empty())
        };

        let url = lookup(&auth.url, "OVIRT_URL").ok_or(ParameterError::MissingUrl)?;
        let token = lookup(&auth.token, "OVIRT_TOKEN");
        let username = lookup(&auth.username, "OVIRT_USERNAME");
        let password = lookup(&auth.password, "OVIRT_PASSWORD");

        let credentials = match (token, username, password) {
            (Some(token), _, _) => Credentials::Token(token),
            (None, Some(username), Some(password)) => Credentials::Password { username, password },
            _ => return Err(ParameterError::MissingCredentials),
        };

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            credentials,
            insecure: auth.insecure.unwrap_or(false),
            ca_file: auth.ca_file.clone(),
            timeout: Duration::from_secs(timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }

    /// Engine root hosting the SSO endpoints: the API url without its `/api` suffix.
    pub fn sso_base(&self) -> &str {
        self.url.strip_suffix("/api").unwrap_or(&self.url)
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.url, path.trim_start_matches('/'))
    }

    pub fn sso_token_url(&self) -> String {
        format!("{}/sso/oauth/token", self.sso_base())
    }

    pub fn sso_logout_url(&self) -> String {
        format!("{}/services/sso-logout", self.sso_base())
    }
}
