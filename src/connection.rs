//! HTTP session against the engine REST API.

use std::{fs, marker::PhantomData};

use reqwest::{header, Certificate, Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::api::Cluster;
use crate::config::{ConnectionConfig, Credentials};
use crate::service::{Entity, EntityService, RemoteCallError, RemoteResult};

/// Authenticated session. Obtain services through [`Connection::system_service`]
/// and release it with [`Connection::close`].
pub struct Connection {
    config: ConnectionConfig,
    client: Client,
    token: String,
    /// Whether the token was issued for this session rather than handed in.
    owns_token: bool,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("config", &self.config)
            .field("owns_token", &self.owns_token)
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Deserialize)]
struct FaultBody {
    reason: Option<String>,
    detail: Option<String>,
}

impl Connection {
    #[instrument(skip_all, fields(url = %config.url), err)]
    pub async fn connect(config: ConnectionConfig) -> RemoteResult<Self> {
        let client = Self::build_client(&config)?;

        let (token, owns_token) = match &config.credentials {
            Credentials::Token(token) => (token.clone(), false),
            Credentials::Password { username, password } => (
                Self::fetch_token(&client, &config, username, password).await?,
                true,
            ),
        };

        debug!(owns_token, "Connected");
        Ok(Self {
            config,
            client,
            token,
            owns_token,
        })
    }

    fn build_client(config: &ConnectionConfig) -> RemoteResult<Client> {
        let mut builder = Client::builder().timeout(config.timeout);

        if config.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ca_file) = &config.ca_file {
            let pem = fs::read(ca_file).map_err(|e| {
                RemoteCallError::Transport(format!(
                    "Failed to read CA file {}: {e}",
                    ca_file.display()
                ))
            })?;
            builder = builder.add_root_certificate(Certificate::from_pem(&pem)?);
        }

        Ok(builder.build()?)
    }

    async fn fetch_token(
        client: &Client,
        config: &ConnectionConfig,
        username: &str,
        password: &str,
    ) -> RemoteResult<String> {
        let response = client
            .post(config.sso_token_url())
            .header(header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", "password"),
                ("scope", "ovirt-app-api"),
                ("username", username),
                ("password", password),
            ])
            .send()
            .await?;

        let status = response.status();
        let body: TokenResponse = serde_json::from_str(&response.text().await?).map_err(|_| {
            RemoteCallError::Authentication(format!("unexpected SSO response ({status})"))
        })?;

        match body {
            TokenResponse {
                access_token: Some(token),
                ..
            } if status.is_success() => Ok(token),
            TokenResponse {
                error_description: Some(message),
                ..
            }
            | TokenResponse {
                error: Some(message),
                ..
            } => Err(RemoteCallError::Authentication(message)),
            _ => Err(RemoteCallError::Authentication(format!(
                "SSO responded with {status}"
            ))),
        }
    }

    /// Release the session.
    ///
    /// With `logout` the SSO token is revoked, but only when this connection
    /// obtained it; a token handed in belongs to someone else.
    #[instrument(skip(self))]
    pub async fn close(self, logout: bool) {
        if !(logout && self.owns_token) {
            debug!("Closed connection, SSO session kept");
            return;
        }

        let revoke = self
            .client
            .get(self.config.sso_logout_url())
            .query(&[("scope", ""), ("token", self.token.as_str())])
            .send()
            .await;

        match revoke {
            Ok(response) if response.status().is_success() => debug!("Revoked SSO token"),
            Ok(response) => warn!(status = %response.status(), "SSO logout rejected"),
            Err(e) => warn!(error = %e, "SSO logout failed"),
        }
    }

    pub fn system_service(&self) -> SystemService<'_> {
        SystemService { connection: self }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.config.api_url(path))
            .bearer_auth(&self.token)
            .header(header::ACCEPT, "application/json")
            .header("Version", "4")
    }

    async fn execute(&self, request: RequestBuilder) -> RemoteResult<Response> {
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(Self::fault(response).await)
    }

    async fn fault(response: Response) -> RemoteCallError {
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let text = response.text().await.unwrap_or_default();

        match serde_json::from_str::<FaultBody>(&text) {
            Ok(fault) => RemoteCallError::Fault {
                code: status.as_u16(),
                reason: fault.reason.unwrap_or(reason),
                detail: fault.detail.unwrap_or_default(),
            },
            Err(_) => RemoteCallError::Fault {
                code: status.as_u16(),
                reason,
                detail: text,
            },
        }
    }
}

/// Service locator rooted at the API entry point.
pub struct SystemService<'a> {
    connection: &'a Connection,
}

impl<'a> SystemService<'a> {
    pub fn clusters_service(&self) -> CollectionService<'a, Cluster> {
        CollectionService {
            connection: self.connection,
            entity: PhantomData,
        }
    }
}

/// Top-level collection endpoint, e.g. `/clusters`.
pub struct CollectionService<'a, E> {
    connection: &'a Connection,
    entity: PhantomData<E>,
}

impl<E: Entity> CollectionService<'_, E> {
    fn entity_path(id: &str) -> String {
        format!("{}/{id}", E::COLLECTION)
    }
}

impl<E: Entity> EntityService for CollectionService<'_, E> {
    type Entity = E;

    async fn list(&self, search: Option<&str>) -> RemoteResult<Vec<E>> {
        debug!(collection = E::COLLECTION, search, "Listing entities");
        let mut request = self.connection.request(Method::GET, E::COLLECTION);
        if let Some(search) = search {
            request = request.query(&[("search", search)]);
        }

        let body: Value = self.connection.execute(request).await?.json().await?;
        match body {
            Value::Object(mut fields) => match fields.remove(E::ELEMENT) {
                Some(entities) => Ok(serde_json::from_value(entities)?),
                None => Ok(Vec::new()),
            },
            _ => Ok(Vec::new()),
        }
    }

    async fn add(&self, entity: &E) -> RemoteResult<E> {
        let request = self
            .connection
            .request(Method::POST, E::COLLECTION)
            .json(entity);

        Ok(self.connection.execute(request).await?.json().await?)
    }

    async fn update(&self, id: &str, entity: &E) -> RemoteResult<E> {
        let request = self
            .connection
            .request(Method::PUT, &Self::entity_path(id))
            .json(entity);

        Ok(self.connection.execute(request).await?.json().await?)
    }

    async fn remove(&self, id: &str) -> RemoteResult<()> {
        let request = self
            .connection
            .request(Method::DELETE, &Self::entity_path(id));

        self.connection.execute(request).await?;
        Ok(())
    }
}
