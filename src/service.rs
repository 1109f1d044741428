use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

pub type RemoteResult<T> = std::result::Result<T, RemoteCallError>;

/// Failures reported by, or on the way to, the management engine.
#[derive(Error, Debug)]
pub enum RemoteCallError {
    #[error("Fault reason is \"{reason}\". Fault detail is \"{detail}\". HTTP response code is {code}.")]
    Fault {
        code: u16,
        reason: String,
        detail: String,
    },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("{0}")]
    Transport(String),

    #[error("Failed to decode engine response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[cfg(feature = "sdk")]
impl From<reqwest::Error> for RemoteCallError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// An entity type exposed by the engine as a top-level collection.
pub trait Entity: Serialize + DeserializeOwned + Clone + Debug {
    /// Collection path below the API root, e.g. `clusters`.
    const COLLECTION: &'static str;
    /// Key wrapping the entities of a collection listing, e.g. `cluster`.
    const ELEMENT: &'static str;

    fn id(&self) -> Option<&str>;
    fn name(&self) -> Option<&str>;
}

/// Collection endpoint of one entity type.
///
/// The reconciler and the fact lister only ever see this trait, so they run
/// unchanged against the HTTP connection or an in-memory double.
#[allow(async_fn_in_trait)]
pub trait EntityService {
    type Entity: Entity;

    /// List entities, optionally restricted by an engine search query.
    async fn list(&self, search: Option<&str>) -> RemoteResult<Vec<Self::Entity>>;
    async fn add(&self, entity: &Self::Entity) -> RemoteResult<Self::Entity>;
    async fn update(&self, id: &str, entity: &Self::Entity) -> RemoteResult<Self::Entity>;
    async fn remove(&self, id: &str) -> RemoteResult<()>;
}

/// Engine search query matching entity names against `pattern`.
pub fn name_query(pattern: &str) -> String {
    if pattern.chars().any(char::is_whitespace) {
        format!("name=\"{pattern}\"")
    } else {
        format!("name={pattern}")
    }
}

/// Look up the entity whose name is exactly `name`.
pub async fn search_by_name<S: EntityService>(
    service: &S,
    name: &str,
) -> RemoteResult<Option<S::Entity>> {
    let found = service
        .list(Some(&name_query(name)))
        .await?
        .into_iter()
        .find(|entity| entity.name() == Some(name));

    debug!(name, found = found.is_some(), "Searched entity by name");
    Ok(found)
}
