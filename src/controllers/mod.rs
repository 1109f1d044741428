use thiserror::Error;

use crate::service::RemoteCallError;

pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Reconciliation failures, tagged with the step that failed.
///
/// Each displays the engine's message unchanged.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("{0}")]
    Lookup(#[source] RemoteCallError),

    #[error("{0}")]
    Create(#[source] RemoteCallError),

    #[error("{0}")]
    Update(#[source] RemoteCallError),

    #[error("{0}")]
    Remove(#[source] RemoteCallError),

    #[error("Entity `{0}` was reported by the engine without an id")]
    MissingId(String),
}

pub mod cluster;
pub mod controller;
pub mod facts;
