use std::io;

use controllers::SyncError;
use params::ParameterError;
use service::RemoteCallError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    MissingDependency(String),

    #[error("{0}")]
    Parameter(#[from] ParameterError),

    #[error("{0}")]
    Remote(#[from] RemoteCallError),

    #[error("{0}")]
    Sync(#[from] SyncError),

    #[error("Failed to read module arguments: {0}")]
    ArgsRead(#[source] io::Error),

    #[error("Failed to render module result: {0}")]
    Output(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Module entry points used by main
pub mod controller;
pub use crate::controller::*;
pub mod api;
pub mod config;
#[cfg(feature = "sdk")]
pub mod connection;
pub mod controllers;
pub mod output;
pub mod params;
pub mod predicates;
pub mod service;

/// Log and trace integrations
pub mod telemetry;

#[cfg(test)]
pub(crate) mod fixtures;
