use std::path::Path;

use tracing::*;

use crate::api::Cluster;
#[cfg(feature = "sdk")]
use crate::config::ConnectionConfig;
#[cfg(feature = "sdk")]
use crate::connection::Connection;
use crate::controllers::cluster::ClustersModule;
use crate::controllers::controller::Reconciler;
use crate::controllers::facts::list_entities;
use crate::output::ModuleResult;
#[cfg(feature = "sdk")]
use crate::params::{self, ClusterArgs, FactsArgs};
use crate::params::{ClusterParams, FactsParams};
use crate::service::EntityService;
use crate::{Error, Result};

/// Module to run, named the way Ansible knows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Module {
    Clusters,
    ClustersFacts,
}

impl Module {
    /// Resolve a module from the name the binary was invoked as, e.g. through
    /// a `library/ovirt_clusters` symlink.
    pub fn from_program_name(name: &str) -> Option<Self> {
        match name {
            "ovirt_clusters" => Some(Self::Clusters),
            "ovirt_clusters_facts" => Some(Self::ClustersFacts),
            _ => None,
        }
    }

    pub fn subcommand(&self) -> &'static str {
        match self {
            Self::Clusters => "clusters",
            Self::ClustersFacts => "clusters-facts",
        }
    }

    /// Run the module against the argument file, never failing: errors become
    /// a failed result document.
    pub async fn run(self, args: &Path) -> ModuleResult {
        self.execute(args).await.unwrap_or_else(|e| {
            error!(module = self.subcommand(), "{e}");
            ModuleResult::failure(&e)
        })
    }

    #[cfg(feature = "sdk")]
    async fn execute(self, args: &Path) -> Result<ModuleResult> {
        match self {
            Self::Clusters => run_clusters(args).await,
            Self::ClustersFacts => run_clusters_facts(args).await,
        }
    }

    #[cfg(not(feature = "sdk"))]
    async fn execute(self, _args: &Path) -> Result<ModuleResult> {
        check_sdk().map(|_| ModuleResult::default())
    }
}

/// Fails unless the engine client was compiled in.
pub fn check_sdk() -> Result<()> {
    if cfg!(feature = "sdk") {
        Ok(())
    } else {
        Err(Error::MissingDependency(
            "ovirt-clusters was built without the engine client; rebuild with `--features sdk`"
                .to_string(),
        ))
    }
}

/// Reconcile one cluster with its declared state.
pub async fn reconcile_clusters<S>(
    service: &S,
    params: ClusterParams,
    check_mode: bool,
) -> Result<ModuleResult>
where
    S: EntityService<Entity = Cluster>,
{
    let state = params.state;
    let outcome = Reconciler::new(service)
        .check_mode(check_mode)
        .reconcile(&ClustersModule::new(params), state)
        .await?;

    Ok(ModuleResult::from_outcome(outcome)?)
}

/// Gather facts about clusters, always reporting no change.
pub async fn gather_clusters_facts<S>(service: &S, params: &FactsParams) -> Result<ModuleResult>
where
    S: EntityService<Entity = Cluster>,
{
    let clusters = list_entities(service, params).await?;
    Ok(ModuleResult::facts(clusters)?)
}

/// Cluster module entry point: validate arguments, connect, reconcile, close.
#[cfg(feature = "sdk")]
pub async fn run_clusters(args: &Path) -> Result<ModuleResult> {
    check_sdk()?;
    let args: ClusterArgs = params::load(args)?;
    let params = ClusterParams::try_from(&args)?;
    let config = ConnectionConfig::resolve(args.auth.as_ref(), args.timeout)?;
    let check_mode = args.check_mode.unwrap_or(false);

    let connection = Connection::connect(config).await?;
    let result = reconcile_clusters(
        &connection.system_service().clusters_service(),
        params,
        check_mode,
    )
    .await;

    // Keep the SSO session, tokens may be shared between tasks.
    connection.close(false).await;
    result
}

/// Facts module entry point.
#[cfg(feature = "sdk")]
pub async fn run_clusters_facts(args: &Path) -> Result<ModuleResult> {
    check_sdk()?;
    let args: FactsArgs = params::load(args)?;
    let params = FactsParams::from(&args);
    let config = ConnectionConfig::resolve(args.auth.as_ref(), args.timeout)?;

    let connection = Connection::connect(config).await?;
    let result =
        gather_clusters_facts(&connection.system_service().clusters_service(), &params).await;

    connection.close(false).await;
    result
}
