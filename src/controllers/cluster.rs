use crate::api::{Cluster, Cpu, EntityRef};
use crate::params::ClusterParams;
use crate::predicates::equal;

use super::controller::EntityModule;

/// Cluster management module.
pub struct ClustersModule {
    params: ClusterParams,
}

impl ClustersModule {
    pub fn new(params: ClusterParams) -> Self {
        Self { params }
    }
}

impl From<&ClusterParams> for Cluster {
    fn from(params: &ClusterParams) -> Self {
        let cpu = match (params.cpu_arch, &params.cpu_type) {
            (None, None) => None,
            (architecture, type_) => Some(Cpu {
                architecture: architecture.map(|a| a.to_string()),
                type_: type_.clone(),
            }),
        };

        Self {
            name: Some(params.name.clone()),
            comment: params.comment.clone(),
            description: params.description.clone(),
            data_center: params.datacenter.as_deref().map(EntityRef::named),
            management_network: params.network.as_deref().map(EntityRef::named),
            cpu,
            version: params.compatibility_version,
            switch_type: params.switch_type.map(|s| s.to_string()),
            ..Default::default()
        }
    }
}

impl EntityModule for ClustersModule {
    type Entity = Cluster;

    fn name(&self) -> &str {
        &self.params.name
    }

    fn build_entity(&self) -> Cluster {
        (&self.params).into()
    }

    // Data center and management network are create-time settings and are not compared.
    fn update_check(&self, entity: &Cluster) -> bool {
        let params = &self.params;
        let cpu = entity.cpu.as_ref();
        let version = entity.version.as_ref();

        equal(params.comment.as_deref(), entity.comment.as_deref())
            && equal(params.description.as_deref(), entity.description.as_deref())
            && equal(
                params.switch_type.map(|s| s.to_string()).as_deref(),
                entity.switch_type.as_deref(),
            )
            && equal(
                params.cpu_arch.map(|a| a.to_string()).as_deref(),
                cpu.and_then(|c| c.architecture.as_deref()),
            )
            && equal(
                params.cpu_type.as_deref(),
                cpu.and_then(|c| c.type_.as_deref()),
            )
            && equal(
                params.compatibility_version.map(|v| v.minor),
                version.map(|v| v.minor),
            )
            && equal(
                params.compatibility_version.map(|v| v.major),
                version.map(|v| v.major),
            )
    }
}
