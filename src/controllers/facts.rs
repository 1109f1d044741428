use tracing::{debug, instrument};

use crate::params::FactsParams;
use crate::service::{name_query, EntityService, RemoteResult};
use crate::telemetry;

/// List the entities matching the name glob, or all of them.
#[instrument(skip_all, fields(trace_id = %telemetry::get_trace_id(), pattern = params.pattern.as_deref()), err)]
pub async fn list_entities<S: EntityService>(
    service: &S,
    params: &FactsParams,
) -> RemoteResult<Vec<S::Entity>> {
    let search = params.pattern.as_deref().map(name_query);
    let entities = service.list(search.as_deref()).await?;

    debug!(count = entities.len(), "Listed entities");
    Ok(entities)
}
