use tracing::{debug, info, instrument};

use crate::params::State;
use crate::service::{search_by_name, Entity, EntityService};
use crate::telemetry;

use super::{SyncError, SyncResult};

/// Maps declared parameters onto one entity type.
pub trait EntityModule {
    type Entity: Entity;

    /// Name identifying the entity on the engine.
    fn name(&self) -> &str;

    /// Descriptor submitted on create and update.
    fn build_entity(&self) -> Self::Entity;

    /// True when `entity` already satisfies every declared attribute.
    fn update_check(&self, entity: &Self::Entity) -> bool;
}

/// Result of one reconciliation.
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome<E> {
    pub changed: bool,
    /// The entity as the engine reports it after the run, when there is one.
    pub entity: Option<E>,
}

impl<E> Outcome<E> {
    fn changed(entity: Option<E>) -> Self {
        Self {
            changed: true,
            entity,
        }
    }

    fn unchanged(entity: Option<E>) -> Self {
        Self {
            changed: false,
            entity,
        }
    }
}

/// Converges one entity on a collection endpoint to its declared state.
///
/// Every remote failure is returned as is; nothing is retried or rolled back.
pub struct Reconciler<'a, S> {
    service: &'a S,
    check_mode: bool,
}

impl<'a, S: EntityService> Reconciler<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self {
            service,
            check_mode: false,
        }
    }

    /// Decide as usual but skip add, update and remove calls.
    pub fn check_mode(self, check_mode: bool) -> Self {
        Self { check_mode, ..self }
    }

    pub async fn reconcile<M>(&self, module: &M, state: State) -> SyncResult<Outcome<S::Entity>>
    where
        M: EntityModule<Entity = S::Entity>,
    {
        match state {
            State::Present => self.present(module).await,
            State::Absent => self.absent(module).await,
        }
    }

    #[instrument(skip_all, fields(trace_id = %telemetry::get_trace_id(), name = module.name(), check_mode = self.check_mode), err)]
    pub async fn present<M>(&self, module: &M) -> SyncResult<Outcome<S::Entity>>
    where
        M: EntityModule<Entity = S::Entity>,
    {
        let existing = search_by_name(self.service, module.name())
            .await
            .map_err(SyncError::Lookup)?;

        let Some(entity) = existing else {
            return self.create(module).await;
        };

        if module.update_check(&entity) {
            debug!("Entity matches declared state");
            return Ok(Outcome::unchanged(Some(entity)));
        }

        self.update(module, entity).await
    }

    #[instrument(skip_all, fields(trace_id = %telemetry::get_trace_id(), name = module.name(), check_mode = self.check_mode), err)]
    pub async fn absent<M>(&self, module: &M) -> SyncResult<Outcome<S::Entity>>
    where
        M: EntityModule<Entity = S::Entity>,
    {
        let existing = search_by_name(self.service, module.name())
            .await
            .map_err(SyncError::Lookup)?;

        let Some(entity) = existing else {
            debug!("Entity already absent");
            return Ok(Outcome::unchanged(None));
        };

        let id = entity_id(module, &entity)?;
        if self.check_mode {
            info!(id = %id, "Would remove entity");
        } else {
            self.service.remove(&id).await.map_err(SyncError::Remove)?;
            info!(id = %id, "Removed entity");
        }

        Ok(Outcome::changed(Some(entity)))
    }

    async fn create<M>(&self, module: &M) -> SyncResult<Outcome<S::Entity>>
    where
        M: EntityModule<Entity = S::Entity>,
    {
        if self.check_mode {
            info!("Would create entity");
            return Ok(Outcome::changed(None));
        }

        let created = self
            .service
            .add(&module.build_entity())
            .await
            .map_err(SyncError::Create)?;

        info!(id = created.id(), "Created entity");
        Ok(Outcome::changed(Some(created)))
    }

    async fn update<M>(&self, module: &M, entity: S::Entity) -> SyncResult<Outcome<S::Entity>>
    where
        M: EntityModule<Entity = S::Entity>,
    {
        let id = entity_id(module, &entity)?;
        if self.check_mode {
            info!(id = %id, "Would update entity");
            return Ok(Outcome::changed(Some(entity)));
        }

        let updated = self
            .service
            .update(&id, &module.build_entity())
            .await
            .map_err(SyncError::Update)?;

        info!(id = %id, "Updated entity");
        Ok(Outcome::changed(Some(updated)))
    }
}

fn entity_id<M: EntityModule>(module: &M, entity: &M::Entity) -> SyncResult<String> {
    entity
        .id()
        .map(str::to_string)
        .ok_or_else(|| SyncError::MissingId(module.name().to_string()))
}
