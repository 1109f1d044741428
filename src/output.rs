use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;
use serde_json::Value;

use crate::controllers::controller::Outcome;
use crate::service::Entity;

/// Document a module prints on stdout for Ansible.
#[derive(Serialize, Debug, Default, PartialEq)]
pub struct ModuleResult {
    pub changed: bool,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The managed entity, keyed by its element name (`cluster`).
    #[serde(flatten)]
    pub entity: BTreeMap<String, Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ansible_facts: Option<BTreeMap<String, Value>>,
}

impl ModuleResult {
    pub fn from_outcome<E: Entity>(outcome: Outcome<E>) -> serde_json::Result<Self> {
        let mut result = Self {
            changed: outcome.changed,
            ..Default::default()
        };

        if let Some(entity) = outcome.entity {
            result.id = entity.id().map(str::to_string);
            result
                .entity
                .insert(E::ELEMENT.to_string(), serde_json::to_value(entity)?);
        }

        Ok(result)
    }

    /// Facts under `ovirt_<collection>`, e.g. `ovirt_clusters`.
    pub fn facts<E: Entity>(entities: Vec<E>) -> serde_json::Result<Self> {
        let key = format!("ovirt_{}", E::COLLECTION);
        let facts = [(key, serde_json::to_value(entities)?)].into();

        Ok(Self {
            ansible_facts: Some(facts),
            ..Default::default()
        })
    }

    pub fn failure(error: &impl Display) -> Self {
        Self {
            failed: true,
            msg: Some(error.to_string()),
            ..Default::default()
        }
    }
}
