//! In-memory engine used by reconciler and fact lister tests.

use std::sync::Mutex;

use crate::api::{Cluster, Cpu};
use crate::service::{EntityService, RemoteCallError, RemoteResult};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    List(Option<String>),
    Add(Cluster),
    Update(String, Cluster),
    Remove(String),
}

#[derive(Default)]
pub struct MockClusters {
    clusters: Mutex<Vec<Cluster>>,
    calls: Mutex<Vec<Call>>,
    next_id: Mutex<u32>,
    /// When set, every mutating call fails with this fault.
    fault: Mutex<Option<(u16, String)>>,
}

pub fn cluster(name: &str) -> Cluster {
    Cluster {
        id: Some(format!("id-{name}")),
        name: Some(name.to_string()),
        ..Default::default()
    }
}

impl MockClusters {
    pub fn with(clusters: Vec<Cluster>) -> Self {
        Self {
            clusters: Mutex::new(clusters),
            ..Default::default()
        }
    }

    pub fn failing_mutations(self, code: u16, detail: &str) -> Self {
        *self.fault.lock().unwrap() = Some((code, detail.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::List(_)))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn clusters(&self) -> Vec<Cluster> {
        self.clusters.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> RemoteResult<()> {
        let mutation = !matches!(call, Call::List(_));
        self.calls.lock().unwrap().push(call);
        match self.fault.lock().unwrap().clone() {
            Some((code, detail)) if mutation => Err(RemoteCallError::Fault {
                code,
                reason: "Operation Failed".to_string(),
                detail,
            }),
            _ => Ok(()),
        }
    }
}

/// Case-insensitive `name=<glob>` matching, with `*` as the only wildcard.
fn matches_search(search: Option<&str>, name: &str) -> bool {
    let Some(pattern) = search.and_then(|s| s.strip_prefix("name=")) else {
        return true;
    };
    let pattern = pattern.trim_matches('"').to_lowercase();
    let name = name.to_lowercase();

    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or_default();
    let Some(mut rest) = name.strip_prefix(first) else {
        return false;
    };
    let parts: Vec<&str> = parts.collect();
    if parts.is_empty() {
        return rest.is_empty();
    }
    for (i, part) in parts.iter().enumerate() {
        if i == parts.len() - 1 {
            return rest.ends_with(part);
        }
        match rest.find(part) {
            Some(at) => rest = &rest[at + part.len()..],
            None => return false,
        }
    }
    true
}

/// Apply the attributes an update carries, the way the engine does.
fn apply(target: &mut Cluster, update: &Cluster) {
    macro_rules! set {
        ($($field:ident),*) => {
            $(if update.$field.is_some() {
                target.$field = update.$field.clone();
            })*
        };
    }
    set!(name, description, comment, data_center, management_network, version, switch_type);

    if let Some(cpu) = &update.cpu {
        let current = target.cpu.get_or_insert_with(Cpu::default);
        if cpu.architecture.is_some() {
            current.architecture = cpu.architecture.clone();
        }
        if cpu.type_.is_some() {
            current.type_ = cpu.type_.clone();
        }
    }
}

impl EntityService for MockClusters {
    type Entity = Cluster;

    async fn list(&self, search: Option<&str>) -> RemoteResult<Vec<Cluster>> {
        self.record(Call::List(search.map(str::to_string)))?;
        Ok(self
            .clusters()
            .into_iter()
            .filter(|c| matches_search(search, c.name.as_deref().unwrap_or_default()))
            .collect())
    }

    async fn add(&self, entity: &Cluster) -> RemoteResult<Cluster> {
        self.record(Call::Add(entity.clone()))?;
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;

        let mut created = Cluster {
            id: Some(format!("generated-{next_id}")),
            ..Default::default()
        };
        apply(&mut created, entity);
        self.clusters.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, entity: &Cluster) -> RemoteResult<Cluster> {
        self.record(Call::Update(id.to_string(), entity.clone()))?;
        let mut clusters = self.clusters.lock().unwrap();
        let target = clusters
            .iter_mut()
            .find(|c| c.id.as_deref() == Some(id))
            .ok_or_else(|| RemoteCallError::Fault {
                code: 404,
                reason: "Not Found".to_string(),
                detail: String::new(),
            })?;
        apply(target, entity);
        Ok(target.clone())
    }

    async fn remove(&self, id: &str) -> RemoteResult<()> {
        self.record(Call::Remove(id.to_string()))?;
        self.clusters
            .lock()
            .unwrap()
            .retain(|c| c.id.as_deref() != Some(id));
        Ok(())
    }
}

#[test]
fn search_globs() {
    assert!(matches_search(None, "anything"));
    assert!(matches_search(Some("name=prod"), "Prod"));
    assert!(!matches_search(Some("name=prod"), "prod-east"));
    assert!(matches_search(Some("name=prod*"), "prod-east"));
    assert!(matches_search(Some("name=*east"), "prod-east"));
    assert!(matches_search(Some("name=p*d-*t"), "prod-east"));
    assert!(matches_search(Some("name=\"my cluster\""), "my cluster"));
    assert!(!matches_search(Some("name=web*"), "prod-east"));
}
