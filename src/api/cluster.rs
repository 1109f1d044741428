use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::params::ParameterError;
use crate::service::Entity;

/// Cluster as the engine's REST API represents it.
///
/// The same type is the descriptor sent on add/update and the live entity read
/// back. Sub-objects left as `None` are omitted from the request body, and
/// attributes the engine reports but this crate does not model are kept in
/// `other`, so facts carry the complete record.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Cluster {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_center: Option<EntityRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_network: Option<EntityRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Cpu>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,

    /// Kept as the engine spells it; values are validated on the argument side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch_type: Option<String>,

    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl Entity for Cluster {
    const COLLECTION: &'static str = "clusters";
    const ELEMENT: &'static str = "cluster";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Link to another entity, by name when sent and by id/href when read back.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl EntityRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Cpu {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
}

/// Cluster compatibility version.
///
/// The engine renders integers as JSON strings, so both forms are accepted.
#[serde_as]
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Version {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub major: i32,

    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub minor: i32,
}

impl FromStr for Version {
    type Err = ParameterError;

    /// Parses `major.minor`, splitting on the first dot.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParameterError::InvalidVersion(s.to_string());
        let (major, minor) = s.split_once('.').ok_or_else(invalid)?;

        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Switch types a cluster may be declared with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchType {
    Legacy,
    Ovs,
}

impl FromStr for SwitchType {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legacy" => Ok(Self::Legacy),
            "ovs" => Ok(Self::Ovs),
            _ => Err(ParameterError::InvalidSwitchType(s.to_string())),
        }
    }
}

impl Display for SwitchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Legacy => "legacy",
            Self::Ovs => "ovs",
        })
    }
}

/// CPU architectures a cluster may be declared with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Architecture {
    X86_64,
    Ppc64,
    S390x,
    Undefined,
}

impl FromStr for Architecture {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x86_64" => Ok(Self::X86_64),
            "ppc64" => Ok(Self::Ppc64),
            "s390x" => Ok(Self::S390x),
            "undefined" => Ok(Self::Undefined),
            _ => Err(ParameterError::InvalidArchitecture(s.to_string())),
        }
    }
}

impl Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::X86_64 => "x86_64",
            Self::Ppc64 => "ppc64",
            Self::S390x => "s390x",
            Self::Undefined => "undefined",
        })
    }
}
