//! Module argument documents.
//!
//! Ansible hands a binary module the path of a JSON file holding every
//! argument the task set, plus its own `_ansible_*` internals. The raw
//! documents here mirror that file; the `*Params` types are the validated
//! forms the reconciler works with.

use std::{fmt, fs, path::Path, path::PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::api::{Architecture, SwitchType, Version};
use crate::Result;

pub type ParamResult<T> = std::result::Result<T, ParameterError>;

#[derive(Error, Debug)]
pub enum ParameterError {
    #[error("Parameter 'name' is required to specify the entity.")]
    MissingName,

    #[error("Invalid compatibility version format '{0}', expected 'major.minor'")]
    InvalidVersion(String),

    #[error("Invalid switch type '{0}', expected one of: legacy, ovs")]
    InvalidSwitchType(String),

    #[error("Invalid CPU architecture '{0}', expected one of: x86_64, ppc64, s390x, undefined")]
    InvalidArchitecture(String),

    #[error("Parameter 'auth.url' is required (or set OVIRT_URL)")]
    MissingUrl,

    #[error("Either 'auth.token' or both 'auth.username' and 'auth.password' are required")]
    MissingCredentials,

    #[error("Invalid module arguments: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Read and decode a module argument file.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).map_err(crate::Error::ArgsRead)?;
    Ok(serde_json::from_str(&raw).map_err(ParameterError::Malformed)?)
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum State {
    #[default]
    Present,
    Absent,
}

/// Connection arguments shared by every module.
#[derive(Deserialize, Clone, Default)]
pub struct AuthArgs {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub insecure: Option<bool>,
    #[serde(default)]
    pub ca_file: Option<PathBuf>,
}

impl fmt::Debug for AuthArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthArgs")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("insecure", &self.insecure)
            .field("ca_file", &self.ca_file)
            .finish()
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct ClusterArgs {
    #[serde(default)]
    pub state: State,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub datacenter: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub cpu_arch: Option<String>,
    #[serde(default)]
    pub cpu_type: Option<String>,
    #[serde(default)]
    pub switch_type: Option<String>,
    /// YAML turns `4.0` into a float, so numbers are accepted too.
    #[serde(default, deserialize_with = "string_or_number")]
    pub compatibility_version: Option<String>,
    #[serde(default)]
    pub auth: Option<AuthArgs>,
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default, rename = "_ansible_check_mode")]
    pub check_mode: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
pub struct FactsArgs {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub auth: Option<AuthArgs>,
    #[serde(default)]
    pub timeout: Option<u64>,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Null) | None => None,
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected a string or a number, got {other}"
            )))
        }
    })
}

/// Validated cluster module parameters.
///
/// Empty strings for reference and enum fields count as unset; `comment` and
/// `description` keep them so a caller can clear the remote value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClusterParams {
    pub state: State,
    pub name: String,
    pub datacenter: Option<String>,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub network: Option<String>,
    pub cpu_arch: Option<Architecture>,
    pub cpu_type: Option<String>,
    pub switch_type: Option<SwitchType>,
    pub compatibility_version: Option<Version>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl TryFrom<&ClusterArgs> for ClusterParams {
    type Error = ParameterError;

    fn try_from(args: &ClusterArgs) -> ParamResult<Self> {
        let name = non_empty(&args.name).ok_or(ParameterError::MissingName)?;

        Ok(Self {
            state: args.state,
            name: name.to_string(),
            datacenter: non_empty(&args.datacenter).map(str::to_string),
            description: args.description.clone(),
            comment: args.comment.clone(),
            network: non_empty(&args.network).map(str::to_string),
            cpu_arch: non_empty(&args.cpu_arch)
                .map(str::parse::<Architecture>)
                .transpose()?,
            cpu_type: non_empty(&args.cpu_type).map(str::to_string),
            switch_type: non_empty(&args.switch_type)
                .map(str::parse::<SwitchType>)
                .transpose()?,
            compatibility_version: non_empty(&args.compatibility_version)
                .map(str::parse::<Version>)
                .transpose()?,
        })
    }
}

/// Validated facts module parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FactsParams {
    /// Name glob, e.g. `production*`.
    pub pattern: Option<String>,
}

impl From<&FactsArgs> for FactsParams {
    fn from(args: &FactsArgs) -> Self {
        Self {
            pattern: non_empty(&args.name).map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use serde_json::json;

    use super::*;

    fn args(value: Value) -> ClusterArgs {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn cluster_args_ignore_ansible_internals() {
        let args = args(json!({
            "name": "mycluster",
            "state": "absent",
            "_ansible_check_mode": true,
            "_ansible_no_log": false,
            "_ansible_module_name": "ovirt_clusters",
        }));

        assert_eq!(State::Absent, args.state);
        assert_eq!(Some(true), args.check_mode);
    }

    #[test]
    fn compatibility_version_accepts_yaml_floats() {
        let params = ClusterParams::try_from(&args(json!({
            "name": "mycluster",
            "compatibility_version": 4.0,
        })))
        .unwrap();

        assert_eq!(
            Some(Version { major: 4, minor: 0 }),
            params.compatibility_version
        );
    }

    #[test]
    fn null_arguments_are_unset() {
        let params = ClusterParams::try_from(&args(json!({
            "name": "mycluster",
            "datacenter": null,
            "compatibility_version": null,
            "auth": null,
            "timeout": null,
        })))
        .unwrap();

        assert_eq!(None, params.datacenter);
        assert_eq!(None, params.compatibility_version);
    }

    #[test]
    fn name_is_required() {
        for value in [json!({}), json!({"name": ""}), json!({"name": null})] {
            assert!(matches!(
                ClusterParams::try_from(&args(value)),
                Err(ParameterError::MissingName)
            ));
        }
    }

    #[test]
    fn malformed_values_are_parameter_errors() {
        assert!(matches!(
            ClusterParams::try_from(&args(json!({"name": "c", "compatibility_version": "4"}))),
            Err(ParameterError::InvalidVersion(_))
        ));
        assert!(matches!(
            ClusterParams::try_from(&args(json!({"name": "c", "compatibility_version": "4.x"}))),
            Err(ParameterError::InvalidVersion(_))
        ));
        assert!(matches!(
            ClusterParams::try_from(&args(json!({"name": "c", "switch_type": "bridge"}))),
            Err(ParameterError::InvalidSwitchType(_))
        ));
        assert!(matches!(
            ClusterParams::try_from(&args(json!({"name": "c", "cpu_arch": "arm"}))),
            Err(ParameterError::InvalidArchitecture(_))
        ));
    }

    #[test]
    fn empty_optional_strings_count_as_unset() {
        let params = ClusterParams::try_from(&args(json!({
            "name": "mycluster",
            "datacenter": "",
            "cpu_type": "",
            "switch_type": "",
            "comment": "",
        })))
        .unwrap();

        assert_eq!(None, params.datacenter);
        assert_eq!(None, params.cpu_type);
        assert_eq!(None, params.switch_type);
        assert_eq!(Some(String::new()), params.comment);
    }

    #[test]
    fn load_reads_argument_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "web*", "_ansible_verbosity": 0}}"#).unwrap();

        let args: FactsArgs = load(file.path()).unwrap();
        assert_eq!(
            Some("web*".to_string()),
            FactsParams::from(&args).pattern
        );
    }

    #[test]
    fn load_reports_malformed_documents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "c", "state": "running"}}"#).unwrap();

        let err = load::<ClusterArgs>(file.path()).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Parameter(ParameterError::Malformed(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load::<ClusterArgs>(&dir.path().join("args")).unwrap_err();
        assert!(matches!(err, crate::Error::ArgsRead(_)));
    }

    #[test]
    fn auth_debug_redacts_secrets() {
        let auth = AuthArgs {
            username: Some("admin@internal".to_string()),
            password: Some("secret".to_string()),
            token: Some("t0ken".to_string()),
            ..Default::default()
        };

        let debug = format!("{auth:?}");
        assert!(debug.contains("admin@internal"));
        assert!(!debug.contains("secret"));
        assert!(!debug.contains("t0ken"));
    }
}
