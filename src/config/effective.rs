//! Effective configuration with full provenance
//!
//! Captures the merged configuration tree plus where each layer came from.
//! [`EffectiveConfig::settings`] turns the tree into typed [`ToolkitSettings`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;
use crate::validator::{task_policy, MpcRole, ValidationStandards, ValidationStep};

/// Schema version for effective_config
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "pce-toolkit/effective_config@1";

/// Upper bound for `owdl.poll_interval_ms` (10 minutes)
pub const MAX_POLL_INTERVAL_MS: u64 = 600_000;

/// Origin of a configuration source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    Host,
    Repo,
    Cli,
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Effective configuration with full provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub schema_version: u32,
    pub schema_id: String,
    pub created_at: DateTime<Utc>,

    /// The merged configuration object
    pub config: Value,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,
}

/// Workflow runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct OwdlSettings {
    pub runner: String,
    pub poll_interval: Duration,
    pub state_dir: PathBuf,
}

/// Typed view of a validated configuration tree
#[derive(Debug, Clone, PartialEq)]
pub struct ToolkitSettings {
    pub role: MpcRole,
    pub region: String,
    pub skip_steps: Vec<ValidationStep>,
    pub standards: ValidationStandards,
    pub owdl: OwdlSettings,
}

#[derive(Debug, Deserialize)]
struct ConfigTree {
    role: String,
    region: String,
    skip_steps: Vec<String>,
    standards: StandardsTree,
    owdl: OwdlTree,
}

#[derive(Debug, Deserialize)]
struct StandardsTree {
    publisher_vpc_cidr: String,
    partner_vpc_cidr: String,
    firewall_from_port: u16,
    firewall_to_port: u16,
    container_cpu: u32,
    container_memory: u32,
    container_image: String,
}

#[derive(Debug, Deserialize)]
struct OwdlTree {
    runner: String,
    poll_interval_ms: u64,
    state_dir: String,
}

impl EffectiveConfig {
    /// Build effective config from layers.
    ///
    /// Missing files are skipped; unreadable or invalid ones are errors.
    pub fn build(
        host_config_path: Option<&Path>,
        repo_config_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        let files = [
            (ConfigOrigin::Host, host_config_path),
            (ConfigOrigin::Repo, repo_config_path),
        ];
        for (origin, path) in files {
            let Some(path) = path.filter(|p| p.exists()) else {
                continue;
            };
            let (value, digest) = load_toml_file(path)?;
            debug!(origin = ?origin, path = %path.display(), "loaded config layer");
            layers.push(value);
            sources.push(ConfigSource {
                origin,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let config = Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config: merge_layers(layers),
            sources,
        };
        config.settings()?;
        Ok(config)
    }

    /// Typed, bounds-checked settings
    pub fn settings(&self) -> Result<ToolkitSettings, ConfigError> {
        let tree: ConfigTree = serde_json::from_value(self.config.clone())
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        let role = tree.role.parse::<MpcRole>().map_err(invalid)?;
        if tree.region.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "region must not be empty".to_string(),
            ));
        }
        let skip_steps = ValidationStep::parse_list(tree.skip_steps.as_slice()).map_err(invalid)?;

        let s = tree.standards;
        let standards = ValidationStandards {
            publisher_vpc_cidr: s.publisher_vpc_cidr,
            partner_vpc_cidr: s.partner_vpc_cidr,
            firewall_from_port: s.firewall_from_port,
            firewall_to_port: s.firewall_to_port,
            container_cpu: s.container_cpu,
            container_memory: s.container_memory,
            container_image: s.container_image,
            task_policy: task_policy(),
        };
        standards.validate().map_err(invalid)?;

        let poll_ms = tree.owdl.poll_interval_ms;
        if poll_ms == 0 || poll_ms > MAX_POLL_INTERVAL_MS {
            return Err(ConfigError::ValidationError(format!(
                "owdl.poll_interval_ms must be in (0, {}]",
                MAX_POLL_INTERVAL_MS
            )));
        }

        Ok(ToolkitSettings {
            role,
            region: tree.region,
            skip_steps,
            standards,
            owdl: OwdlSettings {
                runner: tree.owdl.runner,
                poll_interval: Duration::from_millis(poll_ms),
                state_dir: PathBuf::from(tree.owdl.state_dir),
            },
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get a config value by dot-separated path
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.config, |current, part| current.get(part))
    }

    pub fn get_u64(&self, path: &str) -> Option<u64> {
        self.get(path).and_then(Value::as_u64)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }
}

fn invalid(err: impl std::fmt::Display) -> ConfigError {
    ConfigError::ValidationError(err.to_string())
}

/// Load and parse a TOML file, returning the value and digest of the raw bytes
fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
    let bytes = fs::read(path)
        .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
    let digest = hex::encode(Sha256::digest(&bytes));

    let contents = String::from_utf8(bytes)
        .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;
    let table: toml::Table = toml::from_str(&contents).map_err(|e| {
        ConfigError::ParseError(format!("{}: TOML parse error: {}", path.display(), e))
    })?;

    Ok((toml_to_json(toml::Value::Table(table)), digest))
}

fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
