//! Configuration merge system
//!
//! Four layers, last wins:
//! 1. Built-in defaults
//! 2. Host/user config (~/.config/pce/toolkit.toml)
//! 3. Repo config (.pce/toolkit.toml)
//! 4. CLI flags

mod defaults;
mod effective;
mod merge;

use std::env;
use std::path::PathBuf;

pub use defaults::{BuiltinDefaults, DEFAULT_POLL_INTERVAL_MS, DEFAULT_REGION, DEFAULT_STATE_DIR};
pub use effective::{
    ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig, OwdlSettings, ToolkitSettings,
    MAX_POLL_INTERVAL_MS, SCHEMA_ID, SCHEMA_VERSION,
};
pub use merge::{deep_merge, merge_layers};

/// Repo config path, relative to the working directory
pub const REPO_CONFIG_PATH: &str = ".pce/toolkit.toml";

/// Host config path, `None` when neither `XDG_CONFIG_HOME` nor `HOME` is set
pub fn host_config_path() -> Option<PathBuf> {
    let base = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("pce").join("toolkit.toml"))
}
