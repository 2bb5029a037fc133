//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::owdl::DEFAULT_RUNNER;
use crate::validator::{MpcRole, ValidationStandards};

/// Default interval between container polls (5 seconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;

/// Default directory for persisted workflow instances
pub const DEFAULT_STATE_DIR: &str = ".pce/state";

pub const DEFAULT_REGION: &str = "us-west-2";

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    pub role: MpcRole,
    pub region: String,
    pub skip_steps: Vec<String>,
    pub standards: ValidationStandards,
    pub owdl_runner: String,
    pub owdl_poll_interval_ms: u64,
    pub owdl_state_dir: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            role: MpcRole::Publisher,
            region: DEFAULT_REGION.to_string(),
            skip_steps: Vec::new(),
            standards: ValidationStandards::default(),
            owdl_runner: DEFAULT_RUNNER.to_string(),
            owdl_poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            owdl_state_dir: DEFAULT_STATE_DIR.to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging.
    ///
    /// The task policy document is not configurable and stays out of the tree.
    pub fn to_value(&self) -> Value {
        let s = &self.standards;
        json!({
            "role": self.role.as_str(),
            "region": self.region,
            "skip_steps": self.skip_steps,
            "standards": {
                "publisher_vpc_cidr": s.publisher_vpc_cidr,
                "partner_vpc_cidr": s.partner_vpc_cidr,
                "firewall_from_port": s.firewall_from_port,
                "firewall_to_port": s.firewall_to_port,
                "container_cpu": s.container_cpu,
                "container_memory": s.container_memory,
                "container_image": s.container_image
            },
            "owdl": {
                "runner": self.owdl_runner,
                "poll_interval_ms": self.owdl_poll_interval_ms,
                "state_dir": self.owdl_state_dir
            }
        })
    }
}
