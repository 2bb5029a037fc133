//! A single OWDL state definition.

use serde::{Deserialize, Serialize};

/// Immutable step definition.
///
/// One container is launched per entry of `cmd_args_list`. When `end` is set
/// the workflow completes after this state, even if `next` is also present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OwdlState {
    /// State kind; only "Task" is dispatched today.
    #[serde(rename = "Type")]
    pub state_type: String,

    /// Task definition the containers are launched from.
    pub container_definition: String,

    /// OneDocker package to run.
    pub package_name: String,

    /// Arguments for each container; one container per entry.
    pub cmd_args_list: Vec<String>,

    /// Per-container timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,

    #[serde(default)]
    pub end: bool,

    /// Package version; the runner picks its default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// How many times a failed run of this state may be retried.
    #[serde(default)]
    pub retry_count: u32,
}

impl OwdlState {
    /// Name of the state that follows this one, if the workflow continues.
    pub fn successor(&self) -> Option<&str> {
        if self.end {
            None
        } else {
            self.next.as_deref()
        }
    }
}
