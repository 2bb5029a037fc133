//! Container instances launched by the orchestration service

use serde::{Deserialize, Serialize};

/// Status of a single container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContainerInstanceStatus {
    /// Not yet known (provisioning, or lookup gave no answer)
    Unknown,
    Started,
    Completed,
    Failed,
}

impl ContainerInstanceStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Handle to a launched container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInstance {
    pub instance_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    pub status: ContainerInstanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl ContainerInstance {
    pub fn new(instance_id: impl Into<String>, status: ContainerInstanceStatus) -> Self {
        Self {
            instance_id: instance_id.into(),
            ip_address: None,
            status,
            exit_code: None,
        }
    }
}
