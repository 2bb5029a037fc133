//! Workflow and state instances
//!
//! Status: CREATED → STARTED → {COMPLETED | FAILED | CANCELLED}, tracked for
//! the workflow as a whole and for every state run.

use std::fmt;

use chrono::{DateTime, Utc};
use owdl_model::{OwdlState, OwdlWorkflow};
use pce_entities::{ContainerInstance, ContainerInstanceStatus};
use serde::{Deserialize, Serialize};

/// Schema version for persisted workflow instances
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "pce-toolkit/owdl_workflow_instance@1";

/// Workflow or state status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwdlStatus {
    Created,
    Started,
    Failed,
    Completed,
    Cancelled,
}

impl OwdlStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OwdlStatus::Failed | OwdlStatus::Completed | OwdlStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OwdlStatus::Created => "CREATED",
            OwdlStatus::Started => "STARTED",
            OwdlStatus::Failed => "FAILED",
            OwdlStatus::Completed => "COMPLETED",
            OwdlStatus::Cancelled => "CANCELLED",
        }
    }

    /// Status of a state run given its containers.
    ///
    /// Any failed container fails the state; any unresolved container keeps it
    /// STARTED; otherwise every container completed. A state with no
    /// containers never ran and counts as FAILED.
    pub fn from_containers(containers: &[ContainerInstance]) -> Self {
        if containers.is_empty() {
            return OwdlStatus::Failed;
        }
        if containers
            .iter()
            .any(|c| c.status == ContainerInstanceStatus::Failed)
        {
            OwdlStatus::Failed
        } else if containers.iter().any(|c| !c.status.is_terminal()) {
            OwdlStatus::Started
        } else {
            OwdlStatus::Completed
        }
    }
}

impl fmt::Display for OwdlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One run of one state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwdlStateInstance {
    pub state_name: String,
    /// Definition the containers were launched from
    pub owdl_state: OwdlState,
    pub containers: Vec<ContainerInstance>,
    pub status: OwdlStatus,
    /// 0 for the first run, incremented on every retry
    pub retry_num: u32,
    pub started_at: DateTime<Utc>,
}

impl OwdlStateInstance {
    pub fn new(
        state_name: impl Into<String>,
        owdl_state: OwdlState,
        containers: Vec<ContainerInstance>,
        retry_num: u32,
    ) -> Self {
        let status = OwdlStatus::from_containers(&containers);
        Self {
            state_name: state_name.into(),
            owdl_state,
            containers,
            status,
            retry_num,
            started_at: Utc::now(),
        }
    }

    pub fn container_ids(&self) -> Vec<String> {
        self.containers
            .iter()
            .map(|c| c.instance_id.clone())
            .collect()
    }

    /// Recompute the status from the containers.
    ///
    /// Only a STARTED state moves; CANCELLED and resolved states stay put.
    pub fn refresh_status(&mut self) {
        if self.status == OwdlStatus::Started {
            self.status = OwdlStatus::from_containers(&self.containers);
        }
    }

    /// Whether a FAILED run has used up the state's retries
    pub fn retries_exhausted(&self) -> bool {
        self.status == OwdlStatus::Failed && self.retry_num >= self.owdl_state.retry_count
    }
}

/// One run of a workflow, with the full history of state runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwdlWorkflowInstance {
    pub schema_version: u32,
    pub schema_id: String,
    pub instance_id: String,
    pub pce_id: String,
    pub owdl_workflow: OwdlWorkflow,
    /// Append-only; the last entry is the current state
    pub state_instances: Vec<OwdlStateInstance>,
    pub status: OwdlStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwdlWorkflowInstance {
    pub fn new(instance_id: impl Into<String>, pce_id: impl Into<String>, workflow: OwdlWorkflow) -> Self {
        let now = Utc::now();
        Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            instance_id: instance_id.into(),
            pce_id: pce_id.into(),
            owdl_workflow: workflow,
            state_instances: Vec::new(),
            status: OwdlStatus::Created,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn current_state_instance(&self) -> Option<&OwdlStateInstance> {
        self.state_instances.last()
    }

    pub fn current_state_instance_mut(&mut self) -> Option<&mut OwdlStateInstance> {
        self.state_instances.last_mut()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
