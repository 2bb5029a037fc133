//! Compute resources: ECS cluster and task/container definition

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Tagged, Tags};

/// Cluster status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClusterStatus {
    Active,
    Inactive,
    #[serde(other)]
    Unknown,
}

/// Container cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub cluster_arn: String,
    pub cluster_name: String,
    pub status: ClusterStatus,
    #[serde(default)]
    pub tags: Tags,
}

impl Tagged for Cluster {
    fn tags(&self) -> &Tags {
        &self.tags
    }
}

/// Task/container definition used to launch MPC workers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerDefinition {
    /// Task definition id, "<family>:<revision>#<container name>"
    pub id: String,
    pub image: String,
    /// CPU units
    pub cpu: u32,
    /// Memory in MiB
    pub memory: u32,
    #[serde(default)]
    pub entry_point: Vec<String>,
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    pub task_role_id: String,
    #[serde(default)]
    pub tags: Tags,
}

impl Tagged for ContainerDefinition {
    fn tags(&self) -> &Tags {
        &self.tags
    }
}
