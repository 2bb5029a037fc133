//! Mock container bookkeeping

use std::collections::{BTreeMap, BTreeSet};

use pce_entities::{ContainerInstance, ContainerInstanceStatus};

/// Containers the mock has launched, plus a record of every call
#[derive(Debug)]
pub struct MockState {
    containers: BTreeMap<String, ContainerInstance>,
    /// Per-container status overrides
    overrides: BTreeMap<String, ContainerInstanceStatus>,
    /// Containers the mock pretends not to know
    forgotten: BTreeSet<String>,
    /// Status reported on poll when no override is set
    pub default_status: ContainerInstanceStatus,
    next_id: u64,
    /// Commands of every `create_instances` call
    pub created: Vec<Vec<String>>,
    /// Ids passed to `cancel_instances`, in order
    pub cancelled: Vec<String>,
}

impl MockState {
    pub fn new() -> Self {
        Self {
            containers: BTreeMap::new(),
            overrides: BTreeMap::new(),
            forgotten: BTreeSet::new(),
            default_status: ContainerInstanceStatus::Completed,
            next_id: 0,
            created: Vec::new(),
            cancelled: Vec::new(),
        }
    }

    /// Register a new container in STARTED
    pub fn launch(&mut self) -> ContainerInstance {
        self.next_id += 1;
        let mut instance = ContainerInstance::new(
            format!("mock-{}", self.next_id),
            ContainerInstanceStatus::Started,
        );
        instance.ip_address = Some(format!("10.0.0.{}", self.next_id % 250 + 1));
        self.containers
            .insert(instance.instance_id.clone(), instance.clone());
        instance
    }

    /// Poll one container, resolving it to its scripted status
    pub fn poll(&mut self, instance_id: &str) -> Option<ContainerInstance> {
        if self.forgotten.contains(instance_id) {
            return None;
        }
        let default_status = self.default_status;
        let status = self
            .overrides
            .get(instance_id)
            .copied()
            .unwrap_or(default_status);
        let container = self.containers.get_mut(instance_id)?;
        if !container.status.is_terminal() {
            container.status = status;
            container.exit_code = match status {
                ContainerInstanceStatus::Completed => Some(0),
                ContainerInstanceStatus::Failed => Some(1),
                _ => None,
            };
        }
        Some(container.clone())
    }

    /// Stop a container; `false` when it is unknown
    pub fn stop(&mut self, instance_id: &str) -> bool {
        self.cancelled.push(instance_id.to_string());
        if self.forgotten.contains(instance_id) {
            return false;
        }
        match self.containers.get_mut(instance_id) {
            Some(container) => {
                if !container.status.is_terminal() {
                    container.status = ContainerInstanceStatus::Failed;
                }
                true
            }
            None => false,
        }
    }

    pub fn set_status(&mut self, instance_id: &str, status: ContainerInstanceStatus) {
        self.overrides.insert(instance_id.to_string(), status);
    }

    pub fn forget(&mut self, instance_id: &str) {
        self.forgotten.insert(instance_id.to_string());
    }

    pub fn container_ids(&self) -> Vec<String> {
        self.containers.keys().cloned().collect()
    }
}

impl Default for MockState {
    fn default() -> Self {
        Self::new()
    }
}
