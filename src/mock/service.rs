//! Scriptable in-process container service

use std::sync::{Arc, Mutex};

use pce_entities::{ContainerInstance, ContainerInstanceStatus};
use tracing::debug;

use super::failure::{ContainerOperation, FailureConfig, FailureInjector};
use super::state::MockState;
use crate::owdl::{ContainerError, ContainerService};

/// Container service for tests.
///
/// Containers launch STARTED and resolve on their next poll to their scripted
/// status (COMPLETED unless told otherwise).
#[derive(Debug, Clone, Default)]
pub struct MockContainerService {
    state: Arc<Mutex<MockState>>,
    failures: Arc<Mutex<FailureInjector>>,
}

impl MockContainerService {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test configuration ===

    /// Status every container resolves to unless overridden
    pub fn set_default_status(&self, status: ContainerInstanceStatus) {
        self.state.lock().unwrap().default_status = status;
    }

    /// Keep containers STARTED until told otherwise
    pub fn hold_all(&self) {
        self.set_default_status(ContainerInstanceStatus::Started);
    }

    /// Status one container resolves to on its next poll
    pub fn set_status(&self, instance_id: &str, status: ContainerInstanceStatus) {
        self.state.lock().unwrap().set_status(instance_id, status);
    }

    /// Resolve every launched container to `status` on its next poll
    pub fn set_all(&self, status: ContainerInstanceStatus) {
        let mut state = self.state.lock().unwrap();
        for id in state.container_ids() {
            state.set_status(&id, status);
        }
        state.default_status = status;
    }

    /// Make the service report the container as unknown
    pub fn forget(&self, instance_id: &str) {
        self.state.lock().unwrap().forget(instance_id);
    }

    pub fn inject_error(&self, op: ContainerOperation, message: &str) {
        self.inject_failure(op, FailureConfig::error(message));
    }

    pub fn inject_failure(&self, op: ContainerOperation, config: FailureConfig) {
        self.failures.lock().unwrap().inject(op, config);
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    // === Assertions ===

    /// Commands of every `create_instances` call, in order
    pub fn created_commands(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().created.clone()
    }

    /// Ids passed to `cancel_instances`, in order
    pub fn cancelled_ids(&self) -> Vec<String> {
        self.state.lock().unwrap().cancelled.clone()
    }

    fn check_failure(&self, op: ContainerOperation) -> Option<String> {
        self.failures.lock().unwrap().check(op)
    }
}

impl ContainerService for MockContainerService {
    fn create_instances(
        &self,
        container_definition: &str,
        commands: &[String],
        _timeout_secs: Option<u32>,
    ) -> Result<Vec<ContainerInstance>, ContainerError> {
        if let Some(message) = self.check_failure(ContainerOperation::Create) {
            return Err(ContainerError::Dispatch {
                container_definition: container_definition.to_string(),
                message,
            });
        }

        let mut state = self.state.lock().unwrap();
        state.created.push(commands.to_vec());
        let containers: Vec<_> = commands.iter().map(|_| state.launch()).collect();
        debug!(container_definition, count = containers.len(), "mock containers launched");
        Ok(containers)
    }

    fn get_instances(
        &self,
        instance_ids: &[String],
    ) -> Result<Vec<Option<ContainerInstance>>, ContainerError> {
        if let Some(message) = self.check_failure(ContainerOperation::Get) {
            return Err(ContainerError::Poll(message));
        }

        let mut state = self.state.lock().unwrap();
        Ok(instance_ids.iter().map(|id| state.poll(id)).collect())
    }

    fn cancel_instances(&self, instance_ids: &[String]) -> Vec<Option<ContainerError>> {
        let failure = self.check_failure(ContainerOperation::Cancel);
        let mut state = self.state.lock().unwrap();

        instance_ids
            .iter()
            .map(|id| {
                if let Some(ref message) = failure {
                    return Some(ContainerError::Cancel {
                        instance_id: id.clone(),
                        message: message.clone(),
                    });
                }
                if state.stop(id) {
                    None
                } else {
                    Some(ContainerError::NotFound(id.clone()))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("run pkg --exe_args=\"{}\"", i)).collect()
    }

    #[test]
    fn test_create_and_poll() {
        let mock = MockContainerService::new();
        let containers = mock.create_instances("def", &commands(2), None).unwrap();
        assert_eq!(containers.len(), 2);
        assert!(containers
            .iter()
            .all(|c| c.status == ContainerInstanceStatus::Started));

        let ids: Vec<_> = containers.iter().map(|c| c.instance_id.clone()).collect();
        let polled = mock.get_instances(&ids).unwrap();
        assert!(polled
            .iter()
            .all(|c| c.as_ref().unwrap().status == ContainerInstanceStatus::Completed));
        assert_eq!(mock.created_commands(), vec![commands(2)]);
    }

    #[test]
    fn test_injected_dispatch_failure() {
        let mock = MockContainerService::new();
        mock.inject_failure(
            ContainerOperation::Create,
            FailureConfig::error("no capacity").with_fail_count(1),
        );
        assert!(matches!(
            mock.create_instances("def", &commands(1), None),
            Err(ContainerError::Dispatch { .. })
        ));
        assert!(mock.create_instances("def", &commands(1), None).is_ok());
    }

    #[test]
    fn test_cancel_unknown_container() {
        let mock = MockContainerService::new();
        let errors = mock.cancel_instances(&["nope".to_string()]);
        assert!(matches!(errors[0], Some(ContainerError::NotFound(_))));
        assert_eq!(mock.cancelled_ids(), vec!["nope".to_string()]);
    }

    #[test]
    fn test_set_all() {
        let mock = MockContainerService::new();
        mock.hold_all();
        let containers = mock.create_instances("def", &commands(2), None).unwrap();
        let ids: Vec<_> = containers.iter().map(|c| c.instance_id.clone()).collect();
        assert!(mock.get_instances(&ids).unwrap()[0]
            .as_ref()
            .map_or(false, |c| c.status == ContainerInstanceStatus::Started));

        mock.set_all(ContainerInstanceStatus::Failed);
        let polled = mock.get_instances(&ids).unwrap();
        assert_eq!(
            polled[1].as_ref().unwrap().status,
            ContainerInstanceStatus::Failed
        );
    }
}
