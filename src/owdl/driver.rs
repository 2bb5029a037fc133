//! OWDL workflow driver
//!
//! Advances one workflow instance state by state. Every mutation is written
//! through the repository before the call returns, so a new driver can be
//! loaded from the repository at any point and carry on.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use owdl_model::OwdlWorkflow;
use pce_entities::ContainerInstanceStatus;
use tracing::{debug, error, info, warn};

use super::container::ContainerService;
use super::instance::{OwdlStateInstance, OwdlStatus, OwdlWorkflowInstance};
use super::onedocker::{OneDockerCommand, DEFAULT_RUNNER};
use super::repository::{OwdlInstanceRepository, RepositoryError};

/// Illegal transitions and persistence failures
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Cannot {operation}: workflow is {workflow_status}, current state is {state_status}")]
    InvalidTransition {
        operation: &'static str,
        workflow_status: OwdlStatus,
        state_status: String,
    },

    #[error("Workflow is in terminal state {0}")]
    WorkflowTerminal(OwdlStatus),

    #[error("Unknown state '{0}'")]
    UnknownState(String),

    #[error("Workflow has no current state")]
    NoCurrentState,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Drives one workflow instance
pub struct OwdlDriver {
    instance: OwdlWorkflowInstance,
    containers: Arc<dyn ContainerService>,
    repository: Arc<dyn OwdlInstanceRepository>,
    runner: String,
}

impl OwdlDriver {
    /// Create a CREATED instance and persist it
    pub fn new(
        instance_id: &str,
        pce_id: &str,
        workflow: OwdlWorkflow,
        containers: Arc<dyn ContainerService>,
        repository: Arc<dyn OwdlInstanceRepository>,
    ) -> Result<Self, DriverError> {
        let instance = OwdlWorkflowInstance::new(instance_id, pce_id, workflow);
        repository.create(&instance)?;
        debug!(instance_id, pce_id, "created workflow instance");
        Ok(Self {
            instance,
            containers,
            repository,
            runner: DEFAULT_RUNNER.to_string(),
        })
    }

    /// Resume a persisted instance
    pub fn load(
        instance_id: &str,
        containers: Arc<dyn ContainerService>,
        repository: Arc<dyn OwdlInstanceRepository>,
    ) -> Result<Self, DriverError> {
        let instance = repository.read(instance_id)?;
        debug!(instance_id, status = %instance.status, "loaded workflow instance");
        Ok(Self {
            instance,
            containers,
            repository,
            runner: DEFAULT_RUNNER.to_string(),
        })
    }

    /// Use a different OneDocker runner for dispatched commands
    pub fn with_runner(mut self, runner: impl Into<String>) -> Self {
        self.runner = runner.into();
        self
    }

    pub fn instance_id(&self) -> &str {
        &self.instance.instance_id
    }

    pub fn get_status(&self) -> &OwdlWorkflowInstance {
        &self.instance
    }

    pub fn status(&self) -> OwdlStatus {
        self.instance.status
    }

    pub fn get_current_state_instance(&self) -> Result<&OwdlStateInstance, DriverError> {
        self.instance
            .current_state_instance()
            .ok_or(DriverError::NoCurrentState)
    }

    pub fn is_completed(&self) -> bool {
        self.instance.status == OwdlStatus::Completed
    }

    /// Dispatch the entry state (CREATED → STARTED)
    pub fn start(&mut self) -> Result<(), DriverError> {
        if self.instance.status != OwdlStatus::Created {
            return Err(self.invalid_transition("start an already-started workflow"));
        }

        let starts_at = self.instance.owdl_workflow.starts_at.clone();
        self.dispatch(&starts_at, 0)?;
        if self.instance.status == OwdlStatus::Created {
            self.instance.status = OwdlStatus::Started;
        }
        info!(instance_id = %self.instance.instance_id, state = %starts_at, "workflow started");
        self.persist()
    }

    /// Advance past a COMPLETED state.
    ///
    /// An `end` state completes the workflow even when it also names a `next`.
    pub fn next(&mut self) -> Result<(), DriverError> {
        self.refresh()?;

        let current = match self.instance.current_state_instance() {
            Some(current)
                if self.instance.status == OwdlStatus::Started
                    && current.status == OwdlStatus::Completed =>
            {
                current
            }
            _ => return Err(self.invalid_transition("advance a non-terminated state or completed workflow")),
        };

        match current.owdl_state.successor().map(str::to_string) {
            None => {
                self.instance.status = OwdlStatus::Completed;
                info!(instance_id = %self.instance.instance_id, "workflow completed");
            }
            Some(next) => {
                self.dispatch(&next, 0)?;
                info!(instance_id = %self.instance.instance_id, state = %next, "advanced to next state");
            }
        }
        self.persist()
    }

    /// Cancel the current state if it is STARTED.
    ///
    /// Anything else is logged and ignored. Containers are asked to stop; the
    /// state is marked CANCELLED without waiting for them.
    pub fn cancel_state(&mut self) -> Result<(), DriverError> {
        let instance_id = self.instance.instance_id.clone();
        let current = match self.instance.current_state_instance_mut() {
            Some(current) if current.status == OwdlStatus::Started => current,
            Some(current) => {
                error!(
                    instance_id = %instance_id,
                    state = %current.state_name,
                    status = %current.status,
                    "cannot cancel a state that is not STARTED"
                );
                return Ok(());
            }
            None => {
                error!(instance_id = %instance_id, "cannot cancel: no state has been dispatched");
                return Ok(());
            }
        };

        current.status = OwdlStatus::Cancelled;
        let ids = current.container_ids();
        let state_name = current.state_name.clone();

        for (id, err) in ids.iter().zip(self.containers.cancel_instances(&ids)) {
            if let Some(err) = err {
                warn!(instance_id = %instance_id, container = %id, error = %err, "cancel request failed");
            }
        }
        info!(instance_id = %instance_id, state = %state_name, containers = ids.len(), "state cancelled");
        self.persist()
    }

    /// Cancel the current state, then the workflow
    pub fn cancel_workflow(&mut self) -> Result<(), DriverError> {
        if self.instance.status.is_terminal() {
            return Err(DriverError::WorkflowTerminal(self.instance.status));
        }
        self.cancel_state()?;
        self.instance.status = OwdlStatus::Cancelled;
        info!(instance_id = %self.instance.instance_id, "workflow cancelled");
        self.persist()
    }

    /// Re-run a FAILED or CANCELLED current state with the next retry number.
    ///
    /// The workflow status is left alone; the retry budget only binds `run_to_end`.
    pub fn retry(&mut self) -> Result<(), DriverError> {
        if self.instance.status.is_terminal() {
            return Err(DriverError::WorkflowTerminal(self.instance.status));
        }
        let current = self.get_current_state_instance()?;
        if !matches!(current.status, OwdlStatus::Failed | OwdlStatus::Cancelled) {
            warn!(
                instance_id = %self.instance.instance_id,
                state = %current.state_name,
                status = %current.status,
                "nothing to retry"
            );
            return Ok(());
        }

        let state_name = current.state_name.clone();
        let retry_num = current.retry_num + 1;
        self.dispatch(&state_name, retry_num)?;
        info!(instance_id = %self.instance.instance_id, state = %state_name, retry_num, "state retried");
        self.persist()
    }

    /// Poll the current state's containers and recompute its status.
    ///
    /// Containers the service no longer knows count as FAILED. Returns the
    /// workflow status afterwards.
    pub fn refresh(&mut self) -> Result<OwdlStatus, DriverError> {
        let workflow_status = self.instance.status;
        if workflow_status.is_terminal() {
            return Ok(workflow_status);
        }

        let instance_id = self.instance.instance_id.clone();
        let current = match self.instance.current_state_instance_mut() {
            Some(current) if current.status == OwdlStatus::Started => current,
            _ => return Ok(workflow_status),
        };

        let ids = current.container_ids();
        match self.containers.get_instances(&ids) {
            Ok(updates) => {
                for (container, update) in current.containers.iter_mut().zip(updates) {
                    match update {
                        Some(update) => *container = update,
                        None => {
                            warn!(instance_id = %instance_id, container = %container.instance_id, "container not found");
                            container.status = ContainerInstanceStatus::Failed;
                        }
                    }
                }
            }
            Err(err) => {
                warn!(instance_id = %instance_id, error = %err, "failed to poll containers");
            }
        }

        let before = current.status;
        current.refresh_status();
        if current.status != before {
            info!(
                instance_id = %instance_id,
                state = %current.state_name,
                status = %current.status,
                "state status changed"
            );
        }

        self.persist()?;
        Ok(self.instance.status)
    }

    /// Poll until the current state leaves STARTED; returns its status
    pub fn wait_for_state(&mut self, poll_interval: Duration) -> Result<OwdlStatus, DriverError> {
        loop {
            let workflow_status = self.refresh()?;
            let state_status = self.get_current_state_instance()?.status;
            if state_status != OwdlStatus::Started || workflow_status.is_terminal() {
                return Ok(state_status);
            }
            thread::sleep(poll_interval);
        }
    }

    /// Start (if needed) and drive the workflow until it is terminal.
    ///
    /// Failed states are retried while their retry budget lasts; once it is
    /// spent the workflow is marked FAILED. `cancel` is checked between polls;
    /// once it returns true the workflow is cancelled.
    pub fn run_to_end(
        &mut self,
        poll_interval: Duration,
        cancel: &dyn Fn() -> bool,
    ) -> Result<OwdlStatus, DriverError> {
        if self.instance.status == OwdlStatus::Created {
            self.start()?;
        }

        loop {
            if self.instance.status.is_terminal() {
                return Ok(self.instance.status);
            }
            if cancel() {
                self.cancel_workflow()?;
                continue;
            }

            if self.refresh()?.is_terminal() {
                continue;
            }
            let state_status = self.get_current_state_instance()?.status;
            match state_status {
                OwdlStatus::Completed => self.next()?,
                OwdlStatus::Failed | OwdlStatus::Cancelled => {
                    if self.get_current_state_instance()?.retries_exhausted() {
                        self.fail_workflow()?;
                    } else {
                        self.retry()?;
                    }
                }
                OwdlStatus::Created | OwdlStatus::Started => thread::sleep(poll_interval),
            }
        }
    }

    /// Launch the containers of `state_name` and append the new state run.
    ///
    /// Dispatch failures become a FAILED state run, not an error.
    fn dispatch(&mut self, state_name: &str, retry_num: u32) -> Result<(), DriverError> {
        let state = self
            .instance
            .owdl_workflow
            .state(state_name)
            .cloned()
            .ok_or_else(|| DriverError::UnknownState(state_name.to_string()))?;

        let commands = OneDockerCommand::for_each_container(&self.runner, &state);
        let containers = match self.containers.create_instances(
            &state.container_definition,
            &commands,
            state.timeout,
        ) {
            Ok(containers) => containers,
            Err(err) => {
                error!(
                    instance_id = %self.instance.instance_id,
                    state = %state_name,
                    error = %err,
                    "container dispatch failed"
                );
                Vec::new()
            }
        };
        debug!(
            instance_id = %self.instance.instance_id,
            state = %state_name,
            containers = containers.len(),
            retry_num,
            "dispatched state"
        );

        let state_instance = OwdlStateInstance::new(state_name, state, containers, retry_num);
        self.instance.state_instances.push(state_instance);
        Ok(())
    }

    fn fail_workflow(&mut self) -> Result<(), DriverError> {
        self.instance.status = OwdlStatus::Failed;
        error!(instance_id = %self.instance.instance_id, "workflow failed: retries exhausted");
        self.persist()
    }

    fn persist(&mut self) -> Result<(), DriverError> {
        self.instance.touch();
        self.repository.update(&self.instance)?;
        Ok(())
    }

    fn invalid_transition(&self, operation: &'static str) -> DriverError {
        DriverError::InvalidTransition {
            operation,
            workflow_status: self.instance.status,
            state_status: self
                .instance
                .current_state_instance()
                .map_or_else(|| "none".to_string(), |s| s.status.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockContainerService;
    use crate::owdl::InMemoryInstanceRepository;

    fn workflow(retry_count: u32) -> OwdlWorkflow {
        OwdlWorkflow::from_json(&format!(
            r#"{{
                "StartsAt": "Prepare",
                "States": {{
                    "Prepare": {{
                        "Type": "Task",
                        "ContainerDefinition": "worker:1#main",
                        "PackageName": "pkg",
                        "CmdArgsList": ["--shard=0", "--shard=1"],
                        "Next": "Compute",
                        "RetryCount": {retry_count}
                    }},
                    "Compute": {{
                        "Type": "Task",
                        "ContainerDefinition": "worker:1#main",
                        "PackageName": "pkg",
                        "CmdArgsList": ["--compute"],
                        "End": true
                    }}
                }}
            }}"#
        ))
        .unwrap()
    }

    fn driver(mock: &Arc<MockContainerService>, retry_count: u32) -> OwdlDriver {
        OwdlDriver::new(
            "run-1",
            "pce-1",
            workflow(retry_count),
            mock.clone(),
            Arc::new(InMemoryInstanceRepository::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_start_dispatches_one_container_per_args() {
        let mock = Arc::new(MockContainerService::new());
        let mut d = driver(&mock, 0);
        d.start().unwrap();

        assert_eq!(d.status(), OwdlStatus::Started);
        let current = d.get_current_state_instance().unwrap();
        assert_eq!(current.state_name, "Prepare");
        assert_eq!(current.containers.len(), 2);
        assert_eq!(current.status, OwdlStatus::Started);
        assert_eq!(mock.created_commands()[0].len(), 2);
    }

    #[test]
    fn test_start_twice_is_an_error() {
        let mock = Arc::new(MockContainerService::new());
        let mut d = driver(&mock, 0);
        d.start().unwrap();
        assert!(matches!(
            d.start(),
            Err(DriverError::InvalidTransition { operation, .. }) if operation.starts_with("start")
        ));
    }

    #[test]
    fn test_next_requires_completed_state() {
        let mock = Arc::new(MockContainerService::new());
        mock.hold_all();
        let mut d = driver(&mock, 0);
        d.start().unwrap();
        assert!(matches!(d.next(), Err(DriverError::InvalidTransition { .. })));
    }

    #[test]
    fn test_dispatch_failure_is_a_failed_state() {
        let mock = Arc::new(MockContainerService::new());
        mock.inject_error(crate::mock::ContainerOperation::Create, "capacity");
        let mut d = driver(&mock, 1);
        d.start().unwrap();

        let current = d.get_current_state_instance().unwrap();
        assert_eq!(current.status, OwdlStatus::Failed);
        assert!(current.containers.is_empty());
        assert_eq!(d.status(), OwdlStatus::Started);
    }

    #[test]
    fn test_missing_container_fails_state() {
        let mock = Arc::new(MockContainerService::new());
        mock.hold_all();
        let mut d = driver(&mock, 0);
        d.start().unwrap();

        let id = d.get_current_state_instance().unwrap().containers[0].instance_id.clone();
        mock.forget(&id);
        assert_eq!(d.refresh().unwrap(), OwdlStatus::Started);
        assert_eq!(d.get_current_state_instance().unwrap().status, OwdlStatus::Failed);
    }

    #[test]
    fn test_manual_retry_ignores_retry_budget() {
        let mock = Arc::new(MockContainerService::new());
        mock.set_default_status(ContainerInstanceStatus::Failed);
        let mut d = driver(&mock, 0);
        d.start().unwrap();
        assert_eq!(d.wait_for_state(Duration::from_millis(1)).unwrap(), OwdlStatus::Failed);
        assert_eq!(d.status(), OwdlStatus::Started);

        d.retry().unwrap();
        assert_eq!(d.get_current_state_instance().unwrap().retry_num, 1);
        assert_eq!(d.status(), OwdlStatus::Started);
    }

    #[test]
    fn test_cancel_state_on_resolved_state_is_ignored() {
        let mock = Arc::new(MockContainerService::new());
        let mut d = driver(&mock, 0);
        d.start().unwrap();
        d.refresh().unwrap();
        assert_eq!(d.get_current_state_instance().unwrap().status, OwdlStatus::Completed);

        d.cancel_state().unwrap();
        assert_eq!(d.get_current_state_instance().unwrap().status, OwdlStatus::Completed);
        assert!(mock.cancelled_ids().is_empty());
    }

    #[test]
    fn test_retry_appends_history() {
        let mock = Arc::new(MockContainerService::new());
        mock.set_default_status(ContainerInstanceStatus::Failed);
        let mut d = driver(&mock, 2);
        d.start().unwrap();
        d.refresh().unwrap();
        assert_eq!(d.status(), OwdlStatus::Started);

        d.retry().unwrap();
        let history = &d.get_status().state_instances;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].retry_num, 1);
        assert_eq!(history[1].state_name, "Prepare");
    }

    #[test]
    fn test_retry_on_running_state_is_noop() {
        let mock = Arc::new(MockContainerService::new());
        mock.hold_all();
        let mut d = driver(&mock, 2);
        d.start().unwrap();
        d.retry().unwrap();
        assert_eq!(d.get_status().state_instances.len(), 1);
    }

    #[test]
    fn test_custom_runner() {
        let mock = Arc::new(MockContainerService::new());
        let mut d = driver(&mock, 0).with_runner("/opt/bin/od");
        d.start().unwrap();
        assert!(mock.created_commands()[0][0].starts_with("/opt/bin/od pkg "));
    }
}
