//! Local process container service
//!
//! Runs each container command as a `sh -c` child process on this machine.
//! Timeouts are enforced when the process is polled.

use std::collections::HashMap;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use pce_entities::{ContainerInstance, ContainerInstanceStatus};
use tracing::{debug, warn};
use uuid::Uuid;

use super::container::{ContainerError, ContainerService};

struct LocalProcess {
    child: Child,
    started: Instant,
    timeout: Option<Duration>,
    instance: ContainerInstance,
}

impl LocalProcess {
    fn poll(&mut self) -> ContainerInstance {
        if self.instance.status.is_terminal() {
            return self.instance.clone();
        }

        match self.child.try_wait() {
            Ok(Some(exit)) => {
                self.instance.exit_code = exit.code();
                self.instance.status = if exit.success() {
                    ContainerInstanceStatus::Completed
                } else {
                    ContainerInstanceStatus::Failed
                };
            }
            Ok(None) => {
                if self.timeout.map_or(false, |t| self.started.elapsed() >= t) {
                    warn!(container = %self.instance.instance_id, "container timed out, killing");
                    self.kill();
                }
            }
            Err(err) => {
                warn!(container = %self.instance.instance_id, error = %err, "failed to poll process");
                self.instance.status = ContainerInstanceStatus::Failed;
            }
        }
        self.instance.clone()
    }

    fn kill(&mut self) {
        if let Err(err) = self.child.kill() {
            debug!(container = %self.instance.instance_id, error = %err, "kill failed");
        }
        let _ = self.child.wait();
        self.instance.status = ContainerInstanceStatus::Failed;
    }
}

/// Container service backed by local child processes.
///
/// Processes already seen in a terminal status are dropped on the next
/// `create_instances`, so only the containers of the current state stay
/// tracked. The driver never polls containers of an earlier state.
pub struct LocalProcessService {
    shell: String,
    processes: Mutex<HashMap<String, LocalProcess>>,
}

impl LocalProcessService {
    pub fn new() -> Self {
        Self::with_shell("sh")
    }

    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            processes: Mutex::new(HashMap::new()),
        }
    }

    fn spawn(&self, command: &str) -> std::io::Result<Child> {
        Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .spawn()
    }
}

impl Default for LocalProcessService {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerService for LocalProcessService {
    fn create_instances(
        &self,
        container_definition: &str,
        commands: &[String],
        timeout_secs: Option<u32>,
    ) -> Result<Vec<ContainerInstance>, ContainerError> {
        let mut launched = Vec::with_capacity(commands.len());
        for command in commands {
            match self.spawn(command) {
                Ok(child) => {
                    let mut instance = ContainerInstance::new(
                        Uuid::new_v4().to_string(),
                        ContainerInstanceStatus::Started,
                    );
                    instance.ip_address = Some("127.0.0.1".to_string());
                    debug!(container = %instance.instance_id, pid = child.id(), command = %command, "spawned");
                    launched.push(LocalProcess {
                        child,
                        started: Instant::now(),
                        timeout: timeout_secs.map(|t| Duration::from_secs(u64::from(t))),
                        instance,
                    });
                }
                Err(err) => {
                    for process in &mut launched {
                        process.kill();
                    }
                    return Err(ContainerError::Dispatch {
                        container_definition: container_definition.to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }

        let instances = launched.iter().map(|p| p.instance.clone()).collect();
        let mut processes = self.processes.lock().unwrap();
        let before = processes.len();
        processes.retain(|_, p| !p.instance.status.is_terminal());
        if processes.len() < before {
            debug!(evicted = before - processes.len(), "dropped finished processes");
        }
        for process in launched {
            processes.insert(process.instance.instance_id.clone(), process);
        }
        Ok(instances)
    }

    fn get_instances(
        &self,
        instance_ids: &[String],
    ) -> Result<Vec<Option<ContainerInstance>>, ContainerError> {
        let mut processes = self.processes.lock().unwrap();
        Ok(instance_ids
            .iter()
            .map(|id| processes.get_mut(id).map(LocalProcess::poll))
            .collect())
    }

    fn cancel_instances(&self, instance_ids: &[String]) -> Vec<Option<ContainerError>> {
        let mut processes = self.processes.lock().unwrap();
        instance_ids
            .iter()
            .map(|id| match processes.get_mut(id) {
                Some(process) => {
                    if !process.instance.status.is_terminal() {
                        process.kill();
                    }
                    None
                }
                None => Some(ContainerError::NotFound(id.clone())),
            })
            .collect()
    }
}

impl Drop for LocalProcessService {
    fn drop(&mut self) {
        if let Ok(mut processes) = self.processes.lock() {
            for process in processes.values_mut() {
                if !process.instance.status.is_terminal() {
                    process.kill();
                }
            }
        }
    }
}
