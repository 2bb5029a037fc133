//! Container orchestration seam

use std::io;

use pce_entities::ContainerInstance;

/// Dispatch, poll or cancel failure
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("Failed to dispatch containers from {container_definition}: {message}")]
    Dispatch {
        container_definition: String,
        message: String,
    },

    #[error("Container {0} not found")]
    NotFound(String),

    #[error("Failed to poll containers: {0}")]
    Poll(String),

    #[error("Failed to cancel container {instance_id}: {message}")]
    Cancel { instance_id: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Launches and tracks the containers of a state run.
///
/// Timeouts are enforced here, not by the driver.
pub trait ContainerService: Send + Sync {
    /// Launch one container per command
    fn create_instances(
        &self,
        container_definition: &str,
        commands: &[String],
        timeout_secs: Option<u32>,
    ) -> Result<Vec<ContainerInstance>, ContainerError>;

    /// Current handle for each id, `None` where the container is unknown
    fn get_instances(
        &self,
        instance_ids: &[String],
    ) -> Result<Vec<Option<ContainerInstance>>, ContainerError>;

    /// Request a stop for each id; one optional error per id.
    ///
    /// Best-effort: returns once the requests are issued.
    fn cancel_instances(&self, instance_ids: &[String]) -> Vec<Option<ContainerError>>;
}
