//! OWDL workflow runtime
//!
//! Runs a parsed [`OwdlWorkflow`](owdl_model::OwdlWorkflow) against a PCE:
//!
//! - [`OwdlDriver`] - the state machine (`start`, `next`, `retry`, cancel)
//! - [`ContainerService`] - where containers are launched and polled
//! - [`OwdlInstanceRepository`] - where instances are persisted between calls
//!
//! Workflow and state status: CREATED → STARTED → {COMPLETED | FAILED | CANCELLED}.
//! Terminal workflows accept no further transitions.

mod container;
mod driver;
mod instance;
mod local;
mod onedocker;
mod repository;

pub use container::{ContainerError, ContainerService};
pub use driver::{DriverError, OwdlDriver};
pub use instance::{OwdlStateInstance, OwdlStatus, OwdlWorkflowInstance, SCHEMA_ID, SCHEMA_VERSION};
pub use local::LocalProcessService;
pub use onedocker::{OneDockerCommand, DEFAULT_RUNNER};
pub use repository::{
    InMemoryInstanceRepository, LocalInstanceRepository, OwdlInstanceRepository, RepositoryError,
};
