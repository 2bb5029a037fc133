//! Mock container service
//!
//! In-process stand-in for the container orchestration service, used by the
//! driver tests. Containers resolve to scripted statuses and every call is
//! recorded for assertions.
//!
//! # Operations
//!
//! - `create_instances`: launch one STARTED container per command
//! - `get_instances`: resolve containers to their scripted status
//! - `cancel_instances`: stop containers and record the request
//!
//! Failures can be injected per operation with [`FailureConfig`].

mod failure;
mod service;
mod state;

pub use failure::{ContainerOperation, FailureConfig, FailureInjector};
pub use service::MockContainerService;
pub use state::MockState;
