//! PCE toolkit
//!
//! Checks that a private computation environment (PCE) matches the standard
//! topology an MPC job needs, and drives OneDocker workflows (OWDL) through
//! their states on top of a container service.

pub mod config;
pub mod gateway;
pub mod mock;
pub mod owdl;
pub mod pce;
pub mod signal;
pub mod telemetry;
pub mod validator;

pub use config::{ConfigError, EffectiveConfig, ToolkitSettings};
pub use gateway::{Gateways, GatewayError, SnapshotGateway};
pub use owdl::{
    ContainerService, DriverError, LocalInstanceRepository, OwdlDriver, OwdlInstanceRepository,
    OwdlStatus, OwdlWorkflowInstance,
};
pub use pce::load_pce;
pub use validator::{
    DuplicatePceResourcesChecker, MpcRole, ValidationReport, ValidationResult,
    ValidationResultCode, ValidationStep, ValidationSuite,
};
