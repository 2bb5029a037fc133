//! Resource gateways
//!
//! Read-only capabilities the validator and the PCE loader consume. Each trait
//! mirrors one slice of the cloud API (network, compute, IAM, logs); the core
//! never calls the cloud directly, so any implementation can be injected:
//! a live SDK wrapper, or the recorded [`SnapshotGateway`] used by the CLI and
//! the tests.
//!
//! Gateways either succeed or return a [`GatewayError`]. The core performs no
//! retries and propagates these errors to its caller unchanged.

mod snapshot;

use std::io;
use std::sync::Arc;

use pce_entities::{
    Cluster, ContainerDefinition, FirewallRuleset, IamRole, LogGroup, RouteTable, Subnet, Tagged,
    Vpc, VpcPeering, PCE_ID_TAG,
};

pub use snapshot::{CloudInventory, SnapshotGateway};

/// Collaborator or transport failure
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{operation} failed: {message}")]
    Unavailable { operation: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed response from {operation}: {message}")]
    Malformed { operation: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Tag filter used for resource discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    pub key: String,
    pub value: String,
}

impl TagFilter {
    /// Filter on the `pce:pce-id` tag
    pub fn pce(pce_id: &str) -> Self {
        Self {
            key: PCE_ID_TAG.to_string(),
            value: pce_id.to_string(),
        }
    }

    pub fn matches<T: Tagged>(&self, resource: &T) -> bool {
        resource.has_tag(&self.key, &self.value)
    }
}

/// Network discovery
pub trait NetworkGateway: Send + Sync {
    fn describe_vpcs(&self, filter: &TagFilter) -> GatewayResult<Vec<Vpc>>;

    fn describe_subnets(&self, filter: &TagFilter) -> GatewayResult<Vec<Subnet>>;

    fn describe_route_tables(&self, filter: &TagFilter) -> GatewayResult<Vec<RouteTable>>;

    fn describe_firewall_rulesets(&self, filter: &TagFilter)
        -> GatewayResult<Vec<FirewallRuleset>>;

    /// Peering connections where `vpc_id` is the requester or the accepter
    fn describe_vpc_peerings(&self, vpc_id: &str) -> GatewayResult<Vec<VpcPeering>>;

    /// Every availability zone of the gateway's region
    fn describe_availability_zones(&self) -> GatewayResult<Vec<String>>;
}

/// Compute discovery
pub trait ComputeGateway: Send + Sync {
    fn describe_clusters(&self, filter: &TagFilter) -> GatewayResult<Vec<Cluster>>;

    fn describe_container_definitions(
        &self,
        filter: &TagFilter,
    ) -> GatewayResult<Vec<ContainerDefinition>>;

    /// Log group name from the task definition's log configuration.
    ///
    /// `None` when the task definition has no log configuration at all.
    fn extract_log_group_name(&self, container_definition_id: &str)
        -> GatewayResult<Option<String>>;
}

/// IAM introspection
pub trait IamGateway: Send + Sync {
    /// Role with its attached policies; `None` when the role does not exist
    fn get_policies_for_role(&self, role_id: &str) -> GatewayResult<Option<IamRole>>;
}

/// CloudWatch logs
pub trait LogsGateway: Send + Sync {
    fn describe_log_group(&self, log_group_name: &str) -> GatewayResult<Option<LogGroup>>;
}

/// The full set of gateways for one region
#[derive(Clone)]
pub struct Gateways {
    pub network: Arc<dyn NetworkGateway>,
    pub compute: Arc<dyn ComputeGateway>,
    pub iam: Arc<dyn IamGateway>,
    pub logs: Arc<dyn LogsGateway>,
}

impl Gateways {
    /// Serve every capability from one recorded inventory
    pub fn from_snapshot(snapshot: Arc<SnapshotGateway>) -> Self {
        Self {
            network: snapshot.clone(),
            compute: snapshot.clone(),
            iam: snapshot.clone(),
            logs: snapshot,
        }
    }
}

impl std::fmt::Debug for Gateways {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateways").finish_non_exhaustive()
    }
}
