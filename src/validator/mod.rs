//! PCE validation suite
//!
//! Checks that a customer's environment matches the standard topology before
//! an MPC job runs there:
//!
//! 1. `vpc_cidr` - private VPC CIDR inside the role's base CIDR
//! 2. `vpc_peering` - peering connection exists and is active
//! 3. `firewall` - ingress rules admit the MPC port band from every peer route
//! 4. `route_table` - active peering route and active internet gateway route
//! 5. `subnets` - subnets cover exactly the region's availability zones
//! 6. `cluster_definition` - container cpu/memory/image match the standard
//! 7. `iam_roles` - the task role carries exactly the standard task policy
//! 8. `log_group` - task logs go to an existing log group
//!
//! Findings are data, not errors: every step yields one [`ValidationResult`].
//! Only gateway failures and bad parameters surface as [`ValidationError`].

mod compute;
mod duplicates;
mod messages;
mod network;
mod report;
mod result;
mod standards;
mod suite;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::gateway::GatewayError;

pub use duplicates::{DuplicatePceResource, DuplicatePceResourcesChecker};
pub use report::{ValidationReport, REPORT_SCHEMA_ID, REPORT_SCHEMA_VERSION};
pub use result::{ValidationResult, ValidationResultCode};
pub use standards::{
    task_policy, MpcRole, ValidationStandards, CONTAINER_CPU, CONTAINER_IMAGE, CONTAINER_MEMORY,
    DEFAULT_PARTNER_VPC_CIDR, DEFAULT_VPC_CIDR, FIREWALL_RULE_FINAL_PORT,
    FIREWALL_RULE_INITIAL_PORT, IGW_ROUTE_DESTINATION_CIDR_BLOCK, IGW_ROUTE_TARGET_PREFIX,
};
pub use suite::ValidationSuite;

/// Parameter errors and collaborator failures
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Unknown validation step '{0}'")]
    UnknownStep(String),

    #[error("Unknown MPC role '{0}'")]
    UnknownRole(String),

    #[error("Invalid CIDR '{cidr}': {reason}")]
    InvalidCidr { cidr: String, reason: String },

    #[error("Invalid validation standard: {0}")]
    InvalidStandard(String),

    #[error("Failed to build report: {0}")]
    Report(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// A named validation step, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStep {
    VpcCidr,
    VpcPeering,
    Firewall,
    RouteTable,
    Subnets,
    ClusterDefinition,
    IamRoles,
    LogGroup,
}

impl ValidationStep {
    /// Every step in the order the suite runs them
    pub const ALL: [ValidationStep; 8] = [
        ValidationStep::VpcCidr,
        ValidationStep::VpcPeering,
        ValidationStep::Firewall,
        ValidationStep::RouteTable,
        ValidationStep::Subnets,
        ValidationStep::ClusterDefinition,
        ValidationStep::IamRoles,
        ValidationStep::LogGroup,
    ];

    /// Name used for skipping and in results
    pub fn code_name(&self) -> &'static str {
        match self {
            ValidationStep::VpcCidr => "vpc_cidr",
            ValidationStep::VpcPeering => "vpc_peering",
            ValidationStep::Firewall => "firewall",
            ValidationStep::RouteTable => "route_table",
            ValidationStep::Subnets => "subnets",
            ValidationStep::ClusterDefinition => "cluster_definition",
            ValidationStep::IamRoles => "iam_roles",
            ValidationStep::LogGroup => "log_group",
        }
    }

    /// Parse a list of step names, rejecting any that do not exist
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<ValidationStep>, ValidationError> {
        names.iter().map(|n| n.as_ref().parse()).collect()
    }
}

impl fmt::Display for ValidationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code_name())
    }
}

impl FromStr for ValidationStep {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValidationStep::ALL
            .iter()
            .copied()
            .find(|step| step.code_name() == s)
            .ok_or_else(|| ValidationError::UnknownStep(s.to_string()))
    }
}
