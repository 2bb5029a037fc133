//! The standard PCE topology the validator checks against

use std::fmt;
use std::str::FromStr;

use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::ValidationError;

/// Base CIDR for publisher (default role) environments
pub const DEFAULT_VPC_CIDR: &str = "10.0.0.0/16";

/// Base CIDR for partner environments
pub const DEFAULT_PARTNER_VPC_CIDR: &str = "10.1.0.0/16";

/// MPC traffic port band, inclusive
pub const FIREWALL_RULE_INITIAL_PORT: u16 = 5000;
pub const FIREWALL_RULE_FINAL_PORT: u16 = 15500;

pub const CONTAINER_CPU: u32 = 4096;
pub const CONTAINER_MEMORY: u32 = 30720;
pub const CONTAINER_IMAGE: &str = "onedocker/pce-worker:latest";

pub const IGW_ROUTE_TARGET_PREFIX: &str = "igw-";
pub const IGW_ROUTE_DESTINATION_CIDR_BLOCK: &str = "0.0.0.0/0";

/// The only policy the task role may carry
pub fn task_policy() -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Action": [
                    "s3:GetObject",
                    "s3:PutObject",
                    "s3:ListBucket"
                ],
                "Resource": ["*"]
            }
        ]
    })
}

/// Which side of the computation the environment hosts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MpcRole {
    #[default]
    Publisher,
    Partner,
}

impl MpcRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MpcRole::Publisher => "publisher",
            MpcRole::Partner => "partner",
        }
    }
}

impl fmt::Display for MpcRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MpcRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "publisher" => Ok(MpcRole::Publisher),
            "partner" => Ok(MpcRole::Partner),
            _ => Err(ValidationError::UnknownRole(s.to_string())),
        }
    }
}

/// Expected values for every standard the suite checks.
///
/// `Default` yields the fixed standard; config may override individual values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationStandards {
    pub publisher_vpc_cidr: String,
    pub partner_vpc_cidr: String,
    pub firewall_from_port: u16,
    pub firewall_to_port: u16,
    pub container_cpu: u32,
    pub container_memory: u32,
    pub container_image: String,
    pub task_policy: Value,
}

impl Default for ValidationStandards {
    fn default() -> Self {
        Self {
            publisher_vpc_cidr: DEFAULT_VPC_CIDR.to_string(),
            partner_vpc_cidr: DEFAULT_PARTNER_VPC_CIDR.to_string(),
            firewall_from_port: FIREWALL_RULE_INITIAL_PORT,
            firewall_to_port: FIREWALL_RULE_FINAL_PORT,
            container_cpu: CONTAINER_CPU,
            container_memory: CONTAINER_MEMORY,
            container_image: CONTAINER_IMAGE.to_string(),
            task_policy: task_policy(),
        }
    }
}

impl ValidationStandards {
    /// Reject standards that could never be met
    pub fn validate(&self) -> Result<(), ValidationError> {
        parse_cidr(&self.publisher_vpc_cidr)?;
        parse_cidr(&self.partner_vpc_cidr)?;
        if self.firewall_from_port > self.firewall_to_port {
            return Err(ValidationError::InvalidStandard(format!(
                "firewall port band {}-{} is empty",
                self.firewall_from_port, self.firewall_to_port
            )));
        }
        if self.container_cpu == 0 || self.container_memory == 0 {
            return Err(ValidationError::InvalidStandard(
                "container cpu and memory must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Base CIDR the VPC must sit inside for `role`
    pub fn base_cidr(&self, role: MpcRole) -> &str {
        match role {
            MpcRole::Partner => &self.partner_vpc_cidr,
            MpcRole::Publisher => &self.publisher_vpc_cidr,
        }
    }
}

pub(crate) fn parse_cidr(cidr: &str) -> Result<Ipv4Network, ValidationError> {
    cidr.parse::<Ipv4Network>()
        .map_err(|e| ValidationError::InvalidCidr {
            cidr: cidr.to_string(),
            reason: e.to_string(),
        })
}
