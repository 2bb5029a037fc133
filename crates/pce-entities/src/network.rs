//! Network resources: VPC, subnets, route tables, peering and firewall rules

use serde::{Deserialize, Serialize};

use crate::{Tagged, Tags};

/// Virtual private cloud
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vpc {
    pub vpc_id: String,
    /// IPv4 CIDR block, e.g. "10.0.0.0/16"
    pub cidr: String,
    #[serde(default)]
    pub tags: Tags,
}

impl Tagged for Vpc {
    fn tags(&self) -> &Tags {
        &self.tags
    }
}

/// Subnet inside a VPC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub subnet_id: String,
    #[serde(default)]
    pub vpc_id: String,
    pub availability_zone: String,
    #[serde(default)]
    pub tags: Tags,
}

impl Tagged for Subnet {
    fn tags(&self) -> &Tags {
        &self.tags
    }
}

/// Kind of target a route forwards to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteTargetType {
    /// Internet gateway
    Internet,
    /// VPC peering connection
    VpcPeering,
    /// Anything else (local, NAT, endpoints)
    #[serde(other)]
    Other,
}

/// Route target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTarget {
    pub route_target_id: String,
    pub route_target_type: RouteTargetType,
}

/// Route state as reported by the cloud provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteState {
    Active,
    Blackhole,
    #[serde(other)]
    Unknown,
}

/// A single route table entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub destination_cidr_block: String,
    pub route_target: RouteTarget,
    pub state: RouteState,
}

impl Route {
    /// Active route to a VPC peering connection
    pub fn is_active_peering(&self) -> bool {
        self.route_target.route_target_type == RouteTargetType::VpcPeering
            && self.state == RouteState::Active
    }
}

/// Route table attached to the PCE VPC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    pub id: String,
    #[serde(default)]
    pub vpc_id: String,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub tags: Tags,
}

impl Tagged for RouteTable {
    fn tags(&self) -> &Tags {
        &self.tags
    }
}

/// Peering connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VpcPeeringState {
    Active,
    PendingAcceptance,
    Rejected,
    NotReady,
    #[serde(other)]
    Unknown,
}

impl VpcPeeringState {
    pub fn as_str(&self) -> &'static str {
        match self {
            VpcPeeringState::Active => "ACTIVE",
            VpcPeeringState::PendingAcceptance => "PENDING_ACCEPTANCE",
            VpcPeeringState::Rejected => "REJECTED",
            VpcPeeringState::NotReady => "NOT_READY",
            VpcPeeringState::Unknown => "UNKNOWN",
        }
    }
}

/// Which side of the peering connection this PCE is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VpcPeeringRole {
    Requester,
    Accepter,
}

/// VPC peering connection between two parties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcPeering {
    pub id: String,
    pub status: VpcPeeringState,
    pub role: VpcPeeringRole,
    pub requester_vpc_id: String,
    pub accepter_vpc_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester_vpc_cidr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepter_vpc_cidr: Option<String>,
    #[serde(default)]
    pub tags: Tags,
}

impl VpcPeering {
    /// Whether `vpc_id` is either side of this connection
    pub fn involves(&self, vpc_id: &str) -> bool {
        self.requester_vpc_id == vpc_id || self.accepter_vpc_id == vpc_id
    }
}

impl Tagged for VpcPeering {
    fn tags(&self) -> &Tags {
        &self.tags
    }
}

/// One ingress or egress permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallRule {
    pub from_port: u16,
    pub to_port: u16,
    pub ip_protocol: String,
    pub cidr: String,
}

/// Security group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallRuleset {
    pub id: String,
    pub vpc_id: String,
    #[serde(default)]
    pub ingress: Vec<FirewallRule>,
    #[serde(default)]
    pub egress: Vec<FirewallRule>,
    #[serde(default)]
    pub tags: Tags,
}

impl Tagged for FirewallRuleset {
    fn tags(&self) -> &Tags {
        &self.tags
    }
}
