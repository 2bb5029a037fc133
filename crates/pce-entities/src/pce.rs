//! The PCE aggregate: a point-in-time view of one environment

use serde::{Deserialize, Serialize};

use crate::compute::{Cluster, ContainerDefinition};
use crate::network::{FirewallRuleset, RouteTable, Subnet, Vpc, VpcPeering};

/// Network half of a PCE
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PceNetwork {
    #[serde(default)]
    pub vpc: Option<Vpc>,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
    #[serde(default)]
    pub route_table: Option<RouteTable>,
    #[serde(default)]
    pub vpc_peering: Option<VpcPeering>,
    #[serde(default)]
    pub firewall_rulesets: Vec<FirewallRuleset>,
}

impl PceNetwork {
    pub fn vpc_id(&self) -> Option<&str> {
        self.vpc.as_ref().map(|v| v.vpc_id.as_str())
    }
}

/// Compute half of a PCE
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PceCompute {
    #[serde(default)]
    pub cluster: Option<Cluster>,
    #[serde(default)]
    pub container_definition: Option<ContainerDefinition>,
}

/// Private computation environment snapshot.
///
/// Assembled once per validation run and never written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pce {
    pub pce_id: String,
    pub region: String,
    #[serde(default)]
    pub pce_network: PceNetwork,
    #[serde(default)]
    pub pce_compute: PceCompute,
}

impl Pce {
    /// Empty environment, used as a starting point by loaders and tests
    pub fn new(pce_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            pce_id: pce_id.into(),
            region: region.into(),
            pce_network: PceNetwork::default(),
            pce_compute: PceCompute::default(),
        }
    }
}
