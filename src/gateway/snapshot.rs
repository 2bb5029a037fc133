//! Recorded cloud inventory served through the gateway traits
//!
//! A `CloudInventory` is a JSON dump of everything the gateways would return
//! for one region. `SnapshotGateway` answers gateway calls from it, applying
//! the same tag and VPC filters a live gateway would.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use pce_entities::{
    Cluster, ContainerDefinition, FirewallRuleset, IamRole, LogGroup, RouteTable, Subnet, Vpc,
    VpcPeering,
};
use serde::{Deserialize, Serialize};

use super::{
    ComputeGateway, GatewayError, GatewayResult, IamGateway, LogsGateway, NetworkGateway,
    TagFilter,
};

/// Everything the gateways can see in one region
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudInventory {
    pub region: String,
    #[serde(default)]
    pub availability_zones: Vec<String>,
    #[serde(default)]
    pub vpcs: Vec<Vpc>,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
    #[serde(default)]
    pub route_tables: Vec<RouteTable>,
    #[serde(default)]
    pub firewall_rulesets: Vec<FirewallRuleset>,
    #[serde(default)]
    pub vpc_peerings: Vec<VpcPeering>,
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    #[serde(default)]
    pub container_definitions: Vec<ContainerDefinition>,
    #[serde(default)]
    pub roles: Vec<IamRole>,
    #[serde(default)]
    pub log_groups: Vec<LogGroup>,
    /// Container definition id -> `awslogs-group` of its task definition
    #[serde(default)]
    pub task_log_groups: BTreeMap<String, String>,
}

/// Gateway backed by a recorded inventory
#[derive(Debug, Clone, Default)]
pub struct SnapshotGateway {
    inventory: CloudInventory,
    /// Operations that fail with `Unavailable` (failure injection)
    failing: BTreeSet<String>,
}

impl SnapshotGateway {
    pub fn new(inventory: CloudInventory) -> Self {
        Self {
            inventory,
            failing: BTreeSet::new(),
        }
    }

    /// Load an inventory dump from a JSON file
    pub fn from_file(path: &Path) -> GatewayResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => GatewayError::NotFound(path.display().to_string()),
            _ => GatewayError::Io(e),
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> GatewayResult<Self> {
        let inventory: CloudInventory = serde_json::from_str(json)?;
        Ok(Self::new(inventory))
    }

    /// Make every call to `operation` fail
    pub fn with_failure(mut self, operation: &str) -> Self {
        self.failing.insert(operation.to_string());
        self
    }

    pub fn inventory(&self) -> &CloudInventory {
        &self.inventory
    }

    fn check(&self, operation: &str) -> GatewayResult<()> {
        if self.failing.contains(operation) {
            return Err(GatewayError::Unavailable {
                operation: operation.to_string(),
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

fn tagged<T: pce_entities::Tagged + Clone>(items: &[T], filter: &TagFilter) -> Vec<T> {
    items.iter().filter(|i| filter.matches(*i)).cloned().collect()
}

impl NetworkGateway for SnapshotGateway {
    fn describe_vpcs(&self, filter: &TagFilter) -> GatewayResult<Vec<Vpc>> {
        self.check("describe_vpcs")?;
        Ok(tagged(&self.inventory.vpcs, filter))
    }

    fn describe_subnets(&self, filter: &TagFilter) -> GatewayResult<Vec<Subnet>> {
        self.check("describe_subnets")?;
        Ok(tagged(&self.inventory.subnets, filter))
    }

    fn describe_route_tables(&self, filter: &TagFilter) -> GatewayResult<Vec<RouteTable>> {
        self.check("describe_route_tables")?;
        Ok(tagged(&self.inventory.route_tables, filter))
    }

    fn describe_firewall_rulesets(
        &self,
        filter: &TagFilter,
    ) -> GatewayResult<Vec<FirewallRuleset>> {
        self.check("describe_firewall_rulesets")?;
        Ok(tagged(&self.inventory.firewall_rulesets, filter))
    }

    fn describe_vpc_peerings(&self, vpc_id: &str) -> GatewayResult<Vec<VpcPeering>> {
        self.check("describe_vpc_peerings")?;
        Ok(self
            .inventory
            .vpc_peerings
            .iter()
            .filter(|p| p.involves(vpc_id))
            .cloned()
            .collect())
    }

    fn describe_availability_zones(&self) -> GatewayResult<Vec<String>> {
        self.check("describe_availability_zones")?;
        Ok(self.inventory.availability_zones.clone())
    }
}

impl ComputeGateway for SnapshotGateway {
    fn describe_clusters(&self, filter: &TagFilter) -> GatewayResult<Vec<Cluster>> {
        self.check("describe_clusters")?;
        Ok(tagged(&self.inventory.clusters, filter))
    }

    fn describe_container_definitions(
        &self,
        filter: &TagFilter,
    ) -> GatewayResult<Vec<ContainerDefinition>> {
        self.check("describe_container_definitions")?;
        Ok(tagged(&self.inventory.container_definitions, filter))
    }

    fn extract_log_group_name(
        &self,
        container_definition_id: &str,
    ) -> GatewayResult<Option<String>> {
        self.check("extract_log_group_name")?;
        Ok(self
            .inventory
            .task_log_groups
            .get(container_definition_id)
            .cloned())
    }
}

impl IamGateway for SnapshotGateway {
    fn get_policies_for_role(&self, role_id: &str) -> GatewayResult<Option<IamRole>> {
        self.check("get_policies_for_role")?;
        Ok(self
            .inventory
            .roles
            .iter()
            .find(|r| r.role_id == role_id)
            .cloned())
    }
}

impl LogsGateway for SnapshotGateway {
    fn describe_log_group(&self, log_group_name: &str) -> GatewayResult<Option<LogGroup>> {
        self.check("describe_log_group")?;
        Ok(self
            .inventory
            .log_groups
            .iter()
            .find(|g| g.log_group_name == log_group_name)
            .cloned())
    }
}
