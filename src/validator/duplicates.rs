//! Duplicate PCE resource detection
//!
//! Every resource type below must exist at most once per PCE id. More than
//! one match means the customer's account is mis-tagged, and validating such
//! an environment would check an arbitrary pick.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::gateway::{ComputeGateway, GatewayError, Gateways, NetworkGateway, TagFilter};

/// One resource type found more than once for a PCE id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicatePceResource {
    pub resource_name_plural: String,
    /// Offending ids joined with ", ", in gateway response order
    pub duplicate_resource_ids: String,
}

impl DuplicatePceResource {
    fn from_ids(resource_name_plural: &str, ids: Vec<String>) -> Option<Self> {
        if ids.len() > 1 {
            Some(Self {
                resource_name_plural: resource_name_plural.to_string(),
                duplicate_resource_ids: ids.join(", "),
            })
        } else {
            None
        }
    }
}

impl fmt::Display for DuplicatePceResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Multiple {} found: {}",
            self.resource_name_plural, self.duplicate_resource_ids
        )
    }
}

/// Scans the gateways for resource types tagged more than once
pub struct DuplicatePceResourcesChecker {
    network: Arc<dyn NetworkGateway>,
    compute: Arc<dyn ComputeGateway>,
}

impl DuplicatePceResourcesChecker {
    pub fn new(gateways: &Gateways) -> Self {
        Self {
            network: Arc::clone(&gateways.network),
            compute: Arc::clone(&gateways.compute),
        }
    }

    /// One entry per duplicated resource type; empty when the PCE is unambiguous.
    ///
    /// Gateway failures are not handled here.
    pub fn check_pce(&self, pce_id: &str) -> Result<Vec<DuplicatePceResource>, GatewayError> {
        let filter = TagFilter::pce(pce_id);
        let mut duplicates = Vec::new();

        let vpcs = self.network.describe_vpcs(&filter)?;
        let first_vpc_id = vpcs.first().map(|v| v.vpc_id.clone());
        duplicates.extend(DuplicatePceResource::from_ids(
            "VPCs",
            vpcs.into_iter().map(|v| v.vpc_id).collect(),
        ));

        let route_tables = self.network.describe_route_tables(&filter)?;
        duplicates.extend(DuplicatePceResource::from_ids(
            "Route Tables",
            route_tables.into_iter().map(|rt| rt.id).collect(),
        ));

        if let Some(vpc_id) = first_vpc_id {
            let peerings = self.network.describe_vpc_peerings(&vpc_id)?;
            duplicates.extend(DuplicatePceResource::from_ids(
                "VPC Peerings",
                peerings.into_iter().map(|p| p.id).collect(),
            ));
        }

        let clusters = self.compute.describe_clusters(&filter)?;
        duplicates.extend(DuplicatePceResource::from_ids(
            "Clusters",
            clusters.into_iter().map(|c| c.cluster_arn).collect(),
        ));

        let definitions = self.compute.describe_container_definitions(&filter)?;
        duplicates.extend(DuplicatePceResource::from_ids(
            "Container Definitions",
            definitions.into_iter().map(|d| d.id).collect(),
        ));

        for duplicate in &duplicates {
            warn!(
                pce_id,
                resource = %duplicate.resource_name_plural,
                ids = %duplicate.duplicate_resource_ids,
                "duplicate PCE resource"
            );
        }
        debug!(pce_id, duplicates = duplicates.len(), "duplicate check finished");

        Ok(duplicates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{CloudInventory, SnapshotGateway};
    use pce_entities::{Tags, Vpc, PCE_ID_TAG};

    fn vpc(id: &str, pce_id: &str) -> Vpc {
        let mut tags = Tags::new();
        tags.insert(PCE_ID_TAG.to_string(), pce_id.to_string());
        Vpc {
            vpc_id: id.to_string(),
            cidr: "10.0.0.0/16".to_string(),
            tags,
        }
    }

    #[test]
    fn test_single_resources_not_reported() {
        let inventory = CloudInventory {
            vpcs: vec![vpc("vpc-1", "pce-1"), vpc("vpc-2", "pce-2")],
            ..Default::default()
        };
        let gateways = Gateways::from_snapshot(Arc::new(SnapshotGateway::new(inventory)));
        let checker = DuplicatePceResourcesChecker::new(&gateways);
        assert!(checker.check_pce("pce-1").unwrap().is_empty());
    }

    #[test]
    fn test_ids_keep_gateway_order() {
        let inventory = CloudInventory {
            vpcs: vec![vpc("vpc-b", "pce-1"), vpc("vpc-a", "pce-1")],
            ..Default::default()
        };
        let gateways = Gateways::from_snapshot(Arc::new(SnapshotGateway::new(inventory)));
        let checker = DuplicatePceResourcesChecker::new(&gateways);
        let duplicates = checker.check_pce("pce-1").unwrap();
        assert_eq!(
            duplicates,
            vec![DuplicatePceResource {
                resource_name_plural: "VPCs".to_string(),
                duplicate_resource_ids: "vpc-b, vpc-a".to_string(),
            }]
        );
        assert_eq!(duplicates[0].to_string(), "Multiple VPCs found: vpc-b, vpc-a");
    }
}
