//! PCE snapshot loader
//!
//! Assembles a [`Pce`] from the gateways by scanning every resource tagged
//! with the environment's id. Duplicates are not resolved here: the first
//! match wins, which is only meaningful once the duplicate check has passed.

use pce_entities::{Pce, PceCompute, PceNetwork};
use tracing::debug;

use crate::gateway::{Gateways, GatewayResult, TagFilter};

/// Load the network and compute topology of one PCE
pub fn load_pce(pce_id: &str, region: &str, gateways: &Gateways) -> GatewayResult<Pce> {
    let filter = TagFilter::pce(pce_id);

    let vpc = gateways.network.describe_vpcs(&filter)?.into_iter().next();
    let vpc_id = vpc.as_ref().map(|v| v.vpc_id.clone());
    let in_vpc = |id: &str| vpc_id.as_deref().map_or(true, |v| v == id);

    let subnets = gateways
        .network
        .describe_subnets(&filter)?
        .into_iter()
        .filter(|s| in_vpc(&s.vpc_id))
        .collect();

    let route_table = gateways
        .network
        .describe_route_tables(&filter)?
        .into_iter()
        .find(|rt| in_vpc(&rt.vpc_id));

    let firewall_rulesets = gateways
        .network
        .describe_firewall_rulesets(&filter)?
        .into_iter()
        .filter(|fr| in_vpc(&fr.vpc_id))
        .collect();

    let vpc_peering = match vpc_id.as_deref() {
        Some(id) => gateways.network.describe_vpc_peerings(id)?.into_iter().next(),
        None => None,
    };

    let cluster = gateways.compute.describe_clusters(&filter)?.into_iter().next();
    let container_definition = gateways
        .compute
        .describe_container_definitions(&filter)?
        .into_iter()
        .next();

    debug!(
        pce_id,
        vpc = ?vpc_id,
        has_cluster = cluster.is_some(),
        has_container_definition = container_definition.is_some(),
        "loaded PCE snapshot"
    );

    Ok(Pce {
        pce_id: pce_id.to_string(),
        region: region.to_string(),
        pce_network: PceNetwork {
            vpc,
            subnets,
            route_table,
            vpc_peering,
            firewall_rulesets,
        },
        pce_compute: PceCompute {
            cluster,
            container_definition,
        },
    })
}
