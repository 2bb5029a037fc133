//! PCE entities
//!
//! Read-only snapshots of the cloud resources that make up a private
//! computation environment (PCE). The gateway layer produces these; the
//! validator and the workflow driver only consume them.

pub mod compute;
pub mod container;
pub mod iam;
pub mod network;
pub mod pce;

use std::collections::BTreeMap;

pub use compute::{Cluster, ClusterStatus, ContainerDefinition};
pub use container::{ContainerInstance, ContainerInstanceStatus};
pub use iam::{IamRole, LogGroup, PolicyContents};
pub use network::{
    FirewallRule, FirewallRuleset, Route, RouteState, RouteTable, RouteTarget, RouteTargetType,
    Subnet, Vpc, VpcPeering, VpcPeeringRole, VpcPeeringState,
};
pub use pce::{Pce, PceCompute, PceNetwork};

/// Tag key every PCE resource carries; the value is the PCE id
pub const PCE_ID_TAG: &str = "pce:pce-id";

/// Resource tags, ordered for stable serialization
pub type Tags = BTreeMap<String, String>;

/// A resource that carries cloud tags
pub trait Tagged {
    fn tags(&self) -> &Tags;

    /// Check whether the resource carries `key=value`
    fn has_tag(&self, key: &str, value: &str) -> bool {
        self.tags().get(key).map(String::as_str) == Some(value)
    }

    /// Check whether the resource belongs to the given PCE
    fn belongs_to_pce(&self, pce_id: &str) -> bool {
        self.has_tag(PCE_ID_TAG, pce_id)
    }
}
