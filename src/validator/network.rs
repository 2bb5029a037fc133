//! Network steps: VPC CIDR, peering, firewall, route table, subnets

use std::collections::BTreeSet;

use ipnetwork::Ipv4Network;
use pce_entities::{Pce, RouteState, RouteTargetType, VpcPeeringState};

use super::messages::{Description, Hint, PortRange};
use super::result::ValidationResult;
use super::standards::{
    parse_cidr, MpcRole, IGW_ROUTE_DESTINATION_CIDR_BLOCK, IGW_ROUTE_TARGET_PREFIX,
};
use super::suite::ValidationSuite;
use super::ValidationStep;
use crate::gateway::GatewayError;

impl ValidationSuite {
    /// VPC CIDR must be private and inside the role's base CIDR
    pub fn validate_vpc_cidr(&self, pce: &Pce) -> Result<ValidationResult, GatewayError> {
        let step = ValidationStep::VpcCidr.code_name();
        let vpc = match pce.pce_network.vpc {
            Some(ref vpc) => vpc,
            None => return Ok(ValidationResult::error(step, Description::VpcNotSet.to_string())),
        };
        let expected = self.standards.base_cidr(self.role);
        let hint = Hint::VpcCidr { expected }.to_string();

        let (vpc_net, base) = match (parse_cidr(&vpc.cidr), parse_cidr(expected)) {
            (Ok(vpc_net), Ok(base)) => (vpc_net, base),
            _ => {
                let description = Description::VpcInvalidCidr {
                    vpc_id: &vpc.vpc_id,
                    cidr: &vpc.cidr,
                };
                return Ok(ValidationResult::error(step, description.to_string()).with_hint(hint));
            }
        };

        if vpc_net.network().is_private() && vpc_net.is_subnet_of(base) {
            Ok(ValidationResult::success(step))
        } else {
            let description = Description::VpcNonPrivateCidr {
                vpc_id: &vpc.vpc_id,
                cidr: &vpc.cidr,
                expected,
            };
            Ok(ValidationResult::error(step, description.to_string()).with_hint(hint))
        }
    }

    /// Peering connection must exist and be ACTIVE
    pub fn validate_vpc_peering(&self, pce: &Pce) -> Result<ValidationResult, GatewayError> {
        let step = ValidationStep::VpcPeering.code_name();

        let peering = match self.role {
            MpcRole::Partner => pce.pce_network.vpc_peering.clone(),
            MpcRole::Publisher => match pce.pce_network.vpc_id() {
                Some(vpc_id) => self
                    .network
                    .describe_vpc_peerings(vpc_id)?
                    .into_iter()
                    .find(|p| p.accepter_vpc_id == vpc_id),
                None => None,
            },
        };

        let peering = match peering {
            Some(peering) => peering,
            None => {
                return Ok(ValidationResult::error(step, Description::VpcPeeringNotSet.to_string())
                    .with_hint(Hint::VpcPeeringCreate.to_string()))
            }
        };

        let result = match peering.status {
            VpcPeeringState::Active => ValidationResult::success(step),
            VpcPeeringState::PendingAcceptance => ValidationResult::warning(
                step,
                Description::VpcPeeringPendingAcceptance {
                    peering_id: &peering.id,
                }
                .to_string(),
            )
            .with_hint(Hint::VpcPeeringAccept.to_string()),
            VpcPeeringState::Rejected | VpcPeeringState::NotReady | VpcPeeringState::Unknown => {
                ValidationResult::error(
                    step,
                    Description::VpcPeeringUnacceptableState {
                        peering_id: &peering.id,
                        status: peering.status.as_str().to_string(),
                    }
                    .to_string(),
                )
                .with_hint(Hint::VpcPeeringRecreate.to_string())
            }
        };
        Ok(result)
    }

    /// Every peer route must be admitted by an ingress rule covering the MPC port band
    pub fn validate_firewall(&self, pce: &Pce) -> Result<ValidationResult, GatewayError> {
        let step = ValidationStep::Firewall.code_name();
        let network = &pce.pce_network;

        // Preconditions are checked in order; the first missing one is reported.
        let vpc = match network.vpc {
            Some(ref vpc) => vpc,
            None => return Ok(ValidationResult::error(step, Description::VpcNotSet.to_string())),
        };
        if vpc.cidr.is_empty() {
            let description = Description::VpcCidrNotSet { vpc_id: &vpc.vpc_id };
            return Ok(ValidationResult::error(step, description.to_string()));
        }
        if network.firewall_rulesets.is_empty() {
            let description = Description::FirewallRulesetsNotSet { vpc_id: &vpc.vpc_id };
            return Ok(ValidationResult::error(step, description.to_string()));
        }
        let route_table = match network.route_table {
            Some(ref rt) => rt,
            None => {
                return Ok(ValidationResult::error(step, Description::RouteTableNotSet.to_string()))
            }
        };

        let expected_from = self.standards.firewall_from_port;
        let expected_to = self.standards.firewall_to_port;

        let mut errors = Vec::new();
        let mut hints = Vec::new();
        let mut warnings = Vec::new();

        let peer_routes = route_table
            .routes
            .iter()
            .filter(|r| r.route_target.route_target_type == RouteTargetType::VpcPeering);

        for route in peer_routes {
            let peer_cidr = route.destination_cidr_block.as_str();
            let peer_net = peer_cidr.parse::<Ipv4Network>().ok();
            let mut overlapped = false;

            for ruleset in &network.firewall_rulesets {
                for rule in &ruleset.ingress {
                    let overlaps = match (peer_net, rule.cidr.parse::<Ipv4Network>()) {
                        (Some(peer), Ok(rule_net)) => peer.overlaps(rule_net),
                        _ => false,
                    };
                    if !overlaps {
                        continue;
                    }
                    overlapped = true;

                    let port_range = PortRange {
                        ruleset_id: &ruleset.id,
                        rule_cidr: &rule.cidr,
                        from: rule.from_port,
                        to: rule.to_port,
                        expected_from,
                        expected_to,
                    };
                    // A band narrower than expected blocks MPC traffic and is an
                    // error; a wider band only loosens the firewall and is a warning.
                    if rule.from_port > expected_from || rule.to_port < expected_to {
                        errors.push(
                            Description::FirewallCidrCantContainExpectedRange { port_range }
                                .to_string(),
                        );
                        hints.push(Hint::FirewallFixPorts { port_range }.to_string());
                    } else if rule.from_port < expected_from || rule.to_port > expected_to {
                        warnings.push(
                            Description::FirewallCidrExceedsExpectedRange { port_range }
                                .to_string(),
                        );
                    }
                }
            }

            if !overlapped {
                errors.push(
                    Description::FirewallCidrNotOverlapsVpc {
                        peer_cidr,
                        vpc_id: &vpc.vpc_id,
                    }
                    .to_string(),
                );
                hints.push(
                    Hint::FirewallAddIngress {
                        peer_cidr,
                        from: expected_from,
                        to: expected_to,
                    }
                    .to_string(),
                );
            }
        }

        if !errors.is_empty() {
            Ok(ValidationResult::error(step, errors.join(";")).with_hint(hints.join(";")))
        } else if !warnings.is_empty() {
            Ok(ValidationResult::warning(step, warnings.join(";")))
        } else {
            Ok(ValidationResult::success(step))
        }
    }

    /// Route table needs an active peering route and an active 0.0.0.0/0 IGW route
    pub fn validate_route_table(&self, pce: &Pce) -> Result<ValidationResult, GatewayError> {
        let step = ValidationStep::RouteTable.code_name();
        let route_table = match pce.pce_network.route_table {
            Some(ref rt) => rt,
            None => {
                return Ok(ValidationResult::error(step, Description::RouteTableNotSet.to_string()))
            }
        };

        if !route_table.routes.iter().any(|r| r.is_active_peering()) {
            let description = Description::RouteTableVpcPeeringMissing {
                route_table_id: &route_table.id,
            };
            return Ok(ValidationResult::error(step, description.to_string())
                .with_hint(Hint::RouteTableAddPeering.to_string()));
        }

        let igw_route = route_table.routes.iter().find(|r| {
            r.route_target.route_target_id.starts_with(IGW_ROUTE_TARGET_PREFIX)
                && r.destination_cidr_block == IGW_ROUTE_DESTINATION_CIDR_BLOCK
        });

        let result = match igw_route {
            None => ValidationResult::error(
                step,
                Description::RouteTableIgwMissing {
                    route_table_id: &route_table.id,
                }
                .to_string(),
            )
            .with_hint(Hint::RouteTableAddIgw.to_string()),
            Some(route) if route.state != RouteState::Active => {
                let igw_id = route.route_target.route_target_id.as_str();
                ValidationResult::error(
                    step,
                    Description::RouteTableIgwInactive {
                        route_table_id: &route_table.id,
                        igw_id,
                    }
                    .to_string(),
                )
                .with_hint(Hint::RouteTableActivateIgw { igw_id }.to_string())
            }
            Some(_) => ValidationResult::success(step),
        };
        Ok(result)
    }

    /// Subnet zones must equal the region's zones exactly
    pub fn validate_subnets(&self, pce: &Pce) -> Result<ValidationResult, GatewayError> {
        let step = ValidationStep::Subnets.code_name();

        let used: BTreeSet<String> = pce
            .pce_network
            .subnets
            .iter()
            .map(|s| s.availability_zone.clone())
            .collect();
        let all: BTreeSet<String> = self
            .network
            .describe_availability_zones()?
            .into_iter()
            .collect();

        if used == all {
            return Ok(ValidationResult::success(step));
        }

        let used_list = if used.is_empty() {
            "none".to_string()
        } else {
            join(used.iter())
        };
        let missing: Vec<_> = all.difference(&used).collect();
        let hint = if missing.is_empty() {
            Hint::SubnetsRemoveZones {
                extra: join(used.difference(&all)),
            }
        } else {
            Hint::SubnetsAddZones {
                missing: join(missing.into_iter()),
            }
        };

        let description = Description::SubnetsZoneMismatch {
            region: &pce.region,
            used: used_list,
        };
        Ok(ValidationResult::error(step, description.to_string()).with_hint(hint.to_string()))
    }
}

fn join<'a>(items: impl Iterator<Item = &'a String>) -> String {
    items.map(String::as_str).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{CloudInventory, Gateways, SnapshotGateway};
    use crate::validator::ValidationResultCode;
    use pce_entities::{
        FirewallRule, FirewallRuleset, Route, RouteTable, RouteTarget, Subnet, Vpc, VpcPeering,
        VpcPeeringRole,
    };
    use std::sync::Arc;

    fn suite(role: MpcRole, inventory: CloudInventory) -> ValidationSuite {
        let gateways = Gateways::from_snapshot(Arc::new(SnapshotGateway::new(inventory)));
        ValidationSuite::new(role, &gateways)
    }

    fn pce_with_vpc(cidr: &str) -> Pce {
        let mut pce = Pce::new("pce-1", "us-west-2");
        pce.pce_network.vpc = Some(Vpc {
            vpc_id: "vpc-1".to_string(),
            cidr: cidr.to_string(),
            tags: Default::default(),
        });
        pce
    }

    fn route(dest: &str, target_id: &str, kind: RouteTargetType, state: RouteState) -> Route {
        Route {
            destination_cidr_block: dest.to_string(),
            route_target: RouteTarget {
                route_target_id: target_id.to_string(),
                route_target_type: kind,
            },
            state,
        }
    }

    fn with_firewall(mut pce: Pce, rule_cidr: &str, from: u16, to: u16) -> Pce {
        pce.pce_network.firewall_rulesets = vec![FirewallRuleset {
            id: "sg-1".to_string(),
            vpc_id: "vpc-1".to_string(),
            ingress: vec![FirewallRule {
                from_port: from,
                to_port: to,
                ip_protocol: "tcp".to_string(),
                cidr: rule_cidr.to_string(),
            }],
            egress: vec![],
            tags: Default::default(),
        }];
        pce.pce_network.route_table = Some(RouteTable {
            id: "rtb-1".to_string(),
            vpc_id: "vpc-1".to_string(),
            routes: vec![route(
                "12.4.1.0/24",
                "pcx-1",
                RouteTargetType::VpcPeering,
                RouteState::Active,
            )],
            tags: Default::default(),
        });
        pce
    }

    fn peering(id: &str, status: VpcPeeringState, requester: &str, accepter: &str) -> VpcPeering {
        VpcPeering {
            id: id.to_string(),
            status,
            role: VpcPeeringRole::Accepter,
            requester_vpc_id: requester.to_string(),
            accepter_vpc_id: accepter.to_string(),
            requester_vpc_cidr: None,
            accepter_vpc_cidr: None,
            tags: Default::default(),
        }
    }

    fn ingress(cidr: &str, from: u16, to: u16) -> FirewallRule {
        FirewallRule {
            from_port: from,
            to_port: to,
            ip_protocol: "tcp".to_string(),
            cidr: cidr.to_string(),
        }
    }

    /// Partner PCE with the given ingress rules and one peering route per peer CIDR
    fn with_peer_routes(rules: Vec<FirewallRule>, peer_cidrs: &[&str]) -> Pce {
        let mut pce = with_firewall(pce_with_vpc("10.1.0.0/16"), "12.4.0.0/16", 5000, 15500);
        pce.pce_network.firewall_rulesets[0].ingress = rules;
        let mut routes = vec![route(
            "0.0.0.0/0",
            "igw-1",
            RouteTargetType::Internet,
            RouteState::Active,
        )];
        for (i, cidr) in peer_cidrs.iter().enumerate() {
            let target = format!("pcx-{}", i + 1);
            routes.push(route(cidr, &target, RouteTargetType::VpcPeering, RouteState::Active));
        }
        if let Some(rt) = pce.pce_network.route_table.as_mut() {
            rt.routes = routes;
        }
        pce
    }

    #[test]
    fn test_vpc_cidr_partner_success() {
        let s = suite(MpcRole::Partner, CloudInventory::default());
        let result = s.validate_vpc_cidr(&pce_with_vpc("10.1.0.0/16")).unwrap();
        assert_eq!(result.code, ValidationResultCode::Success);
    }

    #[test]
    fn test_vpc_cidr_non_private() {
        let s = suite(MpcRole::Partner, CloudInventory::default());
        let result = s.validate_vpc_cidr(&pce_with_vpc("173.16.0.0/12")).unwrap();
        assert_eq!(result.code, ValidationResultCode::Error);
        assert!(result.description.unwrap().contains("vpc-1"));
    }

    #[test]
    fn test_vpc_cidr_wrong_base_for_role() {
        let s = suite(MpcRole::Publisher, CloudInventory::default());
        let result = s.validate_vpc_cidr(&pce_with_vpc("10.1.0.0/16")).unwrap();
        assert_eq!(result.code, ValidationResultCode::Error);

        let result = s.validate_vpc_cidr(&pce_with_vpc("10.0.4.0/24")).unwrap();
        assert_eq!(result.code, ValidationResultCode::Success);
    }

    #[test]
    fn test_vpc_cidr_missing_vpc() {
        let s = suite(MpcRole::Partner, CloudInventory::default());
        let result = s.validate_vpc_cidr(&Pce::new("pce-1", "us-west-2")).unwrap();
        assert_eq!(result.code, ValidationResultCode::Error);
        assert_eq!(result.description.as_deref(), Some("VPC is not set"));
    }

    #[test]
    fn test_firewall_exact_band_success() {
        let s = suite(MpcRole::Partner, CloudInventory::default());
        let pce = with_firewall(pce_with_vpc("10.1.0.0/16"), "12.4.0.0/16", 5000, 15500);
        assert!(s.validate_firewall(&pce).unwrap().is_success());
    }

    #[test]
    fn test_firewall_narrow_band_error() {
        let s = suite(MpcRole::Partner, CloudInventory::default());
        let pce = with_firewall(pce_with_vpc("10.1.0.0/16"), "12.4.0.0/16", 5001, 15500);
        let result = s.validate_firewall(&pce).unwrap();
        assert_eq!(result.code, ValidationResultCode::Error);
        assert!(result.description.unwrap().contains("cannot contain expected range"));
        assert!(result.solution_hint.unwrap().contains("5000-15500"));
    }

    #[test]
    fn test_firewall_wide_band_warning() {
        let s = suite(MpcRole::Partner, CloudInventory::default());
        let pce = with_firewall(pce_with_vpc("10.1.0.0/16"), "12.4.0.0/16", 4999, 15500);
        let result = s.validate_firewall(&pce).unwrap();
        assert_eq!(result.code, ValidationResultCode::Warning);
        assert!(result.description.unwrap().contains("exceeds expected range"));
    }

    #[test]
    fn test_firewall_no_overlapping_rule() {
        let s = suite(MpcRole::Partner, CloudInventory::default());
        let pce = with_firewall(pce_with_vpc("10.1.0.0/16"), "13.0.0.0/16", 5000, 15500);
        let result = s.validate_firewall(&pce).unwrap();
        assert_eq!(result.code, ValidationResultCode::Error);
        assert!(result.description.unwrap().contains("overlaps the peer route 12.4.1.0/24"));
    }

    #[test]
    fn test_firewall_precondition_order() {
        let s = suite(MpcRole::Partner, CloudInventory::default());

        let mut pce = pce_with_vpc("");
        let result = s.validate_firewall(&pce).unwrap();
        assert_eq!(result.description.as_deref(), Some("VPC vpc-1 has no CIDR block"));

        pce = pce_with_vpc("10.1.0.0/16");
        let result = s.validate_firewall(&pce).unwrap();
        assert_eq!(
            result.description.as_deref(),
            Some("No firewall rulesets found in VPC vpc-1")
        );

        pce = with_firewall(pce, "12.4.0.0/16", 5000, 15500);
        pce.pce_network.route_table = None;
        let result = s.validate_firewall(&pce).unwrap();
        assert_eq!(result.description.as_deref(), Some("Route table is not set"));
    }

    #[test]
    fn test_vpc_peering_status_mapping() {
        let s = suite(MpcRole::Partner, CloudInventory::default());
        let mut pce = pce_with_vpc("10.1.0.0/16");

        let active = peering("pcx-1", VpcPeeringState::Active, "vpc-9", "vpc-1");
        pce.pce_network.vpc_peering = Some(active);
        assert!(s.validate_vpc_peering(&pce).unwrap().is_success());

        pce.pce_network.vpc_peering = Some(peering(
            "pcx-1",
            VpcPeeringState::PendingAcceptance,
            "vpc-9",
            "vpc-1",
        ));
        let result = s.validate_vpc_peering(&pce).unwrap();
        assert_eq!(result.code, ValidationResultCode::Warning);
        assert_eq!(
            result.description.as_deref(),
            Some("VPC peering connection pcx-1 is pending acceptance")
        );
        assert_eq!(
            result.solution_hint.as_deref(),
            Some("Accept the pending VPC peering request")
        );

        for (status, name) in [
            (VpcPeeringState::Rejected, "REJECTED"),
            (VpcPeeringState::NotReady, "NOT_READY"),
            (VpcPeeringState::Unknown, "UNKNOWN"),
        ] {
            pce.pce_network.vpc_peering = Some(peering("pcx-1", status, "vpc-9", "vpc-1"));
            let result = s.validate_vpc_peering(&pce).unwrap();
            assert_eq!(result.code, ValidationResultCode::Error);
            assert_eq!(
                result.description.unwrap(),
                format!("VPC peering connection pcx-1 is in an unacceptable state: {}", name)
            );
            assert_eq!(
                result.solution_hint.as_deref(),
                Some("Delete the VPC peering connection and request a new one")
            );
        }
    }

    #[test]
    fn test_vpc_peering_missing_is_error() {
        let s = suite(MpcRole::Partner, CloudInventory::default());
        let result = s.validate_vpc_peering(&pce_with_vpc("10.1.0.0/16")).unwrap();
        assert_eq!(result.code, ValidationResultCode::Error);
        assert_eq!(
            result.description.as_deref(),
            Some("VPC peering connection is not set")
        );
        assert_eq!(
            result.solution_hint.as_deref(),
            Some("Create a VPC peering connection with the other party and accept it")
        );
    }

    #[test]
    fn test_vpc_peering_publisher_uses_accepter_side_from_gateway() {
        let inventory = CloudInventory {
            region: "us-west-2".to_string(),
            vpc_peerings: vec![
                peering("pcx-out", VpcPeeringState::Active, "vpc-1", "vpc-9"),
                peering("pcx-in", VpcPeeringState::PendingAcceptance, "vpc-9", "vpc-1"),
            ],
            ..Default::default()
        };
        let s = suite(MpcRole::Publisher, inventory);

        // The PCE's own peering field is ignored for the publisher.
        let mut pce = pce_with_vpc("10.0.4.0/24");
        let outgoing = peering("pcx-out", VpcPeeringState::Active, "vpc-1", "vpc-9");
        pce.pce_network.vpc_peering = Some(outgoing);

        let result = s.validate_vpc_peering(&pce).unwrap();
        assert_eq!(result.code, ValidationResultCode::Warning);
        assert!(result.description.unwrap().contains("pcx-in"));
    }

    #[test]
    fn test_vpc_peering_publisher_requester_side_only_is_missing() {
        let inventory = CloudInventory {
            region: "us-west-2".to_string(),
            vpc_peerings: vec![peering("pcx-out", VpcPeeringState::Active, "vpc-1", "vpc-9")],
            ..Default::default()
        };
        let s = suite(MpcRole::Publisher, inventory);

        let result = s.validate_vpc_peering(&pce_with_vpc("10.0.4.0/24")).unwrap();
        assert_eq!(result.code, ValidationResultCode::Error);
        assert_eq!(
            result.description.as_deref(),
            Some("VPC peering connection is not set")
        );

        let result = s.validate_vpc_peering(&Pce::new("pce-1", "us-west-2")).unwrap();
        assert_eq!(result.code, ValidationResultCode::Error);
    }

    #[test]
    fn test_firewall_errors_joined_in_route_order() {
        let s = suite(MpcRole::Partner, CloudInventory::default());
        let pce = with_peer_routes(
            vec![ingress("12.4.0.0/16", 5001, 15500)],
            &["13.5.0.0/16", "12.4.1.0/24"],
        );

        let result = s.validate_firewall(&pce).unwrap();
        assert_eq!(result.code, ValidationResultCode::Error);
        assert_eq!(
            result.description.as_deref(),
            Some(
                "No ingress rule in VPC vpc-1 overlaps the peer route 13.5.0.0/16;\
                 Ingress rule 12.4.0.0/16 in firewall ruleset sg-1 allows ports 5001-15500, \
                 which cannot contain expected range 5000-15500"
            )
        );
        assert_eq!(
            result.solution_hint.as_deref(),
            Some(
                "Add an ingress rule for 13.5.0.0/16 on ports 5000-15500;\
                 Set the port range of ingress rule 12.4.0.0/16 in sg-1 to 5000-15500"
            )
        );
    }

    #[test]
    fn test_firewall_errors_suppress_warnings() {
        let s = suite(MpcRole::Partner, CloudInventory::default());
        let pce = with_peer_routes(
            vec![ingress("12.4.0.0/16", 4999, 15500)],
            &["12.4.1.0/24", "13.5.0.0/16"],
        );

        let result = s.validate_firewall(&pce).unwrap();
        assert_eq!(result.code, ValidationResultCode::Error);
        assert_eq!(
            result.description.as_deref(),
            Some("No ingress rule in VPC vpc-1 overlaps the peer route 13.5.0.0/16")
        );
        assert_eq!(
            result.solution_hint.as_deref(),
            Some("Add an ingress rule for 13.5.0.0/16 on ports 5000-15500")
        );
    }

    #[test]
    fn test_firewall_warnings_joined_in_route_order() {
        let s = suite(MpcRole::Partner, CloudInventory::default());
        let pce = with_peer_routes(
            vec![
                ingress("12.4.0.0/16", 4999, 15500),
                ingress("13.5.0.0/16", 5000, 16000),
            ],
            &["13.5.1.0/24", "12.4.1.0/24"],
        );

        let result = s.validate_firewall(&pce).unwrap();
        assert_eq!(result.code, ValidationResultCode::Warning);
        let description = result.description.unwrap();
        let reasons: Vec<_> = description.split(';').collect();
        assert_eq!(reasons.len(), 2);
        assert!(reasons[0].starts_with("Ingress rule 13.5.0.0/16"));
        assert!(reasons[1].starts_with("Ingress rule 12.4.0.0/16"));
        assert!(result.solution_hint.is_none());
    }

    #[test]
    fn test_route_table_inactive_peering_counts_as_missing() {
        let s = suite(MpcRole::Partner, CloudInventory::default());
        let mut pce = pce_with_vpc("10.1.0.0/16");
        pce.pce_network.route_table = Some(RouteTable {
            id: "rtb-1".to_string(),
            vpc_id: "vpc-1".to_string(),
            routes: vec![
                route("12.4.1.0/24", "pcx-1", RouteTargetType::VpcPeering, RouteState::Blackhole),
                route("0.0.0.0/0", "igw-1", RouteTargetType::Internet, RouteState::Active),
            ],
            tags: Default::default(),
        });

        let result = s.validate_route_table(&pce).unwrap();
        assert_eq!(result.code, ValidationResultCode::Error);
        assert!(result.description.unwrap().contains("no active VPC peering route"));
    }

    #[test]
    fn test_route_table_igw_inactive() {
        let s = suite(MpcRole::Partner, CloudInventory::default());
        let mut pce = pce_with_vpc("10.1.0.0/16");
        pce.pce_network.route_table = Some(RouteTable {
            id: "rtb-1".to_string(),
            vpc_id: "vpc-1".to_string(),
            routes: vec![
                route("12.4.1.0/24", "pcx-1", RouteTargetType::VpcPeering, RouteState::Active),
                route("0.0.0.0/0", "igw-1", RouteTargetType::Internet, RouteState::Blackhole),
            ],
            tags: Default::default(),
        });

        let result = s.validate_route_table(&pce).unwrap();
        assert_eq!(result.code, ValidationResultCode::Error);
        assert!(result.description.unwrap().contains("igw-1"));
    }

    #[test]
    fn test_route_table_igw_wrong_destination() {
        let s = suite(MpcRole::Partner, CloudInventory::default());
        let mut pce = pce_with_vpc("10.1.0.0/16");
        pce.pce_network.route_table = Some(RouteTable {
            id: "rtb-1".to_string(),
            vpc_id: "vpc-1".to_string(),
            routes: vec![
                route("12.4.1.0/24", "pcx-1", RouteTargetType::VpcPeering, RouteState::Active),
                route("8.8.0.0/16", "igw-1", RouteTargetType::Internet, RouteState::Active),
            ],
            tags: Default::default(),
        });

        let result = s.validate_route_table(&pce).unwrap();
        assert!(result.description.unwrap().contains("no internet gateway route"));
    }

    #[test]
    fn test_subnets_must_match_region_exactly() {
        let inventory = CloudInventory {
            region: "us-west-2".to_string(),
            availability_zones: vec!["us-west-2a".to_string(), "us-west-2b".to_string()],
            ..Default::default()
        };
        let s = suite(MpcRole::Partner, inventory);

        let mut pce = pce_with_vpc("10.1.0.0/16");
        let result = s.validate_subnets(&pce).unwrap();
        assert_eq!(result.code, ValidationResultCode::Error);
        assert!(result.description.unwrap().ends_with("zones in use: none"));
        assert_eq!(
            result.solution_hint.as_deref(),
            Some("Add subnets in availability zones: us-west-2a, us-west-2b")
        );

        for (id, az) in [("subnet-a", "us-west-2a"), ("subnet-b", "us-west-2b")] {
            pce.pce_network.subnets.push(Subnet {
                subnet_id: id.to_string(),
                vpc_id: "vpc-1".to_string(),
                availability_zone: az.to_string(),
                tags: Default::default(),
            });
        }
        assert!(s.validate_subnets(&pce).unwrap().is_success());

        pce.pce_network.subnets.push(Subnet {
            subnet_id: "subnet-c".to_string(),
            vpc_id: "vpc-1".to_string(),
            availability_zone: "us-west-2c".to_string(),
            tags: Default::default(),
        });
        let result = s.validate_subnets(&pce).unwrap();
        assert_eq!(result.code, ValidationResultCode::Error);
        assert!(result.solution_hint.unwrap().contains("us-west-2c"));
    }
}
