//! Finding and remediation message templates

use std::fmt;

/// What a validation step found wrong
#[derive(Debug, Clone)]
pub(crate) enum Description<'a> {
    VpcNotSet,
    VpcCidrNotSet { vpc_id: &'a str },
    VpcInvalidCidr { vpc_id: &'a str, cidr: &'a str },
    VpcNonPrivateCidr { vpc_id: &'a str, cidr: &'a str, expected: &'a str },
    VpcPeeringNotSet,
    VpcPeeringPendingAcceptance { peering_id: &'a str },
    VpcPeeringUnacceptableState { peering_id: &'a str, status: String },
    FirewallRulesetsNotSet { vpc_id: &'a str },
    RouteTableNotSet,
    FirewallCidrNotOverlapsVpc { peer_cidr: &'a str, vpc_id: &'a str },
    FirewallCidrCantContainExpectedRange { port_range: PortRange<'a> },
    FirewallCidrExceedsExpectedRange { port_range: PortRange<'a> },
    RouteTableVpcPeeringMissing { route_table_id: &'a str },
    RouteTableIgwMissing { route_table_id: &'a str },
    RouteTableIgwInactive { route_table_id: &'a str, igw_id: &'a str },
    SubnetsZoneMismatch { region: &'a str, used: String },
    ContainerDefinitionNotSet,
    ContainerCpuMismatch { value: u32, expected: u32 },
    ContainerMemoryMismatch { value: u32, expected: u32 },
    ContainerImageMismatch { value: &'a str, expected: &'a str },
    IamPoliciesNotFound { role_id: &'a str },
    IamWrongPolicy { role_id: &'a str, candidates: String },
    IamMoreThanOnePolicy { role_id: &'a str, extra: String },
    LogGroupNotConfigured { container_definition_id: &'a str },
    LogGroupNotFound { log_group_name: &'a str },
}

/// An ingress rule's port range measured against the expected band
#[derive(Debug, Clone, Copy)]
pub(crate) struct PortRange<'a> {
    pub ruleset_id: &'a str,
    pub rule_cidr: &'a str,
    pub from: u16,
    pub to: u16,
    pub expected_from: u16,
    pub expected_to: u16,
}

impl fmt::Display for Description<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Description::VpcNotSet => write!(f, "VPC is not set"),
            Description::VpcCidrNotSet { vpc_id } => {
                write!(f, "VPC {} has no CIDR block", vpc_id)
            }
            Description::VpcInvalidCidr { vpc_id, cidr } => {
                write!(f, "VPC {} has an invalid CIDR block '{}'", vpc_id, cidr)
            }
            Description::VpcNonPrivateCidr { vpc_id, cidr, expected } => write!(
                f,
                "VPC {} CIDR {} is not a private network within {}",
                vpc_id, cidr, expected
            ),
            Description::VpcPeeringNotSet => write!(f, "VPC peering connection is not set"),
            Description::VpcPeeringPendingAcceptance { peering_id } => write!(
                f,
                "VPC peering connection {} is pending acceptance",
                peering_id
            ),
            Description::VpcPeeringUnacceptableState { peering_id, status } => write!(
                f,
                "VPC peering connection {} is in an unacceptable state: {}",
                peering_id, status
            ),
            Description::FirewallRulesetsNotSet { vpc_id } => {
                write!(f, "No firewall rulesets found in VPC {}", vpc_id)
            }
            Description::RouteTableNotSet => write!(f, "Route table is not set"),
            Description::FirewallCidrNotOverlapsVpc { peer_cidr, vpc_id } => write!(
                f,
                "No ingress rule in VPC {} overlaps the peer route {}",
                vpc_id, peer_cidr
            ),
            Description::FirewallCidrCantContainExpectedRange { port_range: p } => write!(
                f,
                "Ingress rule {} in firewall ruleset {} allows ports {}-{}, which cannot contain expected range {}-{}",
                p.rule_cidr, p.ruleset_id, p.from, p.to, p.expected_from, p.expected_to
            ),
            Description::FirewallCidrExceedsExpectedRange { port_range: p } => write!(
                f,
                "Ingress rule {} in firewall ruleset {} allows ports {}-{}, which exceeds expected range {}-{}",
                p.rule_cidr, p.ruleset_id, p.from, p.to, p.expected_from, p.expected_to
            ),
            Description::RouteTableVpcPeeringMissing { route_table_id } => write!(
                f,
                "Route table {} has no active VPC peering route",
                route_table_id
            ),
            Description::RouteTableIgwMissing { route_table_id } => write!(
                f,
                "Route table {} has no internet gateway route for 0.0.0.0/0",
                route_table_id
            ),
            Description::RouteTableIgwInactive { route_table_id, igw_id } => write!(
                f,
                "Internet gateway route {} in route table {} is not active",
                igw_id, route_table_id
            ),
            Description::SubnetsZoneMismatch { region, used } => write!(
                f,
                "Subnets must cover every availability zone in {}; zones in use: {}",
                region, used
            ),
            Description::ContainerDefinitionNotSet => write!(f, "Container definition is not set"),
            Description::ContainerCpuMismatch { value, expected } => {
                write!(f, "CPU is {}, expected {}", value, expected)
            }
            Description::ContainerMemoryMismatch { value, expected } => {
                write!(f, "Memory is {} MiB, expected {} MiB", value, expected)
            }
            Description::ContainerImageMismatch { value, expected } => {
                write!(f, "Image is {}, expected {}", value, expected)
            }
            Description::IamPoliciesNotFound { role_id } => {
                write!(f, "No policies are attached to task role {}", role_id)
            }
            Description::IamWrongPolicy { role_id, candidates } => write!(
                f,
                "Task role {} has no policy matching the expected task policy; attached: {}",
                role_id, candidates
            ),
            Description::IamMoreThanOnePolicy { role_id, extra } => write!(
                f,
                "Task role {} has policies attached besides the task policy: {}",
                role_id, extra
            ),
            Description::LogGroupNotConfigured { container_definition_id } => write!(
                f,
                "Logging is not configured in task definition {}",
                container_definition_id
            ),
            Description::LogGroupNotFound { log_group_name } => write!(
                f,
                "Logs not found: log group {} does not exist",
                log_group_name
            ),
        }
    }
}

/// How to fix a finding
#[derive(Debug, Clone)]
pub(crate) enum Hint<'a> {
    VpcCidr { expected: &'a str },
    VpcPeeringAccept,
    VpcPeeringCreate,
    VpcPeeringRecreate,
    FirewallAddIngress { peer_cidr: &'a str, from: u16, to: u16 },
    FirewallFixPorts { port_range: PortRange<'a> },
    RouteTableAddPeering,
    RouteTableAddIgw,
    RouteTableActivateIgw { igw_id: &'a str },
    SubnetsAddZones { missing: String },
    SubnetsRemoveZones { extra: String },
    IamAttachTaskPolicy { role_id: &'a str },
    IamDetachExtra { role_id: &'a str, extra: String },
    LogGroupConfigure,
    LogGroupCreate { log_group_name: &'a str },
}

impl fmt::Display for Hint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hint::VpcCidr { expected } => {
                write!(f, "Recreate the VPC with a private CIDR block inside {}", expected)
            }
            Hint::VpcPeeringAccept => write!(f, "Accept the pending VPC peering request"),
            Hint::VpcPeeringCreate => write!(
                f,
                "Create a VPC peering connection with the other party and accept it"
            ),
            Hint::VpcPeeringRecreate => write!(
                f,
                "Delete the VPC peering connection and request a new one"
            ),
            Hint::FirewallAddIngress { peer_cidr, from, to } => write!(
                f,
                "Add an ingress rule for {} on ports {}-{}",
                peer_cidr, from, to
            ),
            Hint::FirewallFixPorts { port_range: p } => write!(
                f,
                "Set the port range of ingress rule {} in {} to {}-{}",
                p.rule_cidr, p.ruleset_id, p.expected_from, p.expected_to
            ),
            Hint::RouteTableAddPeering => write!(
                f,
                "Add a route to the other party's VPC CIDR through the peering connection"
            ),
            Hint::RouteTableAddIgw => write!(
                f,
                "Add a route for 0.0.0.0/0 through the VPC's internet gateway"
            ),
            Hint::RouteTableActivateIgw { igw_id } => write!(
                f,
                "Reattach internet gateway {} to the VPC so its route becomes active",
                igw_id
            ),
            Hint::SubnetsAddZones { missing } => {
                write!(f, "Add subnets in availability zones: {}", missing)
            }
            Hint::SubnetsRemoveZones { extra } => write!(
                f,
                "Remove subnets in availability zones outside the region: {}",
                extra
            ),
            Hint::IamAttachTaskPolicy { role_id } => {
                write!(f, "Attach the standard task policy to role {}", role_id)
            }
            Hint::IamDetachExtra { role_id, extra } => {
                write!(f, "Detach {} from role {}", extra, role_id)
            }
            Hint::LogGroupConfigure => write!(
                f,
                "Add an awslogs log configuration to the task definition"
            ),
            Hint::LogGroupCreate { log_group_name } => {
                write!(f, "Create log group {}", log_group_name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_range_messages() {
        let p = PortRange {
            ruleset_id: "sg-1",
            rule_cidr: "12.4.0.0/16",
            from: 5001,
            to: 15500,
            expected_from: 5000,
            expected_to: 15500,
        };
        let d = Description::FirewallCidrCantContainExpectedRange { port_range: p };
        assert_eq!(
            d.to_string(),
            "Ingress rule 12.4.0.0/16 in firewall ruleset sg-1 allows ports 5001-15500, which cannot contain expected range 5000-15500"
        );
        assert_eq!(
            Hint::FirewallFixPorts { port_range: p }.to_string(),
            "Set the port range of ingress rule 12.4.0.0/16 in sg-1 to 5000-15500"
        );
    }
}
