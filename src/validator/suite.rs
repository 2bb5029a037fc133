//! Validation suite: the step table and its runner

use std::sync::Arc;

use pce_entities::Pce;
use tracing::{debug, info};

use super::result::{ValidationResult, ValidationResultCode};
use super::standards::{MpcRole, ValidationStandards};
use super::{ValidationError, ValidationStep};
use crate::gateway::{
    ComputeGateway, GatewayError, Gateways, IamGateway, LogsGateway, NetworkGateway,
};

type StepFn = fn(&ValidationSuite, &Pce) -> Result<ValidationResult, GatewayError>;

/// Step -> validator, in execution order
const VALIDATION_STEPS: [(ValidationStep, StepFn); 8] = [
    (ValidationStep::VpcCidr, ValidationSuite::validate_vpc_cidr as StepFn),
    (ValidationStep::VpcPeering, ValidationSuite::validate_vpc_peering as StepFn),
    (ValidationStep::Firewall, ValidationSuite::validate_firewall as StepFn),
    (ValidationStep::RouteTable, ValidationSuite::validate_route_table as StepFn),
    (ValidationStep::Subnets, ValidationSuite::validate_subnets as StepFn),
    (
        ValidationStep::ClusterDefinition,
        ValidationSuite::validate_cluster_definition as StepFn,
    ),
    (ValidationStep::IamRoles, ValidationSuite::validate_iam_roles as StepFn),
    (ValidationStep::LogGroup, ValidationSuite::validate_log_group as StepFn),
];

/// Rule engine over a loaded PCE snapshot.
///
/// Steps share nothing but the injected gateways, so each `validate_*`
/// method can be called on its own.
pub struct ValidationSuite {
    pub(super) role: MpcRole,
    pub(super) standards: ValidationStandards,
    pub(super) network: Arc<dyn NetworkGateway>,
    pub(super) compute: Arc<dyn ComputeGateway>,
    pub(super) iam: Arc<dyn IamGateway>,
    pub(super) logs: Arc<dyn LogsGateway>,
}

impl ValidationSuite {
    /// Suite checking against the fixed standard
    pub fn new(role: MpcRole, gateways: &Gateways) -> Self {
        Self {
            role,
            standards: ValidationStandards::default(),
            network: Arc::clone(&gateways.network),
            compute: Arc::clone(&gateways.compute),
            iam: Arc::clone(&gateways.iam),
            logs: Arc::clone(&gateways.logs),
        }
    }

    /// Suite checking against overridden standards
    pub fn with_standards(
        role: MpcRole,
        standards: ValidationStandards,
        gateways: &Gateways,
    ) -> Result<Self, ValidationError> {
        standards.validate()?;
        let mut suite = Self::new(role, gateways);
        suite.standards = standards;
        Ok(suite)
    }

    pub fn role(&self) -> MpcRole {
        self.role
    }

    pub fn standards(&self) -> &ValidationStandards {
        &self.standards
    }

    /// Run every step not in `skip_steps`, returning only non-SUCCESS results.
    ///
    /// Gateway failures abort the run.
    pub fn validate_network_and_compute(
        &self,
        pce: &Pce,
        skip_steps: &[ValidationStep],
    ) -> Result<Vec<ValidationResult>, GatewayError> {
        let to_run: Vec<_> = VALIDATION_STEPS
            .iter()
            .filter(|(step, _)| !skip_steps.contains(step))
            .collect();
        let total = to_run.len();

        let mut results = Vec::with_capacity(total);
        for (i, (step, validate)) in to_run.into_iter().enumerate() {
            info!(pce_id = %pce.pce_id, step = %step, "[{}/{}] validating", i + 1, total);
            let result = validate(self, pce)?;
            debug!(step = %step, code = %result.code, "step finished");
            results.push(result);
        }

        for step in skip_steps {
            info!(step = %step, "skipped");
        }

        Ok(results.into_iter().filter(|r| !r.is_success()).collect())
    }

    /// True when at least one result blocks the run
    pub fn contains_error_result(results: &[ValidationResult]) -> bool {
        results.iter().any(ValidationResult::is_error)
    }

    /// Human-readable multi-line summary of the findings
    pub fn summarize_errors(results: &[ValidationResult]) -> String {
        let errors = results.iter().filter(|r| r.is_error()).count();
        let warnings = results
            .iter()
            .filter(|r| r.code == ValidationResultCode::Warning)
            .count();

        if errors == 0 && warnings == 0 {
            return "Validation passed: no issues found".to_string();
        }

        let mut lines = vec![format!(
            "Validation found {} error(s) and {} warning(s):",
            errors, warnings
        )];
        for result in results.iter().filter(|r| !r.is_success()) {
            let step = result.step_name.as_deref().unwrap_or("unknown");
            let description = result.description.as_deref().unwrap_or("");
            lines.push(format!("  {} [{}]: {}", result.code, step, description));
            if let Some(ref hint) = result.solution_hint {
                lines.push(format!("      hint: {}", hint));
            }
        }
        lines.join("\n")
    }
}
