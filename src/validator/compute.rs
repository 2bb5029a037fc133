//! Compute steps: container definition, task role policies, log group

use pce_entities::Pce;

use super::messages::{Description, Hint};
use super::result::ValidationResult;
use super::suite::ValidationSuite;
use super::ValidationStep;
use crate::gateway::GatewayError;

impl ValidationSuite {
    /// CPU and memory must match exactly; a different image is only a warning
    pub fn validate_cluster_definition(&self, pce: &Pce) -> Result<ValidationResult, GatewayError> {
        let step = ValidationStep::ClusterDefinition.code_name();
        let definition = match pce.pce_compute.container_definition {
            Some(ref d) => d,
            None => {
                return Ok(ValidationResult::error(
                    step,
                    Description::ContainerDefinitionNotSet.to_string(),
                ))
            }
        };

        let mut errors = Vec::new();
        if definition.cpu != self.standards.container_cpu {
            errors.push(
                Description::ContainerCpuMismatch {
                    value: definition.cpu,
                    expected: self.standards.container_cpu,
                }
                .to_string(),
            );
        }
        if definition.memory != self.standards.container_memory {
            errors.push(
                Description::ContainerMemoryMismatch {
                    value: definition.memory,
                    expected: self.standards.container_memory,
                }
                .to_string(),
            );
        }

        let mut warnings = Vec::new();
        if definition.image != self.standards.container_image {
            warnings.push(
                Description::ContainerImageMismatch {
                    value: &definition.image,
                    expected: &self.standards.container_image,
                }
                .to_string(),
            );
        }

        if !errors.is_empty() {
            Ok(ValidationResult::error(step, errors.join(",")))
        } else if !warnings.is_empty() {
            Ok(ValidationResult::warning(step, warnings.join(",")))
        } else {
            Ok(ValidationResult::success(step))
        }
    }

    /// The task role must carry the standard task policy and nothing else
    pub fn validate_iam_roles(&self, pce: &Pce) -> Result<ValidationResult, GatewayError> {
        let step = ValidationStep::IamRoles.code_name();
        let definition = match pce.pce_compute.container_definition {
            Some(ref d) => d,
            None => {
                return Ok(ValidationResult::error(
                    step,
                    Description::ContainerDefinitionNotSet.to_string(),
                ))
            }
        };
        let role_id = definition.task_role_id.as_str();

        let policies = self
            .iam
            .get_policies_for_role(role_id)?
            .map(|role| role.attached_policy_contents)
            .unwrap_or_default();

        if policies.is_empty() {
            return Ok(ValidationResult::error(
                step,
                Description::IamPoliciesNotFound { role_id }.to_string(),
            )
            .with_hint(Hint::IamAttachTaskPolicy { role_id }.to_string()));
        }

        let matching = policies
            .iter()
            .find(|(_, contents)| **contents == self.standards.task_policy)
            .map(|(name, _)| name.as_str());

        let result = match matching {
            None => {
                let candidates = policies.keys().map(String::as_str).collect::<Vec<_>>();
                ValidationResult::error(
                    step,
                    Description::IamWrongPolicy {
                        role_id,
                        candidates: candidates.join(", "),
                    }
                    .to_string(),
                )
                .with_hint(Hint::IamAttachTaskPolicy { role_id }.to_string())
            }
            Some(name) if policies.len() > 1 => {
                let extra = policies
                    .keys()
                    .filter(|k| k.as_str() != name)
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                ValidationResult::warning(
                    step,
                    Description::IamMoreThanOnePolicy {
                        role_id,
                        extra: extra.clone(),
                    }
                    .to_string(),
                )
                .with_hint(Hint::IamDetachExtra { role_id, extra }.to_string())
            }
            Some(_) => ValidationResult::success(step),
        };
        Ok(result)
    }

    /// Task logs must go to a log group that exists.
    ///
    /// Both a missing log configuration and a missing log group are warnings:
    /// the job still runs, its logs are just lost. With no container
    /// definition there is nothing to look up, which is an error.
    pub fn validate_log_group(&self, pce: &Pce) -> Result<ValidationResult, GatewayError> {
        let step = ValidationStep::LogGroup.code_name();
        let definition = match pce.pce_compute.container_definition {
            Some(ref d) => d,
            None => {
                return Ok(ValidationResult::error(
                    step,
                    Description::ContainerDefinitionNotSet.to_string(),
                ))
            }
        };

        let log_group_name = match self.compute.extract_log_group_name(&definition.id)? {
            Some(name) => name,
            None => {
                return Ok(ValidationResult::warning(
                    step,
                    Description::LogGroupNotConfigured {
                        container_definition_id: &definition.id,
                    }
                    .to_string(),
                )
                .with_hint(Hint::LogGroupConfigure.to_string()))
            }
        };

        match self.logs.describe_log_group(&log_group_name)? {
            Some(group) if !group.log_group_name.is_empty() => Ok(ValidationResult::success(step)),
            _ => Ok(ValidationResult::warning(
                step,
                Description::LogGroupNotFound {
                    log_group_name: &log_group_name,
                }
                .to_string(),
            )
            .with_hint(
                Hint::LogGroupCreate {
                    log_group_name: &log_group_name,
                }
                .to_string(),
            )),
        }
    }
}
