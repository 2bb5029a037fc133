//! Machine-readable validation report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::duplicates::DuplicatePceResource;
use super::result::ValidationResult;
use super::standards::MpcRole;
use super::{ValidationError, ValidationStep};

/// Schema version for validation reports
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Schema identifier for validation reports
pub const REPORT_SCHEMA_ID: &str = "pce-toolkit/validation_report@1";

/// Outcome of one `validate` run over a PCE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub schema_version: u32,
    pub schema_id: String,
    pub created_at: DateTime<Utc>,
    pub pce_id: String,
    pub region: String,
    pub role: MpcRole,
    /// Duplicated resource types; validation is not run when non-empty
    pub duplicates: Vec<DuplicatePceResource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_steps: Vec<ValidationStep>,
    /// Non-SUCCESS findings, in step order
    pub results: Vec<ValidationResult>,
    /// SHA-256 of the JCS-canonical findings, stable across runs with equal findings
    pub results_digest: String,
    pub passed: bool,
}

impl ValidationReport {
    pub fn build(
        pce_id: &str,
        region: &str,
        role: MpcRole,
        duplicates: Vec<DuplicatePceResource>,
        skipped_steps: Vec<ValidationStep>,
        results: Vec<ValidationResult>,
    ) -> Result<Self, ValidationError> {
        let results_digest = digest(&results)?;
        let passed = duplicates.is_empty() && !results.iter().any(ValidationResult::is_error);
        Ok(Self {
            schema_version: REPORT_SCHEMA_VERSION,
            schema_id: REPORT_SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            pce_id: pce_id.to_string(),
            region: region.to_string(),
            role,
            duplicates,
            skipped_steps,
            results,
            results_digest,
            passed,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 0 = no ERROR findings and no duplicates, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.passed {
            0
        } else {
            1
        }
    }
}

fn digest(results: &[ValidationResult]) -> Result<String, ValidationError> {
    let jcs_bytes = serde_json_canonicalizer::to_vec(&results)
        .map_err(|e| ValidationError::Report(e.to_string()))?;
    let mut hasher = Sha256::new();
    hasher.update(&jcs_bytes);
    Ok(hex::encode(hasher.finalize()))
}
