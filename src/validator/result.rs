//! Validation result value type

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Severity of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationResultCode {
    Success,
    Error,
    Warning,
}

impl ValidationResultCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationResultCode::Success => "SUCCESS",
            ValidationResultCode::Error => "ERROR",
            ValidationResultCode::Warning => "WARNING",
        }
    }
}

impl fmt::Display for ValidationResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one validation step.
///
/// Equality and hashing go through the rendered string, so two results that
/// print the same are the same finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub code: ValidationResultCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution_hint: Option<String>,
}

impl ValidationResult {
    pub fn success(step_name: &str) -> Self {
        Self {
            code: ValidationResultCode::Success,
            step_name: Some(step_name.to_string()),
            description: None,
            solution_hint: None,
        }
    }

    pub fn error(step_name: &str, description: impl Into<String>) -> Self {
        Self {
            code: ValidationResultCode::Error,
            step_name: Some(step_name.to_string()),
            description: Some(description.into()),
            solution_hint: None,
        }
    }

    pub fn warning(step_name: &str, description: impl Into<String>) -> Self {
        Self {
            code: ValidationResultCode::Warning,
            step_name: Some(step_name.to_string()),
            description: Some(description.into()),
            solution_hint: None,
        }
    }

    /// Attach a remediation hint
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.solution_hint = Some(hint.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.code == ValidationResultCode::Success
    }

    pub fn is_error(&self) -> bool {
        self.code == ValidationResultCode::Error
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)?;
        if let Some(ref step) = self.step_name {
            write!(f, " [{}]", step)?;
        }
        if let Some(ref description) = self.description {
            write!(f, ": {}", description)?;
        }
        if let Some(ref hint) = self.solution_hint {
            write!(f, " (hint: {})", hint)?;
        }
        Ok(())
    }
}

impl PartialEq for ValidationResult {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for ValidationResult {}

impl Hash for ValidationResult {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}
