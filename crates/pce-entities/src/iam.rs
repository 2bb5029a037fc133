//! IAM roles and CloudWatch log groups

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An IAM policy document, kept as raw JSON
pub type PolicyContents = serde_json::Value;

/// Role with the policies attached to it, keyed by policy name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IamRole {
    pub role_id: String,
    #[serde(default)]
    pub attached_policy_contents: BTreeMap<String, PolicyContents>,
}

/// CloudWatch log group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogGroup {
    pub log_group_name: String,
}
