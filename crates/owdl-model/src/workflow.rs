//! Workflow definition and structural checks.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::OwdlParseError;
use crate::state::OwdlState;

fn state_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("state name pattern is valid"))
}

/// Parsed workflow definition. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OwdlWorkflow {
    pub starts_at: String,
    pub states: BTreeMap<String, OwdlState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl OwdlWorkflow {
    /// Parse and validate a workflow definition.
    pub fn from_json(json: &str) -> Result<Self, OwdlParseError> {
        let workflow: OwdlWorkflow = serde_json::from_str(json)?;
        workflow.validate()?;
        Ok(workflow)
    }

    /// Serialize back to the definition format
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Look up a state by name
    pub fn state(&self, name: &str) -> Option<&OwdlState> {
        self.states.get(name)
    }

    /// Check that the state graph is closed and every state is runnable.
    pub fn validate(&self) -> Result<(), OwdlParseError> {
        if self.states.is_empty() {
            return Err(OwdlParseError::NoStates);
        }
        if !self.states.contains_key(&self.starts_at) {
            return Err(OwdlParseError::UnknownStartState(self.starts_at.clone()));
        }

        for (name, state) in &self.states {
            if !state_name_pattern().is_match(name) {
                return Err(OwdlParseError::InvalidStateName(name.clone()));
            }
            if state.cmd_args_list.is_empty() {
                return Err(OwdlParseError::EmptyCmdArgs(name.clone()));
            }
            match (&state.next, state.end) {
                (_, true) => {}
                (Some(next), false) => {
                    if !self.states.contains_key(next) {
                        return Err(OwdlParseError::UnknownNextState {
                            from: name.clone(),
                            next: next.clone(),
                        });
                    }
                }
                (None, false) => return Err(OwdlParseError::DanglingState(name.clone())),
            }
        }

        Ok(())
    }
}
