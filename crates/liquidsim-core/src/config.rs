//! Simulation configuration
//!
//! Hosts either use [`SimulationConfig::default`] or load overrides from a
//! JSON document. Unknown fields are rejected so typos surface early.

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Knobs controlling how a timeline is built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Keep simulating the remaining steps after a step fails, using the
    /// last valid robot state. When false the timeline ends at the first
    /// error frame.
    pub continue_after_error: bool,
    /// Attach warnings to success frames
    pub collect_warnings: bool,
    /// Strip no-op aspirate/dispense pairs before building the substep view
    pub strip_no_op_substeps: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            continue_after_error: true,
            collect_warnings: true,
            strip_no_op_substeps: true,
        }
    }
}

impl SimulationConfig {
    /// Parse a configuration document, filling missing fields with defaults
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the document is not a JSON object, names
    /// an unknown field or gives a field the wrong type.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
