//! Per-command substep view
//!
//! Re-simulates a step's commands one at a time so a host can preview the
//! deck after every command. The view is derived: it never feeds back into
//! the timeline.

use serde::Serialize;

use crate::commands::Command;
use crate::config::SimulationConfig;
use crate::context::InvariantContext;
use crate::errors::CommandCreatorWarning;
use crate::robot_state::{apply_command, RobotState};
use crate::strip_no_ops::strip_no_op_commands;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Substep {
    pub command: Command,
    /// State after `command`
    pub robot_state: RobotState,
    pub warnings: Vec<CommandCreatorWarning>,
}

/// One [`Substep`] per command, starting from `state`
pub fn substep_timeline(
    commands: &[Command],
    ctx: &InvariantContext,
    state: &RobotState,
    config: &SimulationConfig,
) -> Vec<Substep> {
    let commands = if config.strip_no_op_substeps {
        strip_no_op_commands(commands)
    } else {
        commands.to_vec()
    };

    let mut current = state.clone();
    let mut substeps = Vec::with_capacity(commands.len());
    for command in commands {
        let update = apply_command(current, &command, ctx);
        current = update.robot_state.clone();
        substeps.push(Substep {
            command,
            robot_state: update.robot_state,
            warnings: if config.collect_warnings {
                update.warnings
            } else {
                Vec::new()
            },
        });
    }
    tracing::debug!(
        op = "substep_timeline",
        substep_count = substeps.len(),
        "substeps simulated"
    );
    substeps
}
