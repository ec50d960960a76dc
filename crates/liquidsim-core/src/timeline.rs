//! Timeline builder
//!
//! Runs every step of a protocol in order, threading the robot state from
//! one step to the next, and records one frame per step. A failing step
//! never aborts the build; it becomes an error frame and the next step runs
//! against the last good state.
//!
//! - `log_op_start!` / `log_op_end!` bracket each build
//! - each error frame is logged at warn level with its first error's code
//! - a fresh `RunId` correlates the events of one build; it is not part of
//!   the returned timeline

use liquidsim_core_types::RunId;
use serde::Serialize;

use crate::command_creators::CommandCreatorResult;
use crate::commands::Command;
use crate::config::SimulationConfig;
use crate::context::InvariantContext;
use crate::errors::{CommandCreatorError, CommandCreatorWarning};
use crate::keys::KeyGenerator;
use crate::robot_state::RobotState;
use crate::steps::{command_creator_for_step, Step};
use crate::{log_op_end, log_op_error, log_op_start};

/// Outcome of one step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Frame {
    #[serde(rename_all = "camelCase")]
    Success {
        step_id: String,
        commands: Vec<Command>,
        robot_state: RobotState,
        warnings: Vec<CommandCreatorWarning>,
    },
    #[serde(rename_all = "camelCase")]
    Error {
        step_id: String,
        errors: Vec<CommandCreatorError>,
    },
}

impl Frame {
    pub fn step_id(&self) -> &str {
        match self {
            Frame::Success { step_id, .. } | Frame::Error { step_id, .. } => step_id,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Frame::Error { .. })
    }
}

/// Every frame of a simulated protocol plus the state it started from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub initial_state: RobotState,
    pub frames: Vec<Frame>,
}

impl Timeline {
    /// State after the last successful frame, or the initial state
    pub fn final_state(&self) -> &RobotState {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| match frame {
                Frame::Success { robot_state, .. } => Some(robot_state),
                Frame::Error { .. } => None,
            })
            .unwrap_or(&self.initial_state)
    }

    /// Every emitted command, in order
    pub fn commands(&self) -> Vec<&Command> {
        self.frames
            .iter()
            .flat_map(|frame| match frame {
                Frame::Success { commands, .. } => commands.as_slice(),
                Frame::Error { .. } => &[],
            })
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.frames.iter().any(Frame::is_error)
    }

    pub fn error_step_ids(&self) -> Vec<&str> {
        self.frames
            .iter()
            .filter(|frame| frame.is_error())
            .map(Frame::step_id)
            .collect()
    }
}

/// Simulate `steps` from `initial`
pub fn build_timeline(
    steps: &[Step],
    ctx: &InvariantContext,
    initial: RobotState,
    config: &SimulationConfig,
    keys: &mut dyn KeyGenerator,
) -> Timeline {
    let run_id = RunId::new();
    log_op_start!(
        "build_timeline",
        run_id = run_id.as_str(),
        step_count = steps.len()
    );
    let start = std::time::Instant::now();

    let mut frames = Vec::with_capacity(steps.len());
    let mut current = initial.clone();
    let mut command_count = 0usize;
    let mut error_count = 0usize;

    for step in steps {
        let creator = command_creator_for_step(&step.args);
        match creator(ctx, &current, &mut *keys) {
            CommandCreatorResult::Success {
                commands,
                robot_state,
                warnings,
            } => {
                tracing::debug!(
                    op = "build_timeline",
                    step_id = step.id.as_str(),
                    step_type = step.args.step_type(),
                    command_count = commands.len(),
                    "step simulated"
                );
                command_count += commands.len();
                current = robot_state.clone();
                frames.push(Frame::Success {
                    step_id: step.id.clone(),
                    commands,
                    robot_state,
                    warnings: if config.collect_warnings {
                        warnings
                    } else {
                        Vec::new()
                    },
                });
            }
            CommandCreatorResult::Failure { errors } => {
                error_count += 1;
                log_op_error!(
                    "build_timeline",
                    step.id.as_str(),
                    errors,
                    duration_ms = start.elapsed().as_millis() as u64,
                    run_id = run_id.as_str()
                );
                frames.push(Frame::Error {
                    step_id: step.id.clone(),
                    errors,
                });
                if !config.continue_after_error {
                    break;
                }
            }
        }
    }

    log_op_end!(
        "build_timeline",
        duration_ms = start.elapsed().as_millis() as u64,
        run_id = run_id.as_str(),
        command_count = command_count,
        error_count = error_count
    );

    Timeline {
        initial_state: initial,
        frames,
    }
}
