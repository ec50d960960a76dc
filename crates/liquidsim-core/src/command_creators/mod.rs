//! Command creators
//!
//! A command creator turns typed arguments plus the current robot state into
//! either commands and the state after them, or a list of errors. Atomic
//! creators emit exactly one command; compound creators chain other
//! creators through [`reduce_command_creators`].

pub mod atomic;
pub mod compound;

use crate::commands::{Command, CommandMeta, CommandParams};
use crate::context::InvariantContext;
use crate::errors::{CommandCreatorError, CommandCreatorWarning};
use crate::keys::KeyGenerator;
use crate::robot_state::{apply_command, RobotState};

/// Outcome of running a command creator
///
/// `Failure` always carries at least one error and no commands.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandCreatorResult {
    Success {
        commands: Vec<Command>,
        robot_state: RobotState,
        warnings: Vec<CommandCreatorWarning>,
    },
    Failure {
        errors: Vec<CommandCreatorError>,
    },
}

impl CommandCreatorResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandCreatorResult::Success { .. })
    }

    pub fn commands(&self) -> &[Command] {
        match self {
            CommandCreatorResult::Success { commands, .. } => commands,
            CommandCreatorResult::Failure { .. } => &[],
        }
    }

    pub fn errors(&self) -> &[CommandCreatorError] {
        match self {
            CommandCreatorResult::Success { .. } => &[],
            CommandCreatorResult::Failure { errors } => errors,
        }
    }

    pub fn warnings(&self) -> &[CommandCreatorWarning] {
        match self {
            CommandCreatorResult::Success { warnings, .. } => warnings,
            CommandCreatorResult::Failure { .. } => &[],
        }
    }

    pub fn robot_state(&self) -> Option<&RobotState> {
        match self {
            CommandCreatorResult::Success { robot_state, .. } => Some(robot_state),
            CommandCreatorResult::Failure { .. } => None,
        }
    }

    pub(crate) fn failure(errors: Vec<CommandCreatorError>) -> Self {
        debug_assert!(!errors.is_empty());
        CommandCreatorResult::Failure { errors }
    }
}

/// Creator signature shared by every atomic and compound creator
pub type CommandCreator<P> =
    fn(&P, &InvariantContext, &RobotState, &mut dyn KeyGenerator) -> CommandCreatorResult;

/// A creator with its arguments already bound
///
/// Curried creators can be built on one thread and run on another.
pub type CurriedCommandCreator<'a> = Box<
    dyn Fn(&InvariantContext, &RobotState, &mut dyn KeyGenerator) -> CommandCreatorResult
        + Send
        + Sync
        + 'a,
>;

/// Bind `params` to `creator`
pub fn curry<'a, P>(creator: CommandCreator<P>, params: P) -> CurriedCommandCreator<'a>
where
    P: Send + Sync + 'a,
{
    Box::new(move |ctx: &InvariantContext, state: &RobotState, keys: &mut dyn KeyGenerator| {
        creator(&params, ctx, state, keys)
    })
}

/// Run creators in order, each against the state left by the previous one
///
/// The first failure ends the chain and is returned as is; commands from
/// earlier creators are discarded.
pub fn reduce_command_creators(
    creators: Vec<CurriedCommandCreator<'_>>,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let mut commands = Vec::new();
    let mut warnings = Vec::new();
    let mut current = state.clone();

    for creator in creators {
        match creator(ctx, &current, &mut *keys) {
            CommandCreatorResult::Success {
                commands: next_commands,
                robot_state,
                warnings: next_warnings,
            } => {
                commands.extend(next_commands);
                warnings.extend(next_warnings);
                current = robot_state;
            }
            failure @ CommandCreatorResult::Failure { .. } => return failure,
        }
    }

    CommandCreatorResult::Success {
        commands,
        robot_state: current,
        warnings,
    }
}

/// Emit one command with a fresh key and the state after it
pub(crate) fn emit(
    params: CommandParams,
    meta: Option<CommandMeta>,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let mut command = Command::new(keys.next_key(), params);
    if let Some(meta) = meta {
        command = command.with_meta(meta);
    }
    let update = apply_command(state.clone(), &command, ctx);
    CommandCreatorResult::Success {
        commands: vec![command],
        robot_state: update.robot_state,
        warnings: update.warnings,
    }
}

/// Emit unless validation produced errors
pub(crate) fn emit_unless(
    errors: Vec<CommandCreatorError>,
    params: CommandParams,
    meta: Option<CommandMeta>,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    if errors.is_empty() {
        emit(params, meta, ctx, state, keys)
    } else {
        CommandCreatorResult::failure(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::WaitForDurationParams;
    use crate::keys::SequentialKeyGenerator;

    fn wait(
        seconds: &f64,
        ctx: &InvariantContext,
        state: &RobotState,
        keys: &mut dyn KeyGenerator,
    ) -> CommandCreatorResult {
        let params = CommandParams::WaitForDuration(WaitForDurationParams {
            seconds: *seconds,
            message: None,
        });
        emit(params, None, ctx, state, keys)
    }

    fn fail(
        _: &(),
        _: &InvariantContext,
        _: &RobotState,
        _: &mut dyn KeyGenerator,
    ) -> CommandCreatorResult {
        CommandCreatorResult::failure(vec![CommandCreatorError::insufficient_tips("p")])
    }

    #[test]
    fn test_reduce_concatenates_in_order() {
        let ctx = InvariantContext::default();
        let mut keys = SequentialKeyGenerator::new("k");
        let result = reduce_command_creators(
            vec![curry(wait, 1.0), curry(wait, 2.0)],
            &ctx,
            &RobotState::default(),
            &mut keys,
        );
        let keys: Vec<&str> = result.commands().iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["k-0", "k-1"]);
    }

    #[test]
    fn test_reduce_discards_commands_on_failure() {
        let ctx = InvariantContext::default();
        let mut keys = SequentialKeyGenerator::default();
        let result = reduce_command_creators(
            vec![curry(wait, 1.0), curry(fail, ()), curry(wait, 2.0)],
            &ctx,
            &RobotState::default(),
            &mut keys,
        );
        assert!(!result.is_success());
        assert!(result.commands().is_empty());
        assert_eq!(result.errors()[0].code(), "INSUFFICIENT_TIPS");
    }

    #[test]
    fn test_curried_creator_runs_on_another_thread() {
        let creator = curry(wait, 3.0);
        let result = std::thread::spawn(move || {
            let ctx = InvariantContext::default();
            let mut keys = SequentialKeyGenerator::new("k");
            creator(&ctx, &RobotState::default(), &mut keys)
        })
        .join()
        .unwrap();
        assert_eq!(result.commands().len(), 1);
    }
}
