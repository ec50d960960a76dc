use serde::{Deserialize, Serialize};

use crate::command_creators::atomic::{drop_tip, pick_up_tip, DropTipArgs, PickUpTipArgs};
use crate::command_creators::{curry, reduce_command_creators, CommandCreatorResult};
use crate::context::InvariantContext;
use crate::errors::CommandCreatorError;
use crate::keys::KeyGenerator;
use crate::robot_state::selectors::next_tiprack;
use crate::robot_state::RobotState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceTipArgs {
    pub pipette: String,
    pub drop_tip_location: String,
}

/// Drop the held tip, if any, then pick up the next available one
///
/// The tip is chosen against the state this creator runs on, so it sees
/// tips consumed earlier in the same compound.
pub fn replace_tip(
    args: &ReplaceTipArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    if ctx.pipette(&args.pipette).is_none() {
        return CommandCreatorResult::failure(vec![CommandCreatorError::pipette_does_not_exist(
            "replace_tip",
            &args.pipette,
        )]);
    }
    let Some((tiprack, well)) = next_tiprack(ctx, state, &args.pipette) else {
        return CommandCreatorResult::failure(vec![CommandCreatorError::insufficient_tips(
            &args.pipette,
        )]);
    };

    let mut creators = Vec::new();
    if state.pipette_has_tip(&args.pipette) {
        creators.push(curry(
            drop_tip,
            DropTipArgs {
                pipette: args.pipette.clone(),
                location: args.drop_tip_location.clone(),
            },
        ));
    }
    creators.push(curry(
        pick_up_tip,
        PickUpTipArgs {
            pipette: args.pipette.clone(),
            tiprack,
            well,
        },
    ));
    reduce_command_creators(creators, ctx, state, keys)
}
