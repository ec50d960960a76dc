use serde::{Deserialize, Serialize};

use super::{pipette_for, ChangeTipPolicy, LiquidHandlingOptions, LiquidPlan, MixSettings, WellRef};
use crate::command_creators::CommandCreatorResult;
use crate::context::InvariantContext;
use crate::errors::CommandCreatorError;
use crate::keys::KeyGenerator;
use crate::robot_state::RobotState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixArgs {
    pub pipette: String,
    pub labware: String,
    pub wells: Vec<String>,
    pub volume: f64,
    pub times: u32,
    pub change_tip: ChangeTipPolicy,
    pub drop_tip_location: String,
    #[serde(default)]
    pub options: LiquidHandlingOptions,
}

/// Mix each well in place
///
/// Every policy other than `once` and `never` takes a new tip per well.
pub fn mix(
    args: &MixArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let action = "mix";
    let pipette = match pipette_for(ctx, action, &args.pipette) {
        Ok(pipette) => pipette,
        Err(failure) => return failure,
    };
    if args.volume < 0.0 || !args.volume.is_finite() {
        return CommandCreatorResult::failure(vec![CommandCreatorError::invalid_volume(
            action,
            args.volume,
        )]);
    }

    let mut plan = LiquidPlan::new(ctx, pipette, &args.options, &args.drop_tip_location);
    let settings = MixSettings {
        volume: args.volume,
        times: args.times,
    };
    for (index, well) in args.wells.iter().enumerate() {
        let at = WellRef::new(&args.labware, well);
        if args.change_tip.needs_new_tip(index == 0, true, true) {
            plan.replace_tip();
        }
        plan.mix(&at, settings);
        if plan.options().touch_tip_after_dispense {
            plan.touch_tip(&at);
        }
        plan.blowout(&at, &at);
    }

    if args.change_tip.drops_at_end() && !args.wells.is_empty() {
        plan.drop_tip();
    }
    plan.run(state, keys)
}
