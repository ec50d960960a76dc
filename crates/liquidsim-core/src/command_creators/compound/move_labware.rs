use serde::{Deserialize, Serialize};

use crate::command_creators::atomic::{
    heater_shaker_close_latch, heater_shaker_open_latch, move_labware, thermocycler_open_lid,
    ModuleArgs, MoveLabwareArgs,
};
use crate::command_creators::{
    curry, reduce_command_creators, CommandCreatorResult, CurriedCommandCreator,
};
use crate::context::InvariantContext;
use crate::keys::KeyGenerator;
use crate::model::ModuleState;
use crate::robot_state::selectors::labware_module;
use crate::robot_state::{LabwareLocation, RobotState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveLabwareStepArgs {
    pub labware: String,
    pub new_location: LabwareLocation,
    #[serde(default)]
    pub use_gripper: bool,
}

/// Commands that make a module accessible for a labware move
fn open_module<'a>(state: &RobotState, module: &str, creators: &mut Vec<CurriedCommandCreator<'a>>) {
    let args = ModuleArgs {
        module: module.to_string(),
    };
    match state.module_state(module) {
        Some(ModuleState::Thermocycler(tc)) if tc.lid_open != Some(true) => {
            creators.push(curry(thermocycler_open_lid, args))
        }
        Some(ModuleState::HeaterShaker(hs)) if hs.latch_open != Some(true) => {
            creators.push(curry(heater_shaker_open_latch, args))
        }
        _ => {}
    }
}

fn is_heater_shaker(state: &RobotState, module: &str) -> bool {
    matches!(state.module_state(module), Some(ModuleState::HeaterShaker(_)))
}

/// Move labware, opening the thermocycler lid or heater-shaker latch at
/// either end first and closing any heater-shaker latch afterwards
pub fn move_labware_step(
    args: &MoveLabwareStepArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let source = labware_module(state, &args.labware).map(str::to_string);
    let destination = match &args.new_location {
        LabwareLocation::Module(module) => Some(module.clone()),
        _ => None,
    };
    let mut modules: Vec<String> = source.into_iter().chain(destination).collect();
    modules.dedup();
    let mut creators: Vec<CurriedCommandCreator<'_>> = Vec::new();

    for module in &modules {
        open_module(state, module, &mut creators);
    }
    creators.push(curry(
        move_labware,
        MoveLabwareArgs {
            labware: args.labware.clone(),
            new_location: args.new_location.clone(),
            use_gripper: args.use_gripper,
        },
    ));
    for module in &modules {
        if is_heater_shaker(state, module) {
            creators.push(curry(
                heater_shaker_close_latch,
                ModuleArgs {
                    module: module.clone(),
                },
            ));
        }
    }

    reduce_command_creators(creators, ctx, state, keys)
}
