use serde::{Deserialize, Serialize};

use crate::command_creators::atomic::{
    await_temperature, deactivate_temperature, delay, disengage_magnet, engage_magnet,
    heater_shaker_close_latch, heater_shaker_deactivate_heater, heater_shaker_open_latch,
    heater_shaker_set_shake_speed, heater_shaker_set_temperature, heater_shaker_stop_shake,
    set_temperature, thermocycler_close_lid, thermocycler_deactivate_block,
    thermocycler_deactivate_lid, thermocycler_open_lid, thermocycler_set_block_temperature,
    thermocycler_set_lid_temperature, DelayArgs, EngageMagnetArgs, ModuleArgs, ShakeArgs,
    TemperatureArgs,
};
use crate::command_creators::{
    curry, reduce_command_creators, CommandCreatorResult, CurriedCommandCreator,
};
use crate::context::InvariantContext;
use crate::keys::KeyGenerator;
use crate::model::{HeaterShakerModuleState, ModuleType, ThermocyclerModuleState};
use crate::robot_state::RobotState;
use crate::validators;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MagnetAction {
    Engage { height: f64 },
    Disengage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagnetArgs {
    pub module: String,
    pub action: MagnetAction,
}

/// `target` of `None` deactivates the module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureStepArgs {
    pub module: String,
    pub target: Option<f64>,
    /// Block until the target is reached
    #[serde(default)]
    pub wait: bool,
}

/// Desired end state of a thermocycler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermocyclerStateArgs {
    pub module: String,
    pub block_target: Option<f64>,
    pub lid_target: Option<f64>,
    pub lid_open: bool,
}

/// Desired end state of a heater-shaker
///
/// With a `timer_seconds`, shaking runs for that long and then the shaker
/// and heater are switched off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaterShakerArgs {
    pub module: String,
    pub target_temp: Option<f64>,
    pub target_speed: Option<f64>,
    pub latch_open: bool,
    #[serde(default)]
    pub timer_seconds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseArgs {
    pub seconds: f64,
    #[serde(default)]
    pub message: Option<String>,
}

fn module_args(module: &str) -> ModuleArgs {
    ModuleArgs {
        module: module.to_string(),
    }
}

fn temperature_args(module: &str, celsius: f64) -> TemperatureArgs {
    TemperatureArgs {
        module: module.to_string(),
        celsius,
    }
}

fn check_module(
    ctx: &InvariantContext,
    state: &RobotState,
    action: &str,
    module: &str,
    expected: ModuleType,
) -> Option<CommandCreatorResult> {
    validators::module_of_type(ctx, state, action, module, expected)
        .map(|err| CommandCreatorResult::failure(vec![err]))
}

pub fn magnet(
    args: &MagnetArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let creator = match args.action {
        MagnetAction::Engage { height } => curry(
            engage_magnet,
            EngageMagnetArgs {
                module: args.module.clone(),
                height,
            },
        ),
        MagnetAction::Disengage => curry(disengage_magnet, module_args(&args.module)),
    };
    reduce_command_creators(vec![creator], ctx, state, keys)
}

pub fn temperature(
    args: &TemperatureStepArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let module = args.module.as_str();
    let mut creators: Vec<CurriedCommandCreator<'_>> = Vec::new();
    match args.target {
        Some(celsius) => {
            creators.push(curry(set_temperature, temperature_args(module, celsius)));
            if args.wait {
                creators.push(curry(await_temperature, temperature_args(module, celsius)));
            }
        }
        None => creators.push(curry(deactivate_temperature, module_args(module))),
    }
    reduce_command_creators(creators, ctx, state, keys)
}

/// Bring a thermocycler to the requested state
///
/// Only differences from the current state produce commands, in a fixed
/// order: lid position, block temperature, lid temperature.
pub fn thermocycler_state(
    args: &ThermocyclerStateArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let module = args.module.as_str();
    if let Some(failure) = check_module(ctx, state, "thermocycler", module, ModuleType::Thermocycler)
    {
        return failure;
    }
    let current = state
        .module_state(module)
        .and_then(|m| m.as_thermocycler())
        .cloned()
        .unwrap_or_else(ThermocyclerModuleState::default);

    let mut creators: Vec<CurriedCommandCreator<'_>> = Vec::new();
    if current.lid_open != Some(args.lid_open) {
        if args.lid_open {
            creators.push(curry(thermocycler_open_lid, module_args(module)));
        } else {
            creators.push(curry(thermocycler_close_lid, module_args(module)));
        }
    }
    if current.block_target_temp != args.block_target {
        match args.block_target {
            Some(celsius) => creators.push(curry(
                thermocycler_set_block_temperature,
                temperature_args(module, celsius),
            )),
            None => creators.push(curry(thermocycler_deactivate_block, module_args(module))),
        }
    }
    if current.lid_target_temp != args.lid_target {
        match args.lid_target {
            Some(celsius) => creators.push(curry(
                thermocycler_set_lid_temperature,
                temperature_args(module, celsius),
            )),
            None => creators.push(curry(thermocycler_deactivate_lid, module_args(module))),
        }
    }
    reduce_command_creators(creators, ctx, state, keys)
}

/// Bring a heater-shaker to the requested state
///
/// Order: temperature, then shaking (closing the latch first when needed),
/// then the latch. A requested open latch is ignored while a shake speed
/// is set.
pub fn heater_shaker(
    args: &HeaterShakerArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let module = args.module.as_str();
    if let Some(failure) =
        check_module(ctx, state, "heater_shaker", module, ModuleType::HeaterShaker)
    {
        return failure;
    }
    let current = state
        .module_state(module)
        .and_then(|m| m.as_heater_shaker())
        .cloned()
        .unwrap_or_else(HeaterShakerModuleState::default);

    let mut creators: Vec<CurriedCommandCreator<'_>> = Vec::new();
    match args.target_temp {
        Some(celsius) if current.target_temp != Some(celsius) => creators.push(curry(
            heater_shaker_set_temperature,
            temperature_args(module, celsius),
        )),
        None if current.target_temp.is_some() => {
            creators.push(curry(heater_shaker_deactivate_heater, module_args(module)))
        }
        _ => {}
    }

    match args.target_speed {
        Some(rpm) => {
            if current.latch_open != Some(false) {
                creators.push(curry(heater_shaker_close_latch, module_args(module)));
            }
            creators.push(curry(
                heater_shaker_set_shake_speed,
                ShakeArgs {
                    module: module.to_string(),
                    rpm,
                },
            ));
            if let Some(seconds) = args.timer_seconds {
                creators.push(curry(
                    delay,
                    DelayArgs {
                        seconds,
                        message: None,
                    },
                ));
                creators.push(curry(heater_shaker_stop_shake, module_args(module)));
                if args.target_temp.is_some() {
                    creators.push(curry(heater_shaker_deactivate_heater, module_args(module)));
                }
            }
        }
        None => {
            if current.is_shaking() {
                creators.push(curry(heater_shaker_stop_shake, module_args(module)));
            }
            if current.latch_open != Some(args.latch_open) {
                if args.latch_open {
                    creators.push(curry(heater_shaker_open_latch, module_args(module)));
                } else {
                    creators.push(curry(heater_shaker_close_latch, module_args(module)));
                }
            }
        }
    }
    reduce_command_creators(creators, ctx, state, keys)
}

/// Wait for a fixed duration; negative durations wait zero seconds
pub fn pause(
    args: &PauseArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    delay(
        &DelayArgs {
            seconds: args.seconds,
            message: args.message.clone(),
        },
        ctx,
        state,
        keys,
    )
}
