use crate::command_creators::{emit_unless, CommandCreatorResult};
use crate::commands::{
    CommandParams, EngageMagnetParams, ModuleParams, ShakeSpeedParams, TemperatureParams,
};
use crate::context::InvariantContext;
use crate::errors::CommandCreatorError;
use crate::keys::KeyGenerator;
use crate::model::ModuleType;
use crate::robot_state::RobotState;
use crate::validators;

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleArgs {
    pub module: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngageMagnetArgs {
    pub module: String,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureArgs {
    pub module: String,
    pub celsius: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShakeArgs {
    pub module: String,
    pub rpm: f64,
}

/// Existence and type check, then any extra module-state check, then emit
#[allow(clippy::too_many_arguments)]
fn module_command(
    action: &str,
    module: &str,
    expected: ModuleType,
    extra: impl FnOnce(&RobotState) -> Option<CommandCreatorError>,
    params: CommandParams,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let mut errors: Vec<_> = validators::module_of_type(ctx, state, action, module, expected)
        .into_iter()
        .collect();
    if errors.is_empty() {
        errors.extend(extra(state));
    }
    emit_unless(errors, params, None, ctx, state, keys)
}

fn no_check(_: &RobotState) -> Option<CommandCreatorError> {
    None
}

fn module_params(args: &ModuleArgs) -> ModuleParams {
    ModuleParams {
        module_id: args.module.clone(),
    }
}

fn temperature_params(args: &TemperatureArgs) -> TemperatureParams {
    TemperatureParams {
        module_id: args.module.clone(),
        celsius: args.celsius,
    }
}

// ========== Magnetic module ==========
//
// Every module creator fails with `MODULE_DOES_NOT_EXIST` for an unknown or
// unplaced module and `MODULE_TYPE_MISMATCH` when the id names another kind
// of module.

/// Raise the magnets to `height` mm
pub fn engage_magnet(
    args: &EngageMagnetArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let params = CommandParams::EngageMagnet(EngageMagnetParams {
        module_id: args.module.clone(),
        height: args.height,
    });
    module_command(
        "engage_magnet",
        &args.module,
        ModuleType::MagneticModule,
        no_check,
        params,
        ctx,
        state,
        keys,
    )
}

/// Lower the magnets
pub fn disengage_magnet(
    args: &ModuleArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    module_command(
        "disengage_magnet",
        &args.module,
        ModuleType::MagneticModule,
        no_check,
        CommandParams::DisengageMagnet(module_params(args)),
        ctx,
        state,
        keys,
    )
}

// ========== Temperature module ==========

/// Start heating or cooling toward a target without waiting
pub fn set_temperature(
    args: &TemperatureArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    module_command(
        "set_temperature",
        &args.module,
        ModuleType::TemperatureModule,
        no_check,
        CommandParams::SetTemperature(temperature_params(args)),
        ctx,
        state,
        keys,
    )
}

/// Block until the module reaches `celsius`
pub fn await_temperature(
    args: &TemperatureArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    module_command(
        "await_temperature",
        &args.module,
        ModuleType::TemperatureModule,
        no_check,
        CommandParams::AwaitTemperature(temperature_params(args)),
        ctx,
        state,
        keys,
    )
}

pub fn deactivate_temperature(
    args: &ModuleArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    module_command(
        "deactivate_temperature",
        &args.module,
        ModuleType::TemperatureModule,
        no_check,
        CommandParams::DeactivateTemperature(module_params(args)),
        ctx,
        state,
        keys,
    )
}

// ========== Thermocycler ==========

/// Open the lid; labware inside becomes reachable
pub fn thermocycler_open_lid(
    args: &ModuleArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    module_command(
        "thermocycler_open_lid",
        &args.module,
        ModuleType::Thermocycler,
        no_check,
        CommandParams::ThermocyclerOpenLid(module_params(args)),
        ctx,
        state,
        keys,
    )
}

pub fn thermocycler_close_lid(
    args: &ModuleArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    module_command(
        "thermocycler_close_lid",
        &args.module,
        ModuleType::Thermocycler,
        no_check,
        CommandParams::ThermocyclerCloseLid(module_params(args)),
        ctx,
        state,
        keys,
    )
}

/// Set the block target; the lid target is independent
pub fn thermocycler_set_block_temperature(
    args: &TemperatureArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    module_command(
        "thermocycler_set_block_temperature",
        &args.module,
        ModuleType::Thermocycler,
        no_check,
        CommandParams::ThermocyclerSetBlockTemperature(temperature_params(args)),
        ctx,
        state,
        keys,
    )
}

pub fn thermocycler_set_lid_temperature(
    args: &TemperatureArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    module_command(
        "thermocycler_set_lid_temperature",
        &args.module,
        ModuleType::Thermocycler,
        no_check,
        CommandParams::ThermocyclerSetLidTemperature(temperature_params(args)),
        ctx,
        state,
        keys,
    )
}

pub fn thermocycler_deactivate_block(
    args: &ModuleArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    module_command(
        "thermocycler_deactivate_block",
        &args.module,
        ModuleType::Thermocycler,
        no_check,
        CommandParams::ThermocyclerDeactivateBlock(module_params(args)),
        ctx,
        state,
        keys,
    )
}

pub fn thermocycler_deactivate_lid(
    args: &ModuleArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    module_command(
        "thermocycler_deactivate_lid",
        &args.module,
        ModuleType::Thermocycler,
        no_check,
        CommandParams::ThermocyclerDeactivateLid(module_params(args)),
        ctx,
        state,
        keys,
    )
}

// ========== Heater-shaker ==========

/// Start heating; shaking is unaffected
pub fn heater_shaker_set_temperature(
    args: &TemperatureArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    module_command(
        "heater_shaker_set_temperature",
        &args.module,
        ModuleType::HeaterShaker,
        no_check,
        CommandParams::HeaterShakerSetTemperature(temperature_params(args)),
        ctx,
        state,
        keys,
    )
}

pub fn heater_shaker_deactivate_heater(
    args: &ModuleArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    module_command(
        "heater_shaker_deactivate_heater",
        &args.module,
        ModuleType::HeaterShaker,
        no_check,
        CommandParams::HeaterShakerDeactivateHeater(module_params(args)),
        ctx,
        state,
        keys,
    )
}

/// Start shaking at `rpm`
///
/// # Errors
///
/// Besides the module checks, fails with `HEATER_SHAKER_LATCH_OPEN` unless
/// the latch is known to be closed.
pub fn heater_shaker_set_shake_speed(
    args: &ShakeArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let module = args.module.as_str();
    let latch_closed = |state: &RobotState| {
        let hs = state.module_state(module)?.as_heater_shaker()?;
        (hs.latch_open != Some(false)).then(CommandCreatorError::heater_shaker_latch_open)
    };
    let params = CommandParams::HeaterShakerSetShakeSpeed(ShakeSpeedParams {
        module_id: args.module.clone(),
        rpm: args.rpm,
    });
    module_command(
        "heater_shaker_set_shake_speed",
        module,
        ModuleType::HeaterShaker,
        latch_closed,
        params,
        ctx,
        state,
        keys,
    )
}

pub fn heater_shaker_stop_shake(
    args: &ModuleArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    module_command(
        "heater_shaker_stop_shake",
        &args.module,
        ModuleType::HeaterShaker,
        no_check,
        CommandParams::HeaterShakerStopShake(module_params(args)),
        ctx,
        state,
        keys,
    )
}

/// Open the labware latch
///
/// # Errors
///
/// Besides the module checks, fails with `HEATER_SHAKER_IS_SHAKING` while the
/// module is shaking.
pub fn heater_shaker_open_latch(
    args: &ModuleArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let module = args.module.as_str();
    let not_shaking = |state: &RobotState| {
        let hs = state.module_state(module)?.as_heater_shaker()?;
        hs.is_shaking()
            .then(CommandCreatorError::heater_shaker_is_shaking)
    };
    module_command(
        "heater_shaker_open_latch",
        module,
        ModuleType::HeaterShaker,
        not_shaking,
        CommandParams::HeaterShakerOpenLatch(module_params(args)),
        ctx,
        state,
        keys,
    )
}

pub fn heater_shaker_close_latch(
    args: &ModuleArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    module_command(
        "heater_shaker_close_latch",
        &args.module,
        ModuleType::HeaterShaker,
        no_check,
        CommandParams::HeaterShakerCloseLatch(module_params(args)),
        ctx,
        state,
        keys,
    )
}
