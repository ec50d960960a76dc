use crate::command_creators::{emit, emit_unless, CommandCreatorResult};
use crate::commands::{
    Axis, CommandParams, LabwareMovementStrategy, MoveLabwareParams, MoveRelativeParams,
    WaitForDurationParams, WellLocation, WellTargetParams,
};
use crate::context::InvariantContext;
use crate::errors::CommandCreatorError;
use crate::keys::KeyGenerator;
use crate::robot_state::selectors::{labware_module, location_occupant};
use crate::robot_state::{LabwareLocation, RobotState};
use crate::validators;

#[derive(Debug, Clone, PartialEq)]
pub struct MoveToWellArgs {
    pub pipette: String,
    pub labware: String,
    pub well: String,
    pub offset_from_bottom_mm: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveRelativeArgs {
    pub pipette: String,
    pub axis: Axis,
    pub distance: f64,
}

/// `use_gripper` selects the gripper strategy; otherwise the move is manual
#[derive(Debug, Clone, PartialEq)]
pub struct MoveLabwareArgs {
    pub labware: String,
    pub new_location: LabwareLocation,
    pub use_gripper: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DelayArgs {
    pub seconds: f64,
    pub message: Option<String>,
}

/// Move the pipette over a well without touching liquid; no tip required
pub fn move_to_well(
    args: &MoveToWellArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let action = "move_to_well";
    let mut errors = Vec::new();
    errors.extend(validators::pipette_exists(ctx, action, &args.pipette));
    match validators::labware_exists(ctx, state, action, &args.labware) {
        Some(err) => errors.push(err),
        None => errors.extend(validators::well_exists(ctx, action, &args.labware, &args.well)),
    }
    errors.extend(validators::module_pipette_collision(
        ctx,
        state,
        &args.pipette,
        &args.labware,
    ));
    errors.extend(validators::thermocycler_lid_closed(state, &args.labware));
    errors.extend(validators::heater_shaker_latch_open(state, &args.labware));
    errors.extend(validators::heater_shaker_shaking(state, &args.labware));
    errors.extend(validators::heater_shaker_adjacency(
        ctx,
        state,
        &args.pipette,
        &args.labware,
    ));
    errors.extend(validators::labware_on_deck(state, action, &args.labware));
    let params = CommandParams::MoveToWell(WellTargetParams {
        pipette_id: args.pipette.clone(),
        labware_id: args.labware.clone(),
        well_name: args.well.clone(),
        well_location: args.offset_from_bottom_mm.map(WellLocation::from_bottom),
    });
    emit_unless(errors, params, None, ctx, state, keys)
}

/// Nudge the pipette along one axis
///
/// # Errors
///
/// Fails only with `PIPETTE_DOES_NOT_EXIST`.
pub fn move_relative(
    args: &MoveRelativeArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let errors: Vec<_> = validators::pipette_exists(ctx, "move_relative", &args.pipette)
        .into_iter()
        .collect();
    let params = CommandParams::MoveRelative(MoveRelativeParams {
        pipette_id: args.pipette.clone(),
        axis: args.axis,
        distance: args.distance,
    });
    emit_unless(errors, params, None, ctx, state, keys)
}

/// Errors for lifting labware out of, or lowering it into, a module
fn module_access_errors(state: &RobotState, module: &str) -> Vec<CommandCreatorError> {
    let mut errors = Vec::new();
    let Some(module_state) = state.module_state(module) else {
        return errors;
    };
    if let Some(tc) = module_state.as_thermocycler() {
        if tc.lid_open != Some(true) {
            errors.push(CommandCreatorError::thermocycler_lid_closed());
        }
    }
    if let Some(hs) = module_state.as_heater_shaker() {
        if hs.latch_open != Some(true) {
            errors.push(CommandCreatorError::heater_shaker_latch_closed());
        }
        if hs.is_shaking() {
            errors.push(CommandCreatorError::heater_shaker_is_shaking());
        }
    }
    errors
}

/// Relocate labware on, onto, or off the deck
///
/// # Errors
///
/// Collects every applicable error: unknown labware or destination module,
/// `GRIPPER_REQUIRED` when the gripper is requested but not installed, a
/// closed thermocycler lid or heater-shaker latch (or a shaking
/// heater-shaker) at the source or destination, and `LABWARE_SLOT_OCCUPIED`
/// when something else already sits at the destination.
pub fn move_labware(
    args: &MoveLabwareArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let action = "move_labware";
    let mut errors = Vec::new();
    let missing = validators::labware_exists(ctx, state, action, &args.labware);
    let labware_known = missing.is_none();
    errors.extend(missing);

    let destination_module = match &args.new_location {
        LabwareLocation::Module(module) => Some(module.as_str()),
        _ => None,
    };
    if let Some(module) = destination_module {
        errors.extend(validators::module_exists(ctx, state, action, module));
    }
    if args.use_gripper && !ctx.has_gripper() {
        errors.push(CommandCreatorError::gripper_required(&args.labware));
    }

    if labware_known {
        if let Some(source) = labware_module(state, &args.labware) {
            errors.extend(module_access_errors(state, source));
        }
    }
    if let Some(module) = destination_module {
        errors.extend(module_access_errors(state, module));
    }

    if let Some(occupant) = location_occupant(ctx, state, &args.new_location, &args.labware) {
        let target = match &args.new_location {
            LabwareLocation::Slot(slot) => slot.clone(),
            LabwareLocation::Module(module) => module.clone(),
            LabwareLocation::OffDeck => occupant,
        };
        errors.push(CommandCreatorError::labware_slot_occupied(&args.labware, &target));
    }

    let params = CommandParams::MoveLabware(MoveLabwareParams {
        labware_id: args.labware.clone(),
        new_location: args.new_location.clone(),
        strategy: if args.use_gripper {
            LabwareMovementStrategy::UsingGripper
        } else {
            LabwareMovementStrategy::ManualMoveWithPause
        },
    });
    emit_unless(errors, params, None, ctx, state, keys)
}

/// Wait. Never fails.
pub fn delay(
    args: &DelayArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let params = CommandParams::WaitForDuration(WaitForDurationParams {
        seconds: args.seconds.max(0.0),
        message: args.message.clone(),
    });
    emit(params, None, ctx, state, keys)
}
