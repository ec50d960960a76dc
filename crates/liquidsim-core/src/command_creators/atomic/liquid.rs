use crate::command_creators::{emit_unless, CommandCreatorResult};
use crate::commands::{
    BlowoutParams, CommandMeta, CommandParams, LiquidHandlingParams, WellLocation,
    WellTargetParams,
};
use crate::context::InvariantContext;
use crate::errors::CommandCreatorError;
use crate::keys::KeyGenerator;
use crate::robot_state::RobotState;
use crate::validators;

/// Arguments shared by aspirate, dispense and air gap
#[derive(Debug, Clone, PartialEq)]
pub struct AspDispArgs {
    pub pipette: String,
    pub volume: f64,
    pub labware: String,
    pub well: String,
    pub offset_from_bottom_mm: f64,
    pub flow_rate: f64,
}

impl AspDispArgs {
    fn params(&self) -> LiquidHandlingParams {
        LiquidHandlingParams {
            pipette_id: self.pipette.clone(),
            volume: self.volume,
            labware_id: self.labware.clone(),
            well_name: self.well.clone(),
            well_location: WellLocation::from_bottom(self.offset_from_bottom_mm),
            flow_rate: self.flow_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlowoutArgs {
    pub pipette: String,
    pub labware: String,
    pub well: String,
    pub flow_rate: f64,
    pub offset_from_top_mm: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TouchTipArgs {
    pub pipette: String,
    pub labware: String,
    pub well: String,
    pub offset_from_bottom_mm: f64,
}

/// Pipette and labware existence, plus the well once the labware is known
fn target_exists(
    ctx: &InvariantContext,
    state: &RobotState,
    action: &str,
    pipette: &str,
    labware: &str,
    well: &str,
) -> Vec<CommandCreatorError> {
    let mut errors = Vec::new();
    errors.extend(validators::pipette_exists(ctx, action, pipette));
    match validators::labware_exists(ctx, state, action, labware) {
        Some(err) => errors.push(err),
        None => errors.extend(validators::well_exists(ctx, action, labware, well)),
    }
    errors
}

/// Checks run before touching liquid in a well
fn well_access_errors(
    ctx: &InvariantContext,
    state: &RobotState,
    action: &str,
    args: &AspDispArgs,
) -> Vec<CommandCreatorError> {
    let mut errors = target_exists(ctx, state, action, &args.pipette, &args.labware, &args.well);
    errors.extend(validators::module_pipette_collision(
        ctx,
        state,
        &args.pipette,
        &args.labware,
    ));
    errors.extend(validators::tip_required(
        state,
        action,
        &args.pipette,
        &args.labware,
        &args.well,
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
    errors
}

fn aspirate_with(
    action: &str,
    meta: Option<CommandMeta>,
    args: &AspDispArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let mut errors = well_access_errors(ctx, state, action, args);
    errors.extend(validators::volume_within_capacity(
        ctx,
        action,
        &args.pipette,
        args.volume,
    ));
    errors.extend(validators::labware_on_deck(state, action, &args.labware));
    emit_unless(
        errors,
        CommandParams::Aspirate(args.params()),
        meta,
        ctx,
        state,
        keys,
    )
}

/// Draw liquid into the pipette. Requires a tip.
///
/// # Errors
///
/// Collects, in order: unknown pipette, labware or well; GEN1 module
/// collision; missing tip; a closed thermocycler lid, open heater-shaker
/// latch or shaking heater-shaker under the labware; heater-shaker
/// adjacency; volume beyond the pipette or tip; labware off deck.
pub fn aspirate(
    args: &AspDispArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    aspirate_with("aspirate", None, args, ctx, state, keys)
}

/// Aspirate air. Emitted as an aspirate flagged in `meta`; moves no liquid.
pub fn air_gap(
    args: &AspDispArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    aspirate_with(
        "air_gap",
        Some(CommandMeta { is_air_gap: true }),
        args,
        ctx,
        state,
        keys,
    )
}

/// Push liquid out of the pipette. Requires a tip.
///
/// # Errors
///
/// The same checks as [`aspirate`] except capacity; a negative volume is
/// `INVALID_VOLUME`.
pub fn dispense(
    args: &AspDispArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let action = "dispense";
    let mut errors = well_access_errors(ctx, state, action, args);
    if args.volume < 0.0 || !args.volume.is_finite() {
        errors.push(CommandCreatorError::invalid_volume(action, args.volume));
    }
    errors.extend(validators::labware_on_deck(state, action, &args.labware));
    emit_unless(
        errors,
        CommandParams::Dispense(args.params()),
        None,
        ctx,
        state,
        keys,
    )
}

/// Empty the pipette into a well. Requires a tip.
pub fn blowout(
    args: &BlowoutArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let action = "blowout";
    let mut errors = target_exists(ctx, state, action, &args.pipette, &args.labware, &args.well);
    errors.extend(validators::tip_required(
        state,
        action,
        &args.pipette,
        &args.labware,
        &args.well,
    ));
    errors.extend(validators::labware_on_deck(state, action, &args.labware));
    let params = CommandParams::Blowout(BlowoutParams {
        pipette_id: args.pipette.clone(),
        labware_id: args.labware.clone(),
        well_name: args.well.clone(),
        well_location: WellLocation::from_top(args.offset_from_top_mm),
        flow_rate: args.flow_rate,
    });
    emit_unless(errors, params, None, ctx, state, keys)
}

/// Touch the tip against the well walls. Requires a tip.
pub fn touch_tip(
    args: &TouchTipArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let action = "touch_tip";
    let mut errors = target_exists(ctx, state, action, &args.pipette, &args.labware, &args.well);
    errors.extend(validators::tip_required(
        state,
        action,
        &args.pipette,
        &args.labware,
        &args.well,
    ));
    errors.extend(validators::thermocycler_lid_closed(state, &args.labware));
    errors.extend(validators::heater_shaker_latch_open(state, &args.labware));
    errors.extend(validators::heater_shaker_shaking(state, &args.labware));
    errors.extend(validators::labware_on_deck(state, action, &args.labware));
    let params = CommandParams::TouchTip(WellTargetParams {
        pipette_id: args.pipette.clone(),
        labware_id: args.labware.clone(),
        well_name: args.well.clone(),
        well_location: Some(WellLocation::from_bottom(args.offset_from_bottom_mm)),
    });
    emit_unless(errors, params, None, ctx, state, keys)
}
