//! Tip pickup and drop

use crate::command_creators::{emit_unless, CommandCreatorResult};
use crate::commands::{CommandParams, WellTargetParams};
use crate::context::InvariantContext;
use crate::errors::CommandCreatorError;
use crate::keys::KeyGenerator;
use crate::robot_state::RobotState;
use crate::validators;

/// `well` is the rack well under the pipette's first channel
#[derive(Debug, Clone, PartialEq)]
pub struct PickUpTipArgs {
    pub pipette: String,
    pub tiprack: String,
    pub well: String,
}

/// `location` is a trash labware id or a trash bin / waste chute equipment id
#[derive(Debug, Clone, PartialEq)]
pub struct DropTipArgs {
    pub pipette: String,
    pub location: String,
}

/// Well targeted when dropping into trash
const TRASH_WELL: &str = "A1";

/// Attach tips from a rack, one per channel
///
/// # Errors
///
/// Fails with `PIPETTE_DOES_NOT_EXIST` or `LABWARE_DOES_NOT_EXIST` for
/// unknown ids, `PIPETTE_HAS_TIP` when a tip is already attached,
/// `TIP_NOT_AVAILABLE` when any channel's well is empty, and
/// `LABWARE_OFF_DECK` for a rack that was moved off deck.
pub fn pick_up_tip(
    args: &PickUpTipArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let action = "pick_up_tip";
    let mut errors = Vec::new();
    errors.extend(validators::pipette_exists(ctx, action, &args.pipette));
    let rack_missing = validators::labware_exists(ctx, state, action, &args.tiprack);
    let rack_known = rack_missing.is_none();
    errors.extend(rack_missing);
    errors.extend(validators::no_tip_held(state, &args.pipette));
    if rack_known {
        errors.extend(validators::tips_available(
            ctx,
            state,
            &args.pipette,
            &args.tiprack,
            &args.well,
        ));
    }
    errors.extend(validators::labware_on_deck(state, action, &args.tiprack));
    let params = CommandParams::PickUpTip(WellTargetParams {
        pipette_id: args.pipette.clone(),
        labware_id: args.tiprack.clone(),
        well_name: args.well.clone(),
        well_location: None,
    });
    emit_unless(errors, params, None, ctx, state, keys)
}

/// Drop the attached tip into a trash labware, trash bin or waste chute
///
/// # Errors
///
/// Fails with `DROP_TIP_LOCATION_DOES_NOT_EXIST` when `location` is neither
/// a labware nor tip-accepting equipment, and `NO_TIP_ON_PIPETTE` when
/// nothing is attached.
pub fn drop_tip(
    args: &DropTipArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let action = "drop_tip";
    let mut errors = Vec::new();
    errors.extend(validators::pipette_exists(ctx, action, &args.pipette));
    let location_known = ctx.labware(&args.location).is_some()
        || ctx
            .equipment(&args.location)
            .is_some_and(|e| e.kind.accepts_tips());
    if !location_known {
        errors.push(CommandCreatorError::drop_tip_location_does_not_exist(
            &args.pipette,
            &args.location,
        ));
    }
    errors.extend(validators::tip_required(
        state,
        action,
        &args.pipette,
        &args.location,
        TRASH_WELL,
    ));
    let params = CommandParams::DropTip(WellTargetParams {
        pipette_id: args.pipette.clone(),
        labware_id: args.location.clone(),
        well_name: TRASH_WELL.to_string(),
        well_location: None,
    });
    emit_unless(errors, params, None, ctx, state, keys)
}
