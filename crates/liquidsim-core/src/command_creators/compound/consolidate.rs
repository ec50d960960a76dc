use serde::{Deserialize, Serialize};

use super::{pipette_for, ChangeTipPolicy, LiquidHandlingOptions, LiquidPlan, WellRef};
use crate::command_creators::CommandCreatorResult;
use crate::context::InvariantContext;
use crate::errors::CommandCreatorError;
use crate::keys::KeyGenerator;
use crate::robot_state::RobotState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidateArgs {
    pub pipette: String,
    pub source_labware: String,
    pub source_wells: Vec<String>,
    pub dest_labware: String,
    pub dest_well: String,
    /// Volume taken from each source well
    pub volume: f64,
    pub change_tip: ChangeTipPolicy,
    pub drop_tip_location: String,
    #[serde(default)]
    pub options: LiquidHandlingOptions,
}

/// Collect from many sources into one destination
///
/// Sources are batched greedily: each batch aspirates from as many wells as
/// the tip holds (each aspirate followed by its air gap, if any) and then
/// dispenses everything into the destination. `always`, `perSource` and
/// `perDest` take a new tip for every batch.
pub fn consolidate(
    args: &ConsolidateArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let action = "consolidate";
    let pipette = match pipette_for(ctx, action, &args.pipette) {
        Ok(pipette) => pipette,
        Err(failure) => return failure,
    };
    if args.volume <= 0.0 || !args.volume.is_finite() {
        return CommandCreatorResult::failure(vec![CommandCreatorError::invalid_volume(
            action,
            args.volume,
        )]);
    }

    let mut plan = LiquidPlan::new(ctx, pipette, &args.options, &args.drop_tip_location);
    let air_gap = plan.options().air_gap_volume.filter(|v| *v > 0.0).unwrap_or(0.0);
    let per_well = args.volume + air_gap;
    let wells_per_batch = (pipette.tip_max_volume() / per_well).floor() as usize;
    if wells_per_batch == 0 {
        return CommandCreatorResult::failure(vec![CommandCreatorError::tip_volume_exceeded(
            action,
            per_well,
            pipette.tip_max_volume(),
        )]);
    }

    let dest = WellRef::new(&args.dest_labware, &args.dest_well);
    for (batch_index, batch) in args.source_wells.chunks(wells_per_batch).enumerate() {
        let fresh_tip = args
            .change_tip
            .needs_new_tip(batch_index == 0, true, true);
        if fresh_tip {
            plan.replace_tip();
        }
        for (index, well) in batch.iter().enumerate() {
            let source = WellRef::new(&args.source_labware, well);
            if index == 0 {
                plan.draw(&source, args.volume, fresh_tip);
            } else {
                plan.aspirate(&source, args.volume);
                if plan.options().touch_tip_after_aspirate {
                    plan.touch_tip(&source);
                }
                plan.air_gap(&source);
            }
        }
        plan.dispense(&dest, per_well * batch.len() as f64);
        if plan.options().touch_tip_after_dispense {
            plan.touch_tip(&dest);
        }
        if let Some(settings) = plan.options().mix_in_destination {
            plan.mix(&dest, settings);
        }
        if let Some(last) = batch.last() {
            plan.blowout(&WellRef::new(&args.source_labware, last), &dest);
        }
    }

    if args.change_tip.drops_at_end() && !args.source_wells.is_empty() {
        plan.drop_tip();
    }
    plan.run(state, keys)
}
