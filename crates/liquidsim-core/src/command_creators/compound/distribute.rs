use serde::{Deserialize, Serialize};

use super::transfer::{transfer, TransferArgs};
use super::{pipette_for, BlowoutLocation, ChangeTipPolicy, LiquidHandlingOptions, LiquidPlan, WellRef};
use crate::command_creators::CommandCreatorResult;
use crate::context::InvariantContext;
use crate::errors::CommandCreatorError;
use crate::keys::KeyGenerator;
use crate::robot_state::RobotState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributeArgs {
    pub pipette: String,
    pub source_labware: String,
    pub source_well: String,
    pub dest_labware: String,
    pub dest_wells: Vec<String>,
    /// Volume delivered to each destination well
    pub volume: f64,
    pub change_tip: ChangeTipPolicy,
    pub drop_tip_location: String,
    /// Extra volume aspirated with every batch and blown out afterwards
    #[serde(default)]
    pub disposal_volume: Option<f64>,
    #[serde(default)]
    pub options: LiquidHandlingOptions,
}

/// Deliver from one source to many destinations, several per aspirate
///
/// Each batch aspirates `n * volume + disposal` and dispenses `volume` into
/// each of its `n` destinations; the disposal volume is then blown out
/// (into the configured blowout location, else back into the source). When
/// fewer than two destinations fit alongside the disposal volume the step
/// degrades to a plain transfer.
pub fn distribute(
    args: &DistributeArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let action = "distribute";
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

    let disposal = args.disposal_volume.filter(|v| *v > 0.0).unwrap_or(0.0);
    let capacity = pipette.tip_max_volume() - disposal - args.options.air_gap();
    let dests_per_aspirate = (capacity / args.volume).floor().max(0.0) as usize;
    if dests_per_aspirate < 2 {
        let fallback = TransferArgs {
            pipette: args.pipette.clone(),
            source_labware: args.source_labware.clone(),
            source_wells: vec![args.source_well.clone()],
            dest_labware: args.dest_labware.clone(),
            dest_wells: args.dest_wells.clone(),
            volume: args.volume,
            change_tip: args.change_tip,
            drop_tip_location: args.drop_tip_location.clone(),
            options: args.options.clone(),
        };
        return transfer(&fallback, ctx, state, keys);
    }

    let mut plan = LiquidPlan::new(ctx, pipette, &args.options, &args.drop_tip_location);
    let source = WellRef::new(&args.source_labware, &args.source_well);

    for (batch_index, batch) in args.dest_wells.chunks(dests_per_aspirate).enumerate() {
        let fresh_tip = args
            .change_tip
            .needs_new_tip(batch_index == 0, false, true);
        if fresh_tip {
            plan.replace_tip();
        }
        plan.draw(&source, args.volume * batch.len() as f64 + disposal, fresh_tip);
        let mut last_dest = source.clone();
        for well in batch {
            let dest = WellRef::new(&args.dest_labware, well);
            plan.dispense(&dest, args.volume);
            if plan.options().touch_tip_after_dispense {
                plan.touch_tip(&dest);
            }
            last_dest = dest;
        }
        if disposal > 0.0 {
            match plan.options().blowout_location {
                Some(BlowoutLocation::DestWell) | Some(BlowoutLocation::Labware(_)) => {
                    plan.blowout(&source, &last_dest)
                }
                Some(BlowoutLocation::SourceWell) | None => plan.blowout_at(&source),
            }
        }
    }

    if args.change_tip.drops_at_end() && !args.dest_wells.is_empty() {
        plan.drop_tip();
    }
    plan.run(state, keys)
}
