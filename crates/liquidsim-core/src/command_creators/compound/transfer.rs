use serde::{Deserialize, Serialize};

use super::{pipette_for, ChangeTipPolicy, LiquidHandlingOptions, LiquidPlan, WellRef};
use crate::command_creators::CommandCreatorResult;
use crate::context::InvariantContext;
use crate::errors::CommandCreatorError;
use crate::keys::KeyGenerator;
use crate::robot_state::RobotState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferArgs {
    pub pipette: String,
    pub source_labware: String,
    pub source_wells: Vec<String>,
    pub dest_labware: String,
    pub dest_wells: Vec<String>,
    /// Volume moved per source/destination pair
    pub volume: f64,
    pub change_tip: ChangeTipPolicy,
    pub drop_tip_location: String,
    #[serde(default)]
    pub options: LiquidHandlingOptions,
}

/// Pair sources with destinations: one-to-one, one-to-many or many-to-one
pub(crate) fn pair_wells(
    sources: &[String],
    dests: &[String],
) -> Result<Vec<(String, String)>, CommandCreatorError> {
    let pairs = match (sources.len(), dests.len()) {
        (s, d) if s == d => sources.iter().cloned().zip(dests.iter().cloned()).collect(),
        (1, _) => dests
            .iter()
            .map(|d| (sources[0].clone(), d.clone()))
            .collect(),
        (_, 1) => sources
            .iter()
            .map(|s| (s.clone(), dests[0].clone()))
            .collect(),
        (s, d) => return Err(CommandCreatorError::mismatched_source_destination_wells(s, d)),
    };
    Ok(pairs)
}

/// Most aspirate/dispense cycles a single source/destination pair is split into
pub const MAX_CHUNKS_PER_PAIR: usize = 1000;

/// Equal chunks no larger than `capacity`
///
/// `None` when more than [`MAX_CHUNKS_PER_PAIR`] chunks would be needed.
pub(crate) fn split_volume(volume: f64, capacity: f64) -> Option<Vec<f64>> {
    if volume <= capacity || capacity <= 0.0 {
        return Some(vec![volume]);
    }
    let chunks = (volume / capacity).ceil();
    if chunks > MAX_CHUNKS_PER_PAIR as f64 {
        return None;
    }
    let chunks = chunks as usize;
    Some(vec![volume / chunks as f64; chunks])
}

/// Move `volume` from each source well to its paired destination well
///
/// Volumes above the tip capacity (less any air gap) are split into equal
/// chunks, each a full aspirate/dispense cycle.
pub fn transfer(
    args: &TransferArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let action = "transfer";
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
    let pairs = match pair_wells(&args.source_wells, &args.dest_wells) {
        Ok(pairs) => pairs,
        Err(err) => return CommandCreatorResult::failure(vec![err]),
    };

    let mut plan = LiquidPlan::new(ctx, pipette, &args.options, &args.drop_tip_location);
    let capacity = plan.liquid_capacity();
    let Some(chunks) = split_volume(args.volume, capacity) else {
        return CommandCreatorResult::failure(vec![CommandCreatorError::invalid_volume(
            action,
            args.volume,
        )
        .with_max_volume(capacity * MAX_CHUNKS_PER_PAIR as f64)
        .with_message(format!(
            "Volume needs more than {} aspirate/dispense cycles per well",
            MAX_CHUNKS_PER_PAIR
        ))]);
    };
    let air_gap = plan.options().air_gap_volume.filter(|v| *v > 0.0);
    let mut previous: Option<&(String, String)> = None;

    for pair in &pairs {
        let source = WellRef::new(&args.source_labware, &pair.0);
        let dest = WellRef::new(&args.dest_labware, &pair.1);
        for (chunk_index, chunk) in chunks.iter().enumerate() {
            let is_first = previous.is_none() && chunk_index == 0;
            let source_changed = chunk_index == 0 && previous.is_some_and(|p| p.0 != pair.0);
            let dest_changed = chunk_index == 0 && previous.is_some_and(|p| p.1 != pair.1);
            let fresh_tip = args
                .change_tip
                .needs_new_tip(is_first, source_changed, dest_changed);
            if fresh_tip {
                plan.replace_tip();
            }

            plan.draw(&source, *chunk, fresh_tip);
            plan.dispense(&dest, *chunk + air_gap.unwrap_or(0.0));
            if plan.options().touch_tip_after_dispense {
                plan.touch_tip(&dest);
            }
            if let Some(settings) = plan.options().mix_in_destination {
                plan.mix(&dest, settings);
            }
            plan.blowout(&source, &dest);
        }
        previous = Some(pair);
    }

    if args.change_tip.drops_at_end() && !pairs.is_empty() {
        plan.drop_tip();
    }
    plan.run(state, keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wells(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pairing_rules() {
        assert_eq!(pair_wells(&wells(&["A1", "B1"]), &wells(&["C1", "D1"])).unwrap().len(), 2);
        let broadcast = pair_wells(&wells(&["A1"]), &wells(&["C1", "D1", "E1"])).unwrap();
        assert!(broadcast.iter().all(|(s, _)| s == "A1"));
        let gather = pair_wells(&wells(&["A1", "B1"]), &wells(&["C1"])).unwrap();
        assert!(gather.iter().all(|(_, d)| d == "C1"));
        let err = pair_wells(&wells(&["A1", "B1"]), &wells(&["C1", "D1", "E1"])).unwrap_err();
        assert_eq!(err.code(), "MISMATCHED_SOURCE_DESTINATION_WELLS");
    }

    #[test]
    fn test_split_volume_equal_chunks() {
        assert_eq!(split_volume(150.0, 200.0), Some(vec![150.0]));
        assert_eq!(split_volume(250.0, 200.0), Some(vec![125.0, 125.0]));
        assert_eq!(split_volume(600.0, 200.0), Some(vec![200.0, 200.0, 200.0]));
    }

    #[test]
    fn test_split_volume_refuses_huge_chunk_counts() {
        assert_eq!(split_volume(300_000.0, 300.0).map(|c| c.len()), Some(1000));
        assert_eq!(split_volume(300_001.0, 300.0), None);
        assert_eq!(split_volume(1.0e15, 300.0), None);
    }
}
