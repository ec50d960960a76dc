//! No-op command stripping
//!
//! An aspirate immediately followed by a dispense of the same volume back
//! into the same well leaves the deck unchanged. Substep previews drop such
//! pairs so the displayed commands match what visibly happens. Air-gap
//! aspirates are never part of a pair.

use crate::commands::{Command, CommandParams, LiquidHandlingParams};

/// Remove adjacent pairs matching `is_pair`
///
/// One pass scans left to right and removes non-overlapping pairs. Passes
/// repeat until the length stops changing, so pairs that become adjacent
/// after an inner pair is removed are stripped too.
pub fn remove_pairs<T: Clone>(items: &[T], is_pair: impl Fn(&T, &T) -> bool) -> Vec<T> {
    let mut current: Vec<T> = items.to_vec();
    loop {
        let before = current.len();
        let mut next = Vec::with_capacity(before);
        let mut i = 0;
        while i < current.len() {
            if i + 1 < current.len() && is_pair(&current[i], &current[i + 1]) {
                i += 2;
            } else {
                next.push(current[i].clone());
                i += 1;
            }
        }
        current = next;
        if current.len() == before {
            return current;
        }
    }
}

fn same_target(a: &LiquidHandlingParams, b: &LiquidHandlingParams) -> bool {
    a.pipette_id == b.pipette_id
        && a.labware_id == b.labware_id
        && a.well_name == b.well_name
        && a.volume == b.volume
}

/// True for an aspirate followed by a dispense that returns the same volume
/// to the same well with the same pipette
pub fn is_no_op_pair(first: &Command, second: &Command) -> bool {
    if first.is_air_gap() || second.is_air_gap() {
        return false;
    }
    match (&first.params, &second.params) {
        (CommandParams::Aspirate(asp), CommandParams::Dispense(disp)) => same_target(asp, disp),
        _ => false,
    }
}

/// Drop every no-op aspirate/dispense pair
pub fn strip_no_op_commands(commands: &[Command]) -> Vec<Command> {
    remove_pairs(commands, is_no_op_pair)
}
