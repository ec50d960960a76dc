//! Per-entity robot state updates
//!
//! Each function changes one concern of an owned [`RobotState`]. Callers
//! clone the snapshot they were given and thread the copy through these.

use super::{total_volume, LabwareLocation, LocationLiquidState, RobotState};
use crate::model::{ModuleState, TemperatureStatus};

/// Volumes below this are treated as empty and dropped
const VOLUME_EPSILON: f64 = 1e-9;

pub fn set_pipette_tip(state: &mut RobotState, pipette: &str, has_tip: bool) {
    state.tip_state.pipettes.insert(pipette.to_string(), has_tip);
}

/// Mark tip rack wells as empty
pub fn consume_tips(state: &mut RobotState, tiprack: &str, wells: &[String]) {
    if let Some(rack) = state.tip_state.tipracks.get_mut(tiprack) {
        for well in wells {
            rack.insert(well.clone(), false);
        }
    }
}

pub fn discard_pipette_liquid(state: &mut RobotState, pipette: &str) {
    state.liquid_state.pipettes.remove(pipette);
}

pub fn set_labware_location(state: &mut RobotState, labware: &str, location: LabwareLocation) {
    state.labware.insert(labware.to_string(), location);
}

/// Add `volume` of `liquid` to a well, as a protocol's initial liquid load does
pub fn load_liquid(state: &mut RobotState, labware: &str, well: &str, liquid: &str, volume: f64) {
    let contents = state
        .liquid_state
        .labware
        .entry(labware.to_string())
        .or_default()
        .entry(well.to_string())
        .or_default();
    *contents.entry(liquid.to_string()).or_insert(0.0) += volume;
}

/// Remove up to `volume` from `source`, keeping the ratio between liquids
///
/// Returns what was removed. Never removes more than `source` holds.
fn split_liquid(source: &mut LocationLiquidState, volume: f64) -> LocationLiquidState {
    let available = total_volume(source);
    if available <= VOLUME_EPSILON || volume <= 0.0 {
        return LocationLiquidState::new();
    }
    let fraction = (volume / available).min(1.0);
    let mut removed = LocationLiquidState::new();
    for (liquid, amount) in source.iter_mut() {
        let taken = *amount * fraction;
        *amount -= taken;
        removed.insert(liquid.clone(), taken);
    }
    source.retain(|_, amount| *amount > VOLUME_EPSILON);
    removed.retain(|_, amount| *amount > VOLUME_EPSILON);
    removed
}

fn merge_liquid(target: &mut LocationLiquidState, added: LocationLiquidState) {
    for (liquid, amount) in added {
        *target.entry(liquid).or_insert(0.0) += amount;
    }
}

/// Draw `volume` into every channel from the well under it
///
/// `wells[i]` is the well reached by channel `i`.
pub fn aspirate_liquid(
    state: &mut RobotState,
    pipette: &str,
    labware: &str,
    wells: &[String],
    volume: f64,
) {
    for (channel, well) in wells.iter().enumerate() {
        let taken = match state
            .liquid_state
            .labware
            .get_mut(labware)
            .and_then(|l| l.get_mut(well))
        {
            Some(contents) => split_liquid(contents, volume),
            None => LocationLiquidState::new(),
        };
        if taken.is_empty() {
            continue;
        }
        let tip = state
            .liquid_state
            .pipettes
            .entry(pipette.to_string())
            .or_default()
            .entry(channel)
            .or_default();
        merge_liquid(tip, taken);
    }
}

/// Push liquid out of every channel into the well under it
///
/// `volume` of `None` empties the channel (blowout).
pub fn dispense_liquid(
    state: &mut RobotState,
    pipette: &str,
    labware: &str,
    wells: &[String],
    volume: Option<f64>,
) {
    for (channel, well) in wells.iter().enumerate() {
        let released = match state
            .liquid_state
            .pipettes
            .get_mut(pipette)
            .and_then(|p| p.get_mut(&channel))
        {
            Some(tip) => {
                let amount = volume.unwrap_or_else(|| total_volume(tip));
                split_liquid(tip, amount)
            }
            None => LocationLiquidState::new(),
        };
        if released.is_empty() {
            continue;
        }
        let contents = state
            .liquid_state
            .labware
            .entry(labware.to_string())
            .or_default()
            .entry(well.clone())
            .or_default();
        merge_liquid(contents, released);
    }
    if let Some(channels) = state.liquid_state.pipettes.get_mut(pipette) {
        channels.retain(|_, tip| !tip.is_empty());
    }
}

fn module_state_mut<'a>(state: &'a mut RobotState, module: &str) -> Option<&'a mut ModuleState> {
    state.modules.get_mut(module).map(|m| &mut m.module_state)
}

pub fn set_magnet_engaged(state: &mut RobotState, module: &str, engaged: bool) {
    if let Some(ModuleState::Magnetic(magnet)) = module_state_mut(state, module) {
        magnet.engaged = engaged;
    }
}

pub fn set_temperature_target(
    state: &mut RobotState,
    module: &str,
    status: TemperatureStatus,
    target: Option<f64>,
) {
    if let Some(ModuleState::Temperature(temp)) = module_state_mut(state, module) {
        temp.status = status;
        temp.target_temperature = target;
    }
}

pub fn set_thermocycler_lid(state: &mut RobotState, module: &str, open: bool) {
    if let Some(ModuleState::Thermocycler(tc)) = module_state_mut(state, module) {
        tc.lid_open = Some(open);
    }
}

pub fn set_thermocycler_block_target(state: &mut RobotState, module: &str, target: Option<f64>) {
    if let Some(ModuleState::Thermocycler(tc)) = module_state_mut(state, module) {
        tc.block_target_temp = target;
    }
}

pub fn set_thermocycler_lid_target(state: &mut RobotState, module: &str, target: Option<f64>) {
    if let Some(ModuleState::Thermocycler(tc)) = module_state_mut(state, module) {
        tc.lid_target_temp = target;
    }
}

pub fn set_heater_shaker_temperature(state: &mut RobotState, module: &str, target: Option<f64>) {
    if let Some(ModuleState::HeaterShaker(hs)) = module_state_mut(state, module) {
        hs.target_temp = target;
    }
}

pub fn set_heater_shaker_speed(state: &mut RobotState, module: &str, rpm: Option<f64>) {
    if let Some(ModuleState::HeaterShaker(hs)) = module_state_mut(state, module) {
        hs.target_speed = rpm;
    }
}

pub fn set_heater_shaker_latch(state: &mut RobotState, module: &str, open: bool) {
    if let Some(ModuleState::HeaterShaker(hs)) = module_state_mut(state, module) {
        hs.latch_open = Some(open);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wells(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_aspirate_splits_proportionally() {
        let mut state = RobotState::default();
        load_liquid(&mut state, "plate", "A1", "water", 30.0);
        load_liquid(&mut state, "plate", "A1", "dye", 10.0);

        aspirate_liquid(&mut state, "p", "plate", &wells(&["A1"]), 20.0);

        let tip = &state.liquid_state.pipettes["p"][&0];
        assert!((tip["water"] - 15.0).abs() < 1e-9);
        assert!((tip["dye"] - 5.0).abs() < 1e-9);
        assert!((state.well_volume("plate", "A1") - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_aspirate_never_takes_more_than_present() {
        let mut state = RobotState::default();
        load_liquid(&mut state, "plate", "A1", "water", 5.0);

        aspirate_liquid(&mut state, "p", "plate", &wells(&["A1"]), 50.0);

        assert!((state.pipette_volume("p") - 5.0).abs() < 1e-9);
        assert_eq!(state.well_volume("plate", "A1"), 0.0);
    }

    #[test]
    fn test_aspirate_from_unknown_well_leaves_pipette_untracked() {
        let mut state = RobotState::default();

        aspirate_liquid(&mut state, "p", "plate", &wells(&["A1", "B1"]), 10.0);

        assert!(state.liquid_state.pipettes.is_empty());
        assert_eq!(state, RobotState::default());
    }

    #[test]
    fn test_dispense_conserves_volume() {
        let mut state = RobotState::default();
        load_liquid(&mut state, "trough", "A1", "buffer", 100.0);
        aspirate_liquid(&mut state, "p", "trough", &wells(&["A1", "A1"]), 10.0);

        dispense_liquid(&mut state, "p", "plate", &wells(&["A1", "B1"]), Some(10.0));

        assert!((state.well_volume("plate", "A1") - 10.0).abs() < 1e-9);
        assert!((state.well_volume("plate", "B1") - 10.0).abs() < 1e-9);
        assert!((state.well_volume("trough", "A1") - 80.0).abs() < 1e-9);
        assert_eq!(state.pipette_volume("p"), 0.0);
    }

    #[test]
    fn test_blowout_empties_channel() {
        let mut state = RobotState::default();
        load_liquid(&mut state, "plate", "A1", "water", 40.0);
        aspirate_liquid(&mut state, "p", "plate", &wells(&["A1"]), 25.0);

        dispense_liquid(&mut state, "p", "trash", &wells(&["A1"]), None);

        assert_eq!(state.pipette_volume("p"), 0.0);
        assert!((state.well_volume("trash", "A1") - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_module_setter_ignores_wrong_type() {
        let mut state = RobotState::default();
        set_magnet_engaged(&mut state, "missing", true);
        assert!(state.modules.is_empty());
    }
}
