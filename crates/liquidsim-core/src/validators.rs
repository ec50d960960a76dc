//! Constraint validators
//!
//! Pure predicates over the invariant context, the current robot state and
//! a proposed action. Each returns the error it would raise (or `None`);
//! the atomic creators decide the order they run in and collect the
//! results.

use crate::context::InvariantContext;
use crate::deck::{self, Direction};
use crate::errors::CommandCreatorError;
use crate::model::{DisplayCategory, ModuleType, PipetteClass};
use crate::robot_state::selectors::{heater_shakers, is_off_deck, labware_module, labware_slot};
use crate::robot_state::RobotState;

// ========== Existence ==========

/// The pipette id must be declared in the invariant context
pub fn pipette_exists(
    ctx: &InvariantContext,
    action: &str,
    pipette: &str,
) -> Option<CommandCreatorError> {
    match ctx.pipette(pipette) {
        Some(_) => None,
        None => Some(CommandCreatorError::pipette_does_not_exist(action, pipette)),
    }
}

/// Labware must be registered and have a location in the state
pub fn labware_exists(
    ctx: &InvariantContext,
    state: &RobotState,
    action: &str,
    labware: &str,
) -> Option<CommandCreatorError> {
    if labware.is_empty() || ctx.labware(labware).is_none() || state.labware_location(labware).is_none()
    {
        return Some(CommandCreatorError::labware_does_not_exist(action, labware));
    }
    None
}

/// Only checked for labware that exists; a missing labware is reported once
pub fn well_exists(
    ctx: &InvariantContext,
    action: &str,
    labware: &str,
    well: &str,
) -> Option<CommandCreatorError> {
    let entity = ctx.labware(labware)?;
    if entity.definition.has_well(well) {
        None
    } else {
        Some(CommandCreatorError::well_does_not_exist(action, labware, well))
    }
}

/// The module must be declared and placed on the deck
pub fn module_exists(
    ctx: &InvariantContext,
    state: &RobotState,
    action: &str,
    module: &str,
) -> Option<CommandCreatorError> {
    if ctx.module(module).is_none() || !state.modules.contains_key(module) {
        return Some(CommandCreatorError::module_does_not_exist(action, module));
    }
    None
}

/// Existence first, then type
pub fn module_of_type(
    ctx: &InvariantContext,
    state: &RobotState,
    action: &str,
    module: &str,
    expected: ModuleType,
) -> Option<CommandCreatorError> {
    if let Some(err) = module_exists(ctx, state, action, module) {
        return Some(err);
    }
    match ctx.module(module) {
        Some(entity) if entity.module_type == expected => None,
        _ => Some(CommandCreatorError::module_type_mismatch(
            action,
            module,
            expected.display_name(),
        )),
    }
}

// ========== Tips ==========

/// Liquid handling at `labware`/`well` needs a tip on the pipette
pub fn tip_required(
    state: &RobotState,
    action: &str,
    pipette: &str,
    labware: &str,
    well: &str,
) -> Option<CommandCreatorError> {
    if state.pipette_has_tip(pipette) {
        None
    } else {
        Some(CommandCreatorError::no_tip_on_pipette(action, pipette, labware, well))
    }
}

/// Picking up a tip needs an empty nozzle
///
/// Returns `PIPETTE_HAS_TIP` when a tip is already attached.
///
/// ```
/// use liquidsim_core::robot_state::update::set_pipette_tip;
/// use liquidsim_core::validators::no_tip_held;
/// use liquidsim_core::RobotState;
///
/// let mut state = RobotState::default();
/// assert!(no_tip_held(&state, "p300").is_none());
///
/// set_pipette_tip(&mut state, "p300", true);
/// let err = no_tip_held(&state, "p300").unwrap();
/// assert_eq!(err.code(), "PIPETTE_HAS_TIP");
/// ```
pub fn no_tip_held(state: &RobotState, pipette: &str) -> Option<CommandCreatorError> {
    if state.pipette_has_tip(pipette) {
        Some(CommandCreatorError::pipette_has_tip(pipette))
    } else {
        None
    }
}

/// Every tip the pipette's channels would take from `well` must be present
pub fn tips_available(
    ctx: &InvariantContext,
    state: &RobotState,
    pipette: &str,
    tiprack: &str,
    well: &str,
) -> Option<CommandCreatorError> {
    let channels = ctx.pipette(pipette).map(|p| p.spec.channels).unwrap_or(1);
    let wells = ctx
        .labware(tiprack)
        .and_then(|l| l.definition.wells_for_tips(well, channels));
    let rack = state.tip_state.tipracks.get(tiprack);
    let available = match (wells, rack) {
        (Some(wells), Some(rack)) => wells
            .iter()
            .all(|w| rack.get(w).copied().unwrap_or(false)),
        _ => false,
    };
    if available {
        None
    } else {
        Some(CommandCreatorError::tip_not_available(pipette, tiprack, well))
    }
}

// ========== Capacity ==========

/// Volume bounds for an aspirate
///
/// A negative volume is reported on its own. Otherwise the pipette and tip
/// limits are checked independently, so a volume above both yields both
/// errors.
pub fn volume_within_capacity(
    ctx: &InvariantContext,
    action: &str,
    pipette: &str,
    volume: f64,
) -> Vec<CommandCreatorError> {
    if volume < 0.0 || !volume.is_finite() {
        return vec![CommandCreatorError::invalid_volume(action, volume)];
    }
    let Some(entity) = ctx.pipette(pipette) else {
        return Vec::new();
    };
    let mut errors = Vec::new();
    if volume > entity.spec.max_volume {
        errors.push(CommandCreatorError::pipette_volume_exceeded(
            action,
            volume,
            entity.spec.max_volume,
        ));
    }
    let tip_max = entity.tip_max_volume();
    if volume > tip_max {
        errors.push(CommandCreatorError::tip_volume_exceeded(action, volume, tip_max));
    }
    errors
}

// ========== Deck state ==========

/// Labware moved off deck cannot be reached
pub fn labware_on_deck(
    state: &RobotState,
    action: &str,
    labware: &str,
) -> Option<CommandCreatorError> {
    if is_off_deck(state, labware) {
        Some(CommandCreatorError::labware_off_deck(action, labware))
    } else {
        None
    }
}

// ========== Collisions ==========

/// GEN1 multi-channel reaching into or just north of a tall GEN1 module in
/// slot 1 or 3
pub fn module_pipette_collision(
    ctx: &InvariantContext,
    state: &RobotState,
    pipette: &str,
    labware: &str,
) -> Option<CommandCreatorError> {
    let spec = &ctx.pipette(pipette)?.spec;
    if spec.display_category != DisplayCategory::Gen1 || !spec.is_multi_channel() {
        return None;
    }
    let slot = labware_slot(state, labware)?;
    let on_module = labware_module(state, labware);
    let danger = state.modules.iter().any(|(id, m)| {
        let risky = ctx
            .module(id)
            .is_some_and(|e| e.model.has_gen1_collision_risk());
        let front_corner = m.slot == "1" || m.slot == "3";
        let reaches = on_module == Some(id.as_str())
            || deck::neighbor(&m.slot, Direction::North).as_deref() == Some(slot.as_str());
        risky && front_corner && reaches
    });
    danger.then(CommandCreatorError::module_pipette_collision_danger)
}

/// Labware inside a thermocycler whose lid is not known to be open
pub fn thermocycler_lid_closed(state: &RobotState, labware: &str) -> Option<CommandCreatorError> {
    let module = labware_module(state, labware)?;
    let tc = state.module_state(module)?.as_thermocycler()?;
    (tc.lid_open != Some(true)).then(CommandCreatorError::thermocycler_lid_closed)
}

/// Labware sitting on a heater-shaker whose latch is known open
///
/// An unknown latch state is not an error.
pub fn heater_shaker_latch_open(state: &RobotState, labware: &str) -> Option<CommandCreatorError> {
    let module = labware_module(state, labware)?;
    let hs = state.module_state(module)?.as_heater_shaker()?;
    (hs.latch_open == Some(true)).then(CommandCreatorError::heater_shaker_latch_open)
}

/// Labware sitting on a heater-shaker that is shaking
pub fn heater_shaker_shaking(state: &RobotState, labware: &str) -> Option<CommandCreatorError> {
    let module = labware_module(state, labware)?;
    let hs = state.module_state(module)?.as_heater_shaker()?;
    hs.is_shaking()
        .then(CommandCreatorError::heater_shaker_is_shaking)
}

/// Heater-shaker adjacency rules; waived for Flex-class pipettes
///
/// Checked in order: a shaking neighbour on any side, an open latch east or
/// west, any neighbour east or west of a multi-channel, any neighbour north
/// or south of a non-tiprack with a multi-channel.
pub fn heater_shaker_adjacency(
    ctx: &InvariantContext,
    state: &RobotState,
    pipette: &str,
    labware: &str,
) -> Vec<CommandCreatorError> {
    let mut errors = Vec::new();
    let Some(spec) = ctx.pipette(pipette).map(|p| &p.spec) else {
        return errors;
    };
    if spec.pipette_class() == PipetteClass::Flex {
        return errors;
    }
    let Some(slot) = labware_slot(state, labware) else {
        return errors;
    };
    let neighbours = heater_shakers(state);
    let multi = spec.is_multi_channel();
    let is_tiprack = ctx
        .labware(labware)
        .is_some_and(|l| l.definition.is_tiprack);

    if neighbours
        .iter()
        .any(|(_, hs_slot, hs)| hs.is_shaking() && deck::is_adjacent(&slot, hs_slot))
    {
        errors.push(CommandCreatorError::heater_shaker_north_south_east_west_shaking());
    }
    if neighbours.iter().any(|(_, hs_slot, hs)| {
        hs.latch_open == Some(true) && deck::is_east_west(&slot, hs_slot)
    }) {
        errors.push(CommandCreatorError::heater_shaker_east_west_latch_open());
    }
    if multi
        && neighbours
            .iter()
            .any(|(_, hs_slot, _)| deck::is_east_west(&slot, hs_slot))
    {
        errors.push(CommandCreatorError::heater_shaker_east_west_multi_channel());
    }
    if multi
        && !is_tiprack
        && neighbours
            .iter()
            .any(|(_, hs_slot, _)| deck::is_north_south(&slot, hs_slot))
    {
        errors.push(CommandCreatorError::heater_shaker_north_south_non_tiprack_multi_channel());
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeaterShakerModuleState, ModuleState};
    use crate::robot_state::{LabwareLocation, ModuleTemporalProperties};

    fn state_with_heater_shaker(hs: HeaterShakerModuleState) -> RobotState {
        let mut state = RobotState::default();
        state.modules.insert(
            "hs".to_string(),
            ModuleTemporalProperties {
                slot: "4".to_string(),
                module_state: ModuleState::HeaterShaker(hs),
            },
        );
        state
            .labware
            .insert("plate".to_string(), LabwareLocation::Module("hs".to_string()));
        state
    }

    #[test]
    fn test_latch_open_blocks_pipetting() {
        let state = state_with_heater_shaker(HeaterShakerModuleState {
            latch_open: Some(true),
            ..Default::default()
        });
        assert!(heater_shaker_latch_open(&state, "plate").is_some());
        assert!(heater_shaker_shaking(&state, "plate").is_none());
    }

    #[test]
    fn test_unknown_latch_is_not_open() {
        let state = state_with_heater_shaker(HeaterShakerModuleState::default());
        assert!(heater_shaker_latch_open(&state, "plate").is_none());
    }

    #[test]
    fn test_negative_volume_reported_alone() {
        let ctx = InvariantContext::default();
        let errors = volume_within_capacity(&ctx, "aspirate", "p", -1.0);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), "INVALID_VOLUME");
    }

    #[test]
    fn test_off_deck_labware_flagged() {
        let mut state = RobotState::default();
        state
            .labware
            .insert("plate".to_string(), LabwareLocation::OffDeck);
        assert!(labware_on_deck(&state, "blowout", "plate").is_some());
        assert!(labware_on_deck(&state, "blowout", "other").is_none());
    }
}
