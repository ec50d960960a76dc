//! Read-only queries over a robot state
//!
//! Validators and compound creators need the same handful of derived facts
//! (where is this labware physically, which heater-shakers are around, where
//! is the next tip). They live here so both agree on the answer.

use super::{LabwareLocation, RobotState};
use crate::context::InvariantContext;
use crate::deck;
use crate::model::{HeaterShakerModuleState, ModuleState, ModuleType};

/// Deck slot a labware physically sits in
///
/// Labware on a module resolves to the module's slot. `None` when the
/// labware is off deck or unknown.
pub fn labware_slot(state: &RobotState, labware: &str) -> Option<String> {
    match state.labware_location(labware)? {
        LabwareLocation::Slot(slot) => Some(slot.clone()),
        LabwareLocation::Module(module) => state.modules.get(module).map(|m| m.slot.clone()),
        LabwareLocation::OffDeck => None,
    }
}

/// Module the labware is loaded on, if any
pub fn labware_module<'a>(state: &'a RobotState, labware: &str) -> Option<&'a str> {
    match state.labware_location(labware)? {
        LabwareLocation::Module(module) => Some(module.as_str()),
        _ => None,
    }
}

pub fn is_off_deck(state: &RobotState, labware: &str) -> bool {
    matches!(state.labware_location(labware), Some(LabwareLocation::OffDeck))
}

/// Every heater-shaker on deck with its slot and state, ordered by id
pub fn heater_shakers(state: &RobotState) -> Vec<(&str, &str, &HeaterShakerModuleState)> {
    state
        .modules
        .iter()
        .filter_map(|(id, m)| match &m.module_state {
            ModuleState::HeaterShaker(hs) => Some((id.as_str(), m.slot.as_str(), hs)),
            _ => None,
        })
        .collect()
}

/// Id of whatever occupies a location, ignoring `ignore` (the item being moved)
///
/// A slot is occupied by a module covering it or by labware placed in it;
/// a module is occupied by labware loaded on it.
pub fn location_occupant(
    ctx: &InvariantContext,
    state: &RobotState,
    location: &LabwareLocation,
    ignore: &str,
) -> Option<String> {
    match location {
        LabwareLocation::Slot(slot) => {
            let wanted = deck::covered_slots(slot);
            let module = state.modules.iter().find(|(id, m)| {
                let covered = match ctx.module(id).map(|e| e.module_type) {
                    Some(ModuleType::Thermocycler) => deck::thermocycler_slots(&m.slot),
                    _ => deck::covered_slots(&m.slot),
                };
                covered.iter().any(|s| wanted.contains(s))
            });
            if let Some((id, _)) = module {
                return Some(id.clone());
            }
            state
                .labware
                .iter()
                .filter(|(id, _)| id.as_str() != ignore)
                .find(|(_, loc)| match loc {
                    LabwareLocation::Slot(other) => deck::covered_slots(other)
                        .iter()
                        .any(|s| wanted.contains(s)),
                    _ => false,
                })
                .map(|(id, _)| id.clone())
        }
        LabwareLocation::Module(module) => state
            .labware
            .iter()
            .filter(|(id, _)| id.as_str() != ignore)
            .find(|(_, loc)| matches!(loc, LabwareLocation::Module(m) if m == module))
            .map(|(id, _)| id.clone()),
        LabwareLocation::OffDeck => None,
    }
}

/// Next tip to pick up for `pipette`: `(tiprack id, first well)`
///
/// Searches on-deck tip racks of the pipette's tip type in deck order.
/// Single-channel pipettes take the first remaining tip; 8-channel pipettes
/// need a full column; 96-channel pipettes need a full rack.
pub fn next_tiprack(
    ctx: &InvariantContext,
    state: &RobotState,
    pipette: &str,
) -> Option<(String, String)> {
    let entity = ctx.pipette(pipette)?;
    let mut racks: Vec<(String, String)> = state
        .tip_state
        .tipracks
        .keys()
        .filter(|id| {
            ctx.labware(id)
                .is_some_and(|l| l.def_uri == entity.tiprack_def_uri)
        })
        .filter_map(|id| labware_slot(state, id).map(|slot| (slot, id.clone())))
        .collect();
    racks.sort_by_key(|(slot, id)| (deck::slot_sort_key(slot), id.clone()));

    racks.into_iter().find_map(|(_, rack_id)| {
        let tips = state.tip_state.tipracks.get(&rack_id)?;
        let definition = &ctx.labware(&rack_id)?.definition;
        let has_tip = |well: &String| tips.get(well).copied().unwrap_or(false);
        let well = match entity.spec.channels {
            1 => definition.ordered_wells().find(|w| has_tip(w))?.clone(),
            8 => definition
                .ordering
                .iter()
                .find(|column| !column.is_empty() && column.iter().all(has_tip))?
                .first()?
                .clone(),
            _ => {
                if definition.ordered_wells().all(has_tip) {
                    definition.ordered_wells().next()?.clone()
                } else {
                    return None;
                }
            }
        };
        Some((rack_id, well))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot_state::ModuleTemporalProperties;

    #[test]
    fn test_labware_on_module_resolves_to_module_slot() {
        let mut state = RobotState::default();
        state.modules.insert(
            "mag".to_string(),
            ModuleTemporalProperties {
                slot: "1".to_string(),
                module_state: ModuleState::MagneticBlock,
            },
        );
        state
            .labware
            .insert("plate".to_string(), LabwareLocation::Module("mag".to_string()));
        state
            .labware
            .insert("lost".to_string(), LabwareLocation::OffDeck);

        assert_eq!(labware_slot(&state, "plate").as_deref(), Some("1"));
        assert_eq!(labware_module(&state, "plate"), Some("mag"));
        assert_eq!(labware_slot(&state, "lost"), None);
        assert!(is_off_deck(&state, "lost"));
    }

    #[test]
    fn test_occupant_ignores_moving_labware() {
        let ctx = InvariantContext::default();
        let mut state = RobotState::default();
        state
            .labware
            .insert("plate".to_string(), LabwareLocation::Slot("2".to_string()));
        let target = LabwareLocation::Slot("2".to_string());

        assert_eq!(
            location_occupant(&ctx, &state, &target, "other").as_deref(),
            Some("plate")
        );
        assert_eq!(location_occupant(&ctx, &state, &target, "plate"), None);
    }
}
