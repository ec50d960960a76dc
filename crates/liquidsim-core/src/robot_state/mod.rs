//! Simulated robot state
//!
//! A [`RobotState`] is a value: command creators receive it by reference
//! and hand back a new snapshot. Changes go through the per-entity
//! functions in [`update`]; [`apply_command`] maps a command onto them.

pub mod apply;
pub mod selectors;
pub mod update;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::InvariantContext;
use crate::deck;
use crate::errors::{LiquidSimError, Result};
use crate::model::{ModuleState, ModuleType, Mount};

pub use apply::{apply_command, apply_commands, StateUpdate};

/// Liquid id to volume (µL) held at one location
pub type LocationLiquidState = BTreeMap<String, f64>;

/// Total volume at one location
pub fn total_volume(liquid: &LocationLiquidState) -> f64 {
    liquid.values().sum()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipState {
    /// tip rack id -> well -> tip present
    pub tipracks: BTreeMap<String, BTreeMap<String, bool>>,
    /// pipette id -> holds a tip
    pub pipettes: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabwareLocation {
    #[serde(rename = "slotName")]
    Slot(String),
    #[serde(rename = "moduleId")]
    Module(String),
    OffDeck,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipetteTemporalProperties {
    pub mount: Mount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleTemporalProperties {
    pub slot: String,
    pub module_state: ModuleState,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidState {
    /// pipette id -> channel index -> contents of that channel's tip
    pub pipettes: BTreeMap<String, BTreeMap<usize, LocationLiquidState>>,
    /// labware id -> well -> contents
    pub labware: BTreeMap<String, BTreeMap<String, LocationLiquidState>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotState {
    pub tip_state: TipState,
    pub pipettes: BTreeMap<String, PipetteTemporalProperties>,
    pub labware: BTreeMap<String, LabwareLocation>,
    pub modules: BTreeMap<String, ModuleTemporalProperties>,
    pub liquid_state: LiquidState,
}

impl RobotState {
    pub fn pipette_has_tip(&self, pipette: &str) -> bool {
        self.tip_state.pipettes.get(pipette).copied().unwrap_or(false)
    }

    pub fn labware_location(&self, labware: &str) -> Option<&LabwareLocation> {
        self.labware.get(labware)
    }

    pub fn module_state(&self, module: &str) -> Option<&ModuleState> {
        self.modules.get(module).map(|m| &m.module_state)
    }

    pub fn well_liquid(&self, labware: &str, well: &str) -> Option<&LocationLiquidState> {
        self.liquid_state.labware.get(labware)?.get(well)
    }

    pub fn well_volume(&self, labware: &str, well: &str) -> f64 {
        self.well_liquid(labware, well).map(total_volume).unwrap_or(0.0)
    }

    /// Total volume held across every channel of a pipette
    pub fn pipette_volume(&self, pipette: &str) -> f64 {
        self.liquid_state
            .pipettes
            .get(pipette)
            .map(|channels| channels.values().map(total_volume).sum())
            .unwrap_or(0.0)
    }
}

/// Placement of entities before the first step runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialDeckSetup {
    pub pipettes: BTreeMap<String, Mount>,
    pub modules: BTreeMap<String, String>,
    pub labware: BTreeMap<String, LabwareLocation>,
}

impl RobotState {
    /// Build the starting state: idle modules, full tip racks, no tips on
    /// pipettes and no liquid anywhere
    ///
    /// # Errors
    ///
    /// Returns `UnknownEntity` when the setup names an id missing from the
    /// context, and `SlotOccupied` when two top-level items share a slot or
    /// labware is placed on an occupied module.
    pub fn initial(ctx: &InvariantContext, setup: &InitialDeckSetup) -> Result<Self> {
        let mut state = RobotState::default();
        let mut occupied: BTreeMap<String, String> = BTreeMap::new();

        for (id, mount) in &setup.pipettes {
            if ctx.pipette(id).is_none() {
                return Err(unknown("pipette", id));
            }
            state.tip_state.pipettes.insert(id.clone(), false);
            state
                .pipettes
                .insert(id.clone(), PipetteTemporalProperties { mount: *mount });
        }

        for (id, slot) in &setup.modules {
            let module = ctx.module(id).ok_or_else(|| unknown("module", id))?;
            let slots = match module.module_type {
                ModuleType::Thermocycler => deck::thermocycler_slots(slot),
                _ => deck::covered_slots(slot),
            };
            for covered in slots {
                claim(&mut occupied, covered, id)?;
            }
            state.modules.insert(
                id.clone(),
                ModuleTemporalProperties {
                    slot: slot.clone(),
                    module_state: ModuleState::initial(module.module_type),
                },
            );
        }

        for (id, location) in &setup.labware {
            let labware = ctx.labware(id).ok_or_else(|| unknown("labware", id))?;
            match location {
                LabwareLocation::Slot(slot) => {
                    for covered in deck::covered_slots(slot) {
                        claim(&mut occupied, covered, id)?;
                    }
                }
                LabwareLocation::Module(module_id) => {
                    if !state.modules.contains_key(module_id) {
                        return Err(unknown("module", module_id));
                    }
                    claim(&mut occupied, format!("module:{}", module_id), id)?;
                }
                LabwareLocation::OffDeck => {}
            }
            if labware.definition.is_tiprack {
                let wells = labware
                    .definition
                    .ordered_wells()
                    .map(|w| (w.clone(), true))
                    .collect();
                state.tip_state.tipracks.insert(id.clone(), wells);
            }
            state.labware.insert(id.clone(), location.clone());
        }

        Ok(state)
    }
}

fn claim(occupied: &mut BTreeMap<String, String>, slot: String, id: &str) -> Result<()> {
    if let Some(occupant) = occupied.get(&slot) {
        return Err(LiquidSimError::SlotOccupied {
            slot,
            occupant: occupant.clone(),
        });
    }
    occupied.insert(slot, id.to_string());
    Ok(())
}

fn unknown(kind: &str, id: &str) -> LiquidSimError {
    LiquidSimError::UnknownEntity {
        entity_kind: kind.to_string(),
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labware_location_wire_shape() {
        let slot = serde_json::to_string(&LabwareLocation::Slot("1".to_string())).unwrap();
        assert_eq!(slot, r#"{"slotName":"1"}"#);
        let off = serde_json::to_string(&LabwareLocation::OffDeck).unwrap();
        assert_eq!(off, r#""offDeck""#);
    }

    #[test]
    fn test_empty_state_queries() {
        let state = RobotState::default();
        assert!(!state.pipette_has_tip("p"));
        assert_eq!(state.well_volume("plate", "A1"), 0.0);
        assert_eq!(state.pipette_volume("p"), 0.0);
    }

    #[test]
    fn test_initial_rejects_unknown_ids() {
        let ctx = InvariantContext::default();
        let mut setup = InitialDeckSetup::default();
        setup
            .labware
            .insert("ghost".to_string(), LabwareLocation::Slot("1".to_string()));
        let err = RobotState::initial(&ctx, &setup).unwrap_err();
        assert!(matches!(err, LiquidSimError::UnknownEntity { .. }));
    }
}
