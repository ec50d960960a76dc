//! Shared test fixtures
//!
//! A small standard deck: one GEN2 single-channel P300 on the left mount,
//! a 300 µL tip rack in slot 1, a source plate in slot 2, a destination
//! plate in slot 3, a single-well trash in slot 12 and an empty
//! heater-shaker in slot 10.

#![allow(dead_code)]

use std::collections::BTreeMap;

use liquidsim_core::command_creators::compound::{
    ChangeTipPolicy, LiquidHandlingOptions, TransferArgs,
};
use liquidsim_core::model::{
    DisplayCategory, LabwareDefinition, LabwareEntity, ModuleEntity, ModuleModel, ModuleType,
    Mount, PipetteEntity, PipetteSpec, WellDefinition,
};
use liquidsim_core::robot_state::update::{load_liquid, set_labware_location, set_pipette_tip};
use liquidsim_core::robot_state::LabwareLocation;
use liquidsim_core::{InitialDeckSetup, InvariantContext, RobotState, SequentialKeyGenerator};

pub const PIPETTE: &str = "p300";
pub const TIPRACK: &str = "tiprack";
pub const SOURCE: &str = "source";
pub const DEST: &str = "dest";
pub const TRASH: &str = "trash";
pub const HEATER_SHAKER: &str = "hs";
pub const WATER: &str = "water";

const TIPRACK_URI: &str = "opentrons/opentrons_96_tiprack_300ul/1";

/// Column-major `cols` x `rows` grid of wells named A1, B1, ...
pub fn grid(uri: &str, cols: usize, rows: usize, well_volume: f64) -> LabwareDefinition {
    let row_names: Vec<char> = ('A'..='Z').take(rows).collect();
    let ordering: Vec<Vec<String>> = (1..=cols)
        .map(|col| row_names.iter().map(|r| format!("{r}{col}")).collect())
        .collect();
    let wells: BTreeMap<String, WellDefinition> = ordering
        .iter()
        .flatten()
        .map(|name| {
            (
                name.clone(),
                WellDefinition {
                    total_liquid_volume: well_volume,
                    depth: 10.0,
                },
            )
        })
        .collect();
    LabwareDefinition {
        uri: uri.to_string(),
        is_tiprack: false,
        tip_volume: None,
        tip_length: None,
        ordering,
        wells,
    }
}

pub fn tiprack_definition() -> LabwareDefinition {
    LabwareDefinition {
        is_tiprack: true,
        tip_volume: Some(300.0),
        tip_length: Some(59.3),
        ..grid(TIPRACK_URI, 12, 8, 300.0)
    }
}

pub fn labware(id: &str, definition: LabwareDefinition) -> LabwareEntity {
    LabwareEntity {
        id: id.to_string(),
        label: None,
        def_uri: definition.uri.clone(),
        definition,
    }
}

pub fn pipette(id: &str, channels: u32, display_category: DisplayCategory) -> PipetteEntity {
    PipetteEntity {
        id: id.to_string(),
        name: format!("p300_{}", if channels == 1 { "single" } else { "multi" }),
        spec: PipetteSpec {
            name: "p300".to_string(),
            channels,
            max_volume: 300.0,
            min_volume: 20.0,
            display_category,
            default_aspirate_flow_rate: 92.86,
            default_dispense_flow_rate: 92.86,
            default_blowout_flow_rate: 92.86,
        },
        tiprack_def_uri: TIPRACK_URI.to_string(),
        tiprack_definition: tiprack_definition(),
    }
}

pub fn standard_context() -> InvariantContext {
    InvariantContext::builder()
        .pipette(pipette(PIPETTE, 1, DisplayCategory::Gen2))
        .labware(labware(TIPRACK, tiprack_definition()))
        .labware(labware(SOURCE, grid("test/plate_96/1", 12, 8, 200.0)))
        .labware(labware(DEST, grid("test/plate_96/1", 12, 8, 200.0)))
        .labware(labware(TRASH, grid("test/fixed_trash/1", 1, 1, 1_000_000.0)))
        .module(ModuleEntity {
            id: HEATER_SHAKER.to_string(),
            module_type: ModuleType::HeaterShaker,
            model: ModuleModel::HeaterShakerModuleV1,
        })
        .build()
        .expect("standard context is valid")
}

pub fn standard_setup() -> InitialDeckSetup {
    let mut setup = InitialDeckSetup::default();
    setup.pipettes.insert(PIPETTE.to_string(), Mount::Left);
    setup
        .modules
        .insert(HEATER_SHAKER.to_string(), "10".to_string());
    for (id, slot) in [(TIPRACK, "1"), (SOURCE, "2"), (DEST, "3"), (TRASH, "12")] {
        setup
            .labware
            .insert(id.to_string(), LabwareLocation::Slot(slot.to_string()));
    }
    setup
}

/// Standard deck with 150 µL of water in every well of column 1 of the
/// source plate
pub fn standard_state(ctx: &InvariantContext) -> RobotState {
    let mut state = RobotState::initial(ctx, &standard_setup()).expect("standard setup is valid");
    for row in ["A", "B", "C", "D", "E", "F", "G", "H"] {
        load_liquid(&mut state, SOURCE, &format!("{row}1"), WATER, 150.0);
    }
    state
}

/// Standard state with a tip already on the pipette
pub fn state_with_tip(ctx: &InvariantContext) -> RobotState {
    let mut state = standard_state(ctx);
    set_pipette_tip(&mut state, PIPETTE, true);
    state
}

/// Standard state with `labware` moved off deck
pub fn state_with_off_deck(ctx: &InvariantContext, labware: &str) -> RobotState {
    let mut state = standard_state(ctx);
    set_labware_location(&mut state, labware, LabwareLocation::OffDeck);
    state
}

/// Context for deck-placement rules: one pipette of the given build, the
/// tip rack, the source plate and `modules`
pub fn placement_context(
    channels: u32,
    display_category: DisplayCategory,
    modules: &[(&str, ModuleModel)],
) -> InvariantContext {
    let mut builder = InvariantContext::builder()
        .pipette(pipette(PIPETTE, channels, display_category))
        .labware(labware(TIPRACK, tiprack_definition()))
        .labware(labware(SOURCE, grid("test/plate_96/1", 12, 8, 200.0)));
    for (id, model) in modules {
        builder = builder.module(ModuleEntity {
            id: id.to_string(),
            module_type: model.module_type(),
            model: *model,
        });
    }
    builder.build().expect("placement context is valid")
}

/// Tip on the pipette, tip rack in slot 12, modules in the given slots and
/// the source plate (water in column 1) at `source`
pub fn placement_state(
    ctx: &InvariantContext,
    modules: &[(&str, &str)],
    source: LabwareLocation,
) -> RobotState {
    let mut setup = InitialDeckSetup::default();
    setup.pipettes.insert(PIPETTE.to_string(), Mount::Left);
    for (id, slot) in modules {
        setup.modules.insert(id.to_string(), slot.to_string());
    }
    setup.labware.insert(TIPRACK.to_string(), slot("12"));
    setup.labware.insert(SOURCE.to_string(), source);

    let mut state = RobotState::initial(ctx, &setup).expect("placement setup is valid");
    for row in ["A", "B", "C", "D", "E", "F", "G", "H"] {
        load_liquid(&mut state, SOURCE, &format!("{row}1"), WATER, 150.0);
    }
    set_pipette_tip(&mut state, PIPETTE, true);
    state
}

pub fn slot(name: &str) -> LabwareLocation {
    LabwareLocation::Slot(name.to_string())
}

pub fn on_module(module: &str) -> LabwareLocation {
    LabwareLocation::Module(module.to_string())
}

pub fn keys() -> SequentialKeyGenerator {
    SequentialKeyGenerator::new("k")
}

pub fn wells(names: &[&str]) -> Vec<String> {
    names.iter().map(|w| w.to_string()).collect()
}

/// Transfer arguments from the source plate to the destination plate
pub fn transfer_args(
    source_wells: &[&str],
    dest_wells: &[&str],
    volume: f64,
    change_tip: ChangeTipPolicy,
) -> TransferArgs {
    TransferArgs {
        pipette: PIPETTE.to_string(),
        source_labware: SOURCE.to_string(),
        source_wells: wells(source_wells),
        dest_labware: DEST.to_string(),
        dest_wells: wells(dest_wells),
        volume,
        change_tip,
        drop_tip_location: TRASH.to_string(),
        options: LiquidHandlingOptions::default(),
    }
}
