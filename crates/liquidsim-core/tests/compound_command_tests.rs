#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use liquidsim_core::command_creators::compound::{
    consolidate, distribute, heater_shaker, mix, move_labware_step, replace_tip, temperature,
    thermocycler_state, transfer, ChangeTipPolicy, ConsolidateArgs, DistributeArgs,
    HeaterShakerArgs, LiquidHandlingOptions, MixArgs, MoveLabwareStepArgs, ReplaceTipArgs,
    TemperatureStepArgs, ThermocyclerStateArgs,
};
use liquidsim_core::command_creators::{curry, reduce_command_creators};
use liquidsim_core::commands::CommandParams;
use liquidsim_core::model::{ModuleEntity, ModuleModel, ModuleState, ModuleType};
use liquidsim_core::robot_state::LabwareLocation;
use liquidsim_core::{CommandCreatorResult, ErrorKind, InitialDeckSetup, InvariantContext, RobotState};

fn command_types(result: &CommandCreatorResult) -> Vec<&'static str> {
    result.commands().iter().map(|c| c.command_type()).collect()
}

fn error_kinds(result: &CommandCreatorResult) -> Vec<ErrorKind> {
    result.errors().iter().map(|e| e.kind()).collect()
}

// ========== Transfer ==========

#[test]
fn test_transfer_rejects_volume_needing_too_many_cycles() {
    // GIVEN a finite volume far beyond what any number of tip fills could move
    let ctx = standard_context();
    let state = standard_state(&ctx);
    let mut keys = keys();

    // WHEN transferring it
    let result = transfer(
        &transfer_args(&["A1"], &["A1"], 1.0e15, ChangeTipPolicy::Once),
        &ctx,
        &state,
        &mut keys,
    );

    // THEN the step is rejected before any command is planned
    assert_eq!(error_kinds(&result), vec![ErrorKind::InvalidVolume]);
    assert!(result.commands().is_empty());
    assert_eq!(keys.issued(), 0);
}

#[test]
fn test_transfer_at_chunk_limit_still_plans() {
    let ctx = standard_context();
    let state = standard_state(&ctx);

    // 1000 chunks of 300 µL: the largest split allowed
    let result = transfer(
        &transfer_args(&["A1"], &["A1"], 300_000.0, ChangeTipPolicy::Once),
        &ctx,
        &state,
        &mut keys(),
    );

    assert!(result.is_success(), "unexpected errors: {:?}", result.errors());
    let aspirates = result
        .commands()
        .iter()
        .filter(|c| c.command_type() == "aspirate")
        .count();
    assert_eq!(aspirates, 1000);
}

#[test]
fn test_distribute_fallback_rejects_huge_volume() {
    let ctx = standard_context();
    let state = standard_state(&ctx);
    let args = DistributeArgs {
        pipette: PIPETTE.to_string(),
        source_labware: SOURCE.to_string(),
        source_well: "A1".to_string(),
        dest_labware: DEST.to_string(),
        dest_wells: wells(&["A2", "A3"]),
        volume: 1.0e15,
        change_tip: ChangeTipPolicy::Once,
        drop_tip_location: TRASH.to_string(),
        disposal_volume: None,
        options: LiquidHandlingOptions::default(),
    };

    let result = distribute(&args, &ctx, &state, &mut keys());

    assert_eq!(error_kinds(&result), vec![ErrorKind::InvalidVolume]);
}

#[test]
fn test_transfer_once_single_pair() {
    let ctx = standard_context();
    let state = standard_state(&ctx);

    let result = transfer(
        &transfer_args(&["A1"], &["A1"], 100.0, ChangeTipPolicy::Once),
        &ctx,
        &state,
        &mut keys(),
    );

    assert_eq!(
        command_types(&result),
        vec!["pickUpTip", "aspirate", "dispense", "dropTip"]
    );
    let keys: Vec<&str> = result.commands().iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["k-0", "k-1", "k-2", "k-3"]);
    let next = result.robot_state().unwrap();
    assert!((next.well_volume(SOURCE, "A1") - 50.0).abs() < 1e-9);
    assert!((next.well_volume(DEST, "A1") - 100.0).abs() < 1e-9);
    assert!(!next.pipette_has_tip(PIPETTE));
}

#[test]
fn test_transfer_always_changes_tip_between_pairs() {
    let ctx = standard_context();
    let state = standard_state(&ctx);

    let result = transfer(
        &transfer_args(&["A1", "B1"], &["A1", "B1"], 20.0, ChangeTipPolicy::Always),
        &ctx,
        &state,
        &mut keys(),
    );

    assert_eq!(
        command_types(&result),
        vec![
            "pickUpTip",
            "aspirate",
            "dispense",
            "dropTip",
            "pickUpTip",
            "aspirate",
            "dispense",
            "dropTip"
        ]
    );
    let next = result.robot_state().unwrap();
    let used: Vec<&String> = next.tip_state.tipracks[TIPRACK]
        .iter()
        .filter(|(_, present)| !**present)
        .map(|(well, _)| well)
        .collect();
    assert_eq!(used.len(), 2);
}

#[test]
fn test_transfer_splits_volume_above_tip_capacity() {
    let ctx = standard_context();
    let state = standard_state(&ctx);

    let result = transfer(
        &transfer_args(&["A1"], &["A1"], 450.0, ChangeTipPolicy::Once),
        &ctx,
        &state,
        &mut keys(),
    );

    assert_eq!(
        command_types(&result),
        vec!["pickUpTip", "aspirate", "dispense", "aspirate", "dispense", "dropTip"]
    );
    match &result.commands()[1].params {
        CommandParams::Aspirate(params) => assert!((params.volume - 225.0).abs() < 1e-9),
        other => panic!("expected aspirate, got {other:?}"),
    }
}

#[test]
fn test_transfer_is_all_or_nothing() {
    // GIVEN five pairs whose third source well does not exist
    let ctx = standard_context();
    let state = standard_state(&ctx);
    let args = transfer_args(
        &["A1", "B1", "Z9", "D1", "E1"],
        &["A1", "B1", "C1", "D1", "E1"],
        10.0,
        ChangeTipPolicy::Once,
    );

    // WHEN the transfer runs
    let result = transfer(&args, &ctx, &state, &mut keys());

    // THEN it fails with no commands at all
    assert!(!result.is_success());
    assert!(result.commands().is_empty());
    assert_eq!(error_kinds(&result), vec![ErrorKind::WellDoesNotExist]);
}

#[test]
fn test_reduce_discards_commands_before_failing_child() {
    let ctx = standard_context();
    let state = standard_state(&ctx);
    let ok = transfer_args(&["A1"], &["A1"], 10.0, ChangeTipPolicy::Always);
    let bad = transfer_args(&["Z9"], &["A1"], 10.0, ChangeTipPolicy::Always);
    let creators = vec![
        curry(transfer, ok.clone()),
        curry(transfer, ok),
        curry(transfer, bad),
        curry(transfer, transfer_args(&["B1"], &["B1"], 10.0, ChangeTipPolicy::Always)),
        curry(transfer, transfer_args(&["C1"], &["C1"], 10.0, ChangeTipPolicy::Always)),
    ];

    let result = reduce_command_creators(creators, &ctx, &state, &mut keys());

    assert!(result.commands().is_empty());
    assert_eq!(error_kinds(&result), vec![ErrorKind::WellDoesNotExist]);
}

#[test]
fn test_transfer_mismatched_wells() {
    let ctx = standard_context();
    let state = standard_state(&ctx);

    let result = transfer(
        &transfer_args(&["A1", "B1"], &["A1", "B1", "C1"], 10.0, ChangeTipPolicy::Once),
        &ctx,
        &state,
        &mut keys(),
    );

    assert_eq!(
        error_kinds(&result),
        vec![ErrorKind::MismatchedSourceDestinationWells]
    );
}

#[test]
fn test_transfer_never_without_tip_fails() {
    let ctx = standard_context();
    let state = standard_state(&ctx);

    let result = transfer(
        &transfer_args(&["A1"], &["A1"], 10.0, ChangeTipPolicy::Never),
        &ctx,
        &state,
        &mut keys(),
    );

    assert_eq!(error_kinds(&result)[0], ErrorKind::NoTipOnPipette);
}

#[test]
fn test_transfer_with_air_gap_dispenses_gap_too() {
    let ctx = standard_context();
    let state = standard_state(&ctx);
    let mut args = transfer_args(&["A1"], &["A1"], 50.0, ChangeTipPolicy::Once);
    args.options = LiquidHandlingOptions {
        air_gap_volume: Some(10.0),
        ..LiquidHandlingOptions::default()
    };

    let result = transfer(&args, &ctx, &state, &mut keys());

    let commands = result.commands();
    assert_eq!(
        command_types(&result),
        vec!["pickUpTip", "aspirate", "aspirate", "dispense", "dropTip"]
    );
    assert!(!commands[1].is_air_gap());
    assert!(commands[2].is_air_gap());
    match &commands[3].params {
        CommandParams::Dispense(params) => assert!((params.volume - 60.0).abs() < 1e-9),
        other => panic!("expected dispense, got {other:?}"),
    }
}

// ========== Distribute / consolidate / mix ==========

#[test]
fn test_distribute_batches_with_disposal() {
    let ctx = standard_context();
    let state = standard_state(&ctx);
    let args = DistributeArgs {
        pipette: PIPETTE.to_string(),
        source_labware: SOURCE.to_string(),
        source_well: "A1".to_string(),
        dest_labware: DEST.to_string(),
        dest_wells: wells(&["A2", "A3", "A4", "A5"]),
        volume: 30.0,
        change_tip: ChangeTipPolicy::Once,
        drop_tip_location: TRASH.to_string(),
        disposal_volume: Some(20.0),
        options: LiquidHandlingOptions::default(),
    };

    let result = distribute(&args, &ctx, &state, &mut keys());

    assert_eq!(
        command_types(&result),
        vec![
            "pickUpTip",
            "aspirate",
            "dispense",
            "dispense",
            "dispense",
            "dispense",
            "blowout",
            "dropTip"
        ]
    );
    match &result.commands()[1].params {
        CommandParams::Aspirate(params) => assert!((params.volume - 140.0).abs() < 1e-9),
        other => panic!("expected aspirate, got {other:?}"),
    }
    let next = result.robot_state().unwrap();
    for well in ["A2", "A3", "A4", "A5"] {
        assert!((next.well_volume(DEST, well) - 30.0).abs() < 1e-9);
    }
    // disposal volume went back to the source
    assert!((next.well_volume(SOURCE, "A1") - 30.0).abs() < 1e-9);
}

#[test]
fn test_distribute_falls_back_to_transfer() {
    let ctx = standard_context();
    let state = standard_state(&ctx);
    let args = DistributeArgs {
        pipette: PIPETTE.to_string(),
        source_labware: SOURCE.to_string(),
        source_well: "A1".to_string(),
        dest_labware: DEST.to_string(),
        dest_wells: wells(&["A2", "A3"]),
        volume: 200.0,
        change_tip: ChangeTipPolicy::Once,
        drop_tip_location: TRASH.to_string(),
        disposal_volume: None,
        options: LiquidHandlingOptions::default(),
    };

    let result = distribute(&args, &ctx, &state, &mut keys());

    assert_eq!(
        command_types(&result),
        vec!["pickUpTip", "aspirate", "dispense", "aspirate", "dispense", "dropTip"]
    );
}

#[test]
fn test_consolidate_batches_by_tip_capacity() {
    let ctx = standard_context();
    let state = standard_state(&ctx);
    let args = ConsolidateArgs {
        pipette: PIPETTE.to_string(),
        source_labware: SOURCE.to_string(),
        source_wells: wells(&["A1", "B1", "C1", "D1", "E1", "F1", "G1", "H1"]),
        dest_labware: DEST.to_string(),
        dest_well: "A1".to_string(),
        volume: 100.0,
        change_tip: ChangeTipPolicy::Once,
        drop_tip_location: TRASH.to_string(),
        options: LiquidHandlingOptions::default(),
    };

    let result = consolidate(&args, &ctx, &state, &mut keys());

    let types = command_types(&result);
    assert_eq!(types.first(), Some(&"pickUpTip"));
    assert_eq!(types.last(), Some(&"dropTip"));
    assert_eq!(types.iter().filter(|t| **t == "aspirate").count(), 8);
    assert_eq!(types.iter().filter(|t| **t == "dispense").count(), 3);
    let next = result.robot_state().unwrap();
    assert!((next.well_volume(DEST, "A1") - 800.0).abs() < 1e-9);
}

#[test]
fn test_consolidate_volume_above_tip_fails() {
    let ctx = standard_context();
    let state = standard_state(&ctx);
    let args = ConsolidateArgs {
        pipette: PIPETTE.to_string(),
        source_labware: SOURCE.to_string(),
        source_wells: wells(&["A1", "B1"]),
        dest_labware: DEST.to_string(),
        dest_well: "A1".to_string(),
        volume: 400.0,
        change_tip: ChangeTipPolicy::Once,
        drop_tip_location: TRASH.to_string(),
        options: LiquidHandlingOptions::default(),
    };

    let result = consolidate(&args, &ctx, &state, &mut keys());

    assert_eq!(error_kinds(&result), vec![ErrorKind::TipVolumeExceeded]);
}

#[test]
fn test_mix_always_new_tip_per_well() {
    let ctx = standard_context();
    let state = standard_state(&ctx);
    let args = MixArgs {
        pipette: PIPETTE.to_string(),
        labware: SOURCE.to_string(),
        wells: wells(&["A1", "B1"]),
        volume: 50.0,
        times: 2,
        change_tip: ChangeTipPolicy::Always,
        drop_tip_location: TRASH.to_string(),
        options: LiquidHandlingOptions::default(),
    };

    let result = mix(&args, &ctx, &state, &mut keys());

    assert_eq!(
        command_types(&result),
        vec![
            "pickUpTip",
            "aspirate",
            "dispense",
            "aspirate",
            "dispense",
            "dropTip",
            "pickUpTip",
            "aspirate",
            "dispense",
            "aspirate",
            "dispense",
            "dropTip"
        ]
    );
    let next = result.robot_state().unwrap();
    assert!((next.well_volume(SOURCE, "A1") - 150.0).abs() < 1e-9);
}

// ========== Tips ==========

#[test]
fn test_replace_tip_with_empty_rack_fails() {
    let ctx = standard_context();
    let mut state = standard_state(&ctx);
    for present in state.tip_state.tipracks.get_mut(TIPRACK).unwrap().values_mut() {
        *present = false;
    }

    let result = replace_tip(
        &ReplaceTipArgs {
            pipette: PIPETTE.to_string(),
            drop_tip_location: TRASH.to_string(),
        },
        &ctx,
        &state,
        &mut keys(),
    );

    assert_eq!(error_kinds(&result), vec![ErrorKind::InsufficientTips]);
}

#[test]
fn test_replace_tip_takes_tips_in_rack_order() {
    let ctx = standard_context();
    let state = standard_state(&ctx);
    let args = ReplaceTipArgs {
        pipette: PIPETTE.to_string(),
        drop_tip_location: TRASH.to_string(),
    };
    let creators = vec![curry(replace_tip, args.clone()), curry(replace_tip, args)];

    let result = reduce_command_creators(creators, &ctx, &state, &mut keys());

    let picked: Vec<String> = result
        .commands()
        .iter()
        .filter_map(|c| match &c.params {
            CommandParams::PickUpTip(p) => Some(p.well_name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(picked, vec!["A1".to_string(), "B1".to_string()]);
    assert_eq!(
        command_types(&result),
        vec!["pickUpTip", "dropTip", "pickUpTip"]
    );
}

// ========== Modules ==========

#[test]
fn test_heater_shaker_closes_latch_before_shaking() {
    let ctx = standard_context();
    let state = standard_state(&ctx);
    let args = HeaterShakerArgs {
        module: HEATER_SHAKER.to_string(),
        target_temp: Some(37.0),
        target_speed: Some(500.0),
        latch_open: false,
        timer_seconds: None,
    };

    let result = heater_shaker(&args, &ctx, &state, &mut keys());

    assert_eq!(
        command_types(&result),
        vec![
            "heaterShaker/setTargetTemperature",
            "heaterShaker/closeLabwareLatch",
            "heaterShaker/setAndWaitForShakeSpeed"
        ]
    );
    let hs = result
        .robot_state()
        .unwrap()
        .module_state(HEATER_SHAKER)
        .and_then(ModuleState::as_heater_shaker)
        .cloned()
        .unwrap();
    assert!(hs.is_shaking());
    assert_eq!(hs.latch_open, Some(false));
}

#[test]
fn test_heater_shaker_timer_stops_everything() {
    let ctx = standard_context();
    let state = standard_state(&ctx);
    let args = HeaterShakerArgs {
        module: HEATER_SHAKER.to_string(),
        target_temp: Some(37.0),
        target_speed: Some(500.0),
        latch_open: false,
        timer_seconds: Some(60.0),
    };

    let result = heater_shaker(&args, &ctx, &state, &mut keys());

    let types = command_types(&result);
    assert_eq!(
        &types[3..],
        &[
            "waitForDuration",
            "heaterShaker/deactivateShaker",
            "heaterShaker/deactivateHeater"
        ]
    );
    let hs = result
        .robot_state()
        .unwrap()
        .module_state(HEATER_SHAKER)
        .and_then(ModuleState::as_heater_shaker)
        .cloned()
        .unwrap();
    assert!(!hs.is_shaking());
    assert_eq!(hs.target_temp, None);
}

#[test]
fn test_heater_shaker_stop_then_open_latch() {
    let ctx = standard_context();
    let state = standard_state(&ctx);
    let shaking = heater_shaker(
        &HeaterShakerArgs {
            module: HEATER_SHAKER.to_string(),
            target_temp: None,
            target_speed: Some(500.0),
            latch_open: false,
            timer_seconds: None,
        },
        &ctx,
        &state,
        &mut keys(),
    );
    let state = shaking.robot_state().unwrap().clone();

    let result = heater_shaker(
        &HeaterShakerArgs {
            module: HEATER_SHAKER.to_string(),
            target_temp: None,
            target_speed: None,
            latch_open: true,
            timer_seconds: None,
        },
        &ctx,
        &state,
        &mut keys(),
    );

    assert_eq!(
        command_types(&result),
        vec![
            "heaterShaker/deactivateShaker",
            "heaterShaker/openLabwareLatch"
        ]
    );
}

#[test]
fn test_temperature_step_on_wrong_module_type() {
    let ctx = standard_context();
    let state = standard_state(&ctx);

    let result = temperature(
        &TemperatureStepArgs {
            module: HEATER_SHAKER.to_string(),
            target: Some(4.0),
            wait: true,
        },
        &ctx,
        &state,
        &mut keys(),
    );

    assert_eq!(error_kinds(&result), vec![ErrorKind::ModuleTypeMismatch]);
}

#[test]
fn test_thermocycler_state_diff_order() {
    let ctx = InvariantContext::builder()
        .module(ModuleEntity {
            id: "tc".to_string(),
            module_type: ModuleType::Thermocycler,
            model: ModuleModel::ThermocyclerModuleV1,
        })
        .build()
        .unwrap();
    let mut setup = InitialDeckSetup::default();
    setup.modules.insert("tc".to_string(), "7".to_string());
    let state = RobotState::initial(&ctx, &setup).unwrap();
    let args = ThermocyclerStateArgs {
        module: "tc".to_string(),
        block_target: Some(95.0),
        lid_target: Some(105.0),
        lid_open: false,
    };

    let result = thermocycler_state(&args, &ctx, &state, &mut keys());

    assert_eq!(
        command_types(&result),
        vec![
            "thermocycler/closeLid",
            "thermocycler/setTargetBlockTemperature",
            "thermocycler/setTargetLidTemperature"
        ]
    );

    // Already in the requested state: nothing to do
    let next = result.robot_state().unwrap().clone();
    let again = thermocycler_state(&args, &ctx, &next, &mut keys());
    assert!(again.is_success());
    assert!(again.commands().is_empty());
}

// ========== Labware movement ==========

#[test]
fn test_move_labware_onto_heater_shaker_opens_and_closes_latch() {
    let ctx = standard_context();
    let state = standard_state(&ctx);
    let args = MoveLabwareStepArgs {
        labware: DEST.to_string(),
        new_location: LabwareLocation::Module(HEATER_SHAKER.to_string()),
        use_gripper: false,
    };

    let result = move_labware_step(&args, &ctx, &state, &mut keys());

    assert_eq!(
        command_types(&result),
        vec![
            "heaterShaker/openLabwareLatch",
            "moveLabware",
            "heaterShaker/closeLabwareLatch"
        ]
    );
    assert_eq!(
        result.robot_state().unwrap().labware_location(DEST),
        Some(&LabwareLocation::Module(HEATER_SHAKER.to_string()))
    );
}

#[test]
fn test_move_labware_into_occupied_slot_fails() {
    let ctx = standard_context();
    let state = standard_state(&ctx);
    let args = MoveLabwareStepArgs {
        labware: DEST.to_string(),
        new_location: LabwareLocation::Slot("1".to_string()),
        use_gripper: false,
    };

    let result = move_labware_step(&args, &ctx, &state, &mut keys());

    assert_eq!(error_kinds(&result), vec![ErrorKind::LabwareSlotOccupied]);
}

#[test]
fn test_move_labware_with_gripper_requires_gripper() {
    let ctx = standard_context();
    let state = standard_state(&ctx);
    let args = MoveLabwareStepArgs {
        labware: DEST.to_string(),
        new_location: LabwareLocation::Slot("5".to_string()),
        use_gripper: true,
    };

    let result = move_labware_step(&args, &ctx, &state, &mut keys());

    assert_eq!(error_kinds(&result), vec![ErrorKind::GripperRequired]);
}
