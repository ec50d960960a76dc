//! Robot state after a single command
//!
//! `apply_command` is the only place that knows how each command type moves
//! tips, liquid, labware and module state. Creators validate first; by the
//! time a command reaches this function it is assumed legal.

use std::collections::BTreeMap;

use super::{update, RobotState};
use crate::commands::{Command, CommandParams};
use crate::context::InvariantContext;
use crate::errors::CommandCreatorWarning;
use crate::model::TemperatureStatus;

/// A new state plus any warnings raised while producing it
#[derive(Debug, Clone, PartialEq)]
pub struct StateUpdate {
    pub robot_state: RobotState,
    pub warnings: Vec<CommandCreatorWarning>,
}

/// Wells reached by every channel of `pipette` aimed at `well`
///
/// When the geometry cannot place a multi-channel pipette's channels, the
/// named well alone is used and a warning is returned with it.
pub(crate) fn channel_wells(
    ctx: &InvariantContext,
    pipette: &str,
    labware: &str,
    well: &str,
) -> (Vec<String>, Option<CommandCreatorWarning>) {
    let channels = ctx.pipette(pipette).map(|p| p.spec.channels).unwrap_or(1);
    match ctx
        .labware(labware)
        .and_then(|l| l.definition.wells_for_tips(well, channels))
    {
        Some(wells) => (wells, None),
        None if channels > 1 => (
            vec![well.to_string()],
            Some(CommandCreatorWarning::channels_outside_labware(labware, well)),
        ),
        None => (vec![well.to_string()], None),
    }
}

/// Number of channels that land in each distinct well
fn channels_per_well(wells: &[String]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for well in wells {
        *counts.entry(well.as_str()).or_insert(0) += 1;
    }
    counts
}

fn aspirate_warnings(
    state: &RobotState,
    labware: &str,
    wells: &[String],
    volume: f64,
) -> Vec<CommandCreatorWarning> {
    let mut warnings = Vec::new();
    for (well, channels) in channels_per_well(wells) {
        let present = state.well_volume(labware, well);
        if present <= 0.0 {
            warnings.push(CommandCreatorWarning::aspirate_from_pristine_well(labware, well));
        } else if volume * channels as f64 > present {
            warnings.push(CommandCreatorWarning::aspirate_more_than_well_contents(
                labware, well,
            ));
        }
    }
    warnings
}

fn over_max_warnings(
    ctx: &InvariantContext,
    state: &RobotState,
    labware: &str,
    wells: &[String],
) -> Vec<CommandCreatorWarning> {
    let Some(definition) = ctx.labware(labware).map(|l| &l.definition) else {
        return Vec::new();
    };
    channels_per_well(wells)
        .into_keys()
        .filter(|well| {
            definition
                .well(well)
                .is_some_and(|w| state.well_volume(labware, well) > w.total_liquid_volume)
        })
        .map(|well| CommandCreatorWarning::over_max_well_volume(labware, well))
        .collect()
}

/// Compute the state after `command`
pub fn apply_command(state: RobotState, command: &Command, ctx: &InvariantContext) -> StateUpdate {
    let mut next = state;
    let mut warnings = Vec::new();

    match &command.params {
        CommandParams::Aspirate(p) => {
            if !command.is_air_gap() {
                let (wells, misplaced) =
                    channel_wells(ctx, &p.pipette_id, &p.labware_id, &p.well_name);
                warnings.extend(misplaced);
                warnings.extend(aspirate_warnings(&next, &p.labware_id, &wells, p.volume));
                update::aspirate_liquid(&mut next, &p.pipette_id, &p.labware_id, &wells, p.volume);
            }
        }
        CommandParams::Dispense(p) => {
            let (wells, misplaced) = channel_wells(ctx, &p.pipette_id, &p.labware_id, &p.well_name);
            warnings.extend(misplaced);
            update::dispense_liquid(
                &mut next,
                &p.pipette_id,
                &p.labware_id,
                &wells,
                Some(p.volume),
            );
            warnings.extend(over_max_warnings(ctx, &next, &p.labware_id, &wells));
        }
        CommandParams::Blowout(p) => {
            let (wells, misplaced) = channel_wells(ctx, &p.pipette_id, &p.labware_id, &p.well_name);
            warnings.extend(misplaced);
            update::dispense_liquid(&mut next, &p.pipette_id, &p.labware_id, &wells, None);
        }
        CommandParams::PickUpTip(p) => {
            let (wells, misplaced) = channel_wells(ctx, &p.pipette_id, &p.labware_id, &p.well_name);
            warnings.extend(misplaced);
            update::consume_tips(&mut next, &p.labware_id, &wells);
            update::set_pipette_tip(&mut next, &p.pipette_id, true);
        }
        CommandParams::DropTip(p) => {
            update::set_pipette_tip(&mut next, &p.pipette_id, false);
            update::discard_pipette_liquid(&mut next, &p.pipette_id);
        }
        CommandParams::MoveLabware(p) => {
            update::set_labware_location(&mut next, &p.labware_id, p.new_location.clone());
        }
        CommandParams::EngageMagnet(p) => update::set_magnet_engaged(&mut next, &p.module_id, true),
        CommandParams::DisengageMagnet(p) => {
            update::set_magnet_engaged(&mut next, &p.module_id, false)
        }
        CommandParams::SetTemperature(p) => update::set_temperature_target(
            &mut next,
            &p.module_id,
            TemperatureStatus::ApproachingTarget,
            Some(p.celsius),
        ),
        CommandParams::AwaitTemperature(p) => update::set_temperature_target(
            &mut next,
            &p.module_id,
            TemperatureStatus::AtTarget,
            Some(p.celsius),
        ),
        CommandParams::DeactivateTemperature(p) => update::set_temperature_target(
            &mut next,
            &p.module_id,
            TemperatureStatus::Deactivated,
            None,
        ),
        CommandParams::ThermocyclerOpenLid(p) => {
            update::set_thermocycler_lid(&mut next, &p.module_id, true)
        }
        CommandParams::ThermocyclerCloseLid(p) => {
            update::set_thermocycler_lid(&mut next, &p.module_id, false)
        }
        CommandParams::ThermocyclerSetBlockTemperature(p) => {
            update::set_thermocycler_block_target(&mut next, &p.module_id, Some(p.celsius))
        }
        CommandParams::ThermocyclerSetLidTemperature(p) => {
            update::set_thermocycler_lid_target(&mut next, &p.module_id, Some(p.celsius))
        }
        CommandParams::ThermocyclerDeactivateBlock(p) => {
            update::set_thermocycler_block_target(&mut next, &p.module_id, None)
        }
        CommandParams::ThermocyclerDeactivateLid(p) => {
            update::set_thermocycler_lid_target(&mut next, &p.module_id, None)
        }
        CommandParams::HeaterShakerSetTemperature(p) => {
            update::set_heater_shaker_temperature(&mut next, &p.module_id, Some(p.celsius))
        }
        CommandParams::HeaterShakerDeactivateHeater(p) => {
            update::set_heater_shaker_temperature(&mut next, &p.module_id, None)
        }
        CommandParams::HeaterShakerSetShakeSpeed(p) => {
            update::set_heater_shaker_speed(&mut next, &p.module_id, Some(p.rpm))
        }
        CommandParams::HeaterShakerStopShake(p) => {
            update::set_heater_shaker_speed(&mut next, &p.module_id, None)
        }
        CommandParams::HeaterShakerOpenLatch(p) => {
            update::set_heater_shaker_latch(&mut next, &p.module_id, true)
        }
        CommandParams::HeaterShakerCloseLatch(p) => {
            update::set_heater_shaker_latch(&mut next, &p.module_id, false)
        }
        CommandParams::TouchTip(_)
        | CommandParams::MoveToWell(_)
        | CommandParams::MoveRelative(_)
        | CommandParams::WaitForDuration(_) => {}
    }

    StateUpdate {
        robot_state: next,
        warnings,
    }
}

/// Fold [`apply_command`] over a command list
pub fn apply_commands(
    state: RobotState,
    commands: &[Command],
    ctx: &InvariantContext,
) -> StateUpdate {
    commands.iter().fold(
        StateUpdate {
            robot_state: state,
            warnings: Vec::new(),
        },
        |mut acc, command| {
            let step = apply_command(acc.robot_state, command, ctx);
            acc.warnings.extend(step.warnings);
            StateUpdate {
                robot_state: step.robot_state,
                warnings: acc.warnings,
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{LiquidHandlingParams, ModuleParams, WellLocation};
    use crate::errors::WarningKind;
    use crate::robot_state::update::load_liquid;

    fn aspirate(volume: f64) -> Command {
        Command::new(
            "k".to_string(),
            CommandParams::Aspirate(LiquidHandlingParams {
                pipette_id: "p".to_string(),
                volume,
                labware_id: "plate".to_string(),
                well_name: "A1".to_string(),
                well_location: WellLocation::from_bottom(1.0),
                flow_rate: 10.0,
            }),
        )
    }

    #[test]
    fn test_aspirate_from_empty_well_warns() {
        let ctx = InvariantContext::default();
        let update = apply_command(RobotState::default(), &aspirate(10.0), &ctx);
        assert_eq!(update.warnings.len(), 1);
        assert_eq!(update.warnings[0].kind, WarningKind::AspirateFromPristineWell);
    }

    #[test]
    fn test_aspirate_more_than_contents_warns() {
        let ctx = InvariantContext::default();
        let mut state = RobotState::default();
        load_liquid(&mut state, "plate", "A1", "water", 5.0);
        let update = apply_command(state, &aspirate(10.0), &ctx);
        assert_eq!(update.warnings[0].kind, WarningKind::AspirateMoreThanWellContents);
    }

    #[test]
    fn test_air_gap_moves_no_liquid() {
        let ctx = InvariantContext::default();
        let mut state = RobotState::default();
        load_liquid(&mut state, "plate", "A1", "water", 50.0);
        let cmd = aspirate(10.0).with_meta(crate::commands::CommandMeta { is_air_gap: true });
        let update = apply_command(state.clone(), &cmd, &ctx);
        assert_eq!(update.robot_state, state);
        assert!(update.warnings.is_empty());
    }

    #[test]
    fn test_unknown_module_command_is_noop() {
        let ctx = InvariantContext::default();
        let cmd = Command::new(
            "k".to_string(),
            CommandParams::HeaterShakerCloseLatch(ModuleParams {
                module_id: "hs".to_string(),
            }),
        );
        let update = apply_command(RobotState::default(), &cmd, &ctx);
        assert_eq!(update.robot_state, RobotState::default());
    }
}
