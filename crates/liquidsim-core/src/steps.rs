//! Protocol steps
//!
//! A step is one user-level action in a protocol. Each [`StepArgs`] variant
//! maps to exactly one compound creator.

use serde::{Deserialize, Serialize};

use crate::command_creators::compound::{
    consolidate, distribute, heater_shaker, magnet, mix, move_labware_step, pause, temperature,
    thermocycler_state, transfer, ConsolidateArgs, DistributeArgs, HeaterShakerArgs, MagnetArgs,
    MixArgs, MoveLabwareStepArgs, PauseArgs, TemperatureStepArgs, ThermocyclerStateArgs,
    TransferArgs,
};
use crate::command_creators::{curry, CurriedCommandCreator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stepType", content = "args", rename_all = "camelCase")]
pub enum StepArgs {
    Transfer(TransferArgs),
    Consolidate(ConsolidateArgs),
    Distribute(DistributeArgs),
    Mix(MixArgs),
    Magnet(MagnetArgs),
    Temperature(TemperatureStepArgs),
    Thermocycler(ThermocyclerStateArgs),
    HeaterShaker(HeaterShakerArgs),
    MoveLabware(MoveLabwareStepArgs),
    Pause(PauseArgs),
}

impl StepArgs {
    pub fn step_type(&self) -> &'static str {
        match self {
            StepArgs::Transfer(_) => "transfer",
            StepArgs::Consolidate(_) => "consolidate",
            StepArgs::Distribute(_) => "distribute",
            StepArgs::Mix(_) => "mix",
            StepArgs::Magnet(_) => "magnet",
            StepArgs::Temperature(_) => "temperature",
            StepArgs::Thermocycler(_) => "thermocycler",
            StepArgs::HeaterShaker(_) => "heaterShaker",
            StepArgs::MoveLabware(_) => "moveLabware",
            StepArgs::Pause(_) => "pause",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    #[serde(flatten)]
    pub args: StepArgs,
}

impl Step {
    pub fn new(id: impl Into<String>, args: StepArgs) -> Self {
        Self {
            id: id.into(),
            args,
        }
    }
}

/// Creator that runs a step
pub fn command_creator_for_step(args: &StepArgs) -> CurriedCommandCreator<'static> {
    match args.clone() {
        StepArgs::Transfer(a) => curry(transfer, a),
        StepArgs::Consolidate(a) => curry(consolidate, a),
        StepArgs::Distribute(a) => curry(distribute, a),
        StepArgs::Mix(a) => curry(mix, a),
        StepArgs::Magnet(a) => curry(magnet, a),
        StepArgs::Temperature(a) => curry(temperature, a),
        StepArgs::Thermocycler(a) => curry(thermocycler_state, a),
        StepArgs::HeaterShaker(a) => curry(heater_shaker, a),
        StepArgs::MoveLabware(a) => curry(move_labware_step, a),
        StepArgs::Pause(a) => curry(pause, a),
    }
}
