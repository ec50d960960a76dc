//! Hardware-facing command types
//!
//! A [`Command`] is the unit handed to the execution layer. It serialises as
//! `{"commandType": ..., "key": ..., "params": {...}}`, with an optional
//! `meta` object. Commands are immutable once emitted.

use serde::{Deserialize, Serialize};

use crate::robot_state::LabwareLocation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub key: String,
    #[serde(flatten)]
    pub params: CommandParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<CommandMeta>,
}

impl Command {
    pub fn new(key: String, params: CommandParams) -> Self {
        Self {
            key,
            params,
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: CommandMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn command_type(&self) -> &'static str {
        self.params.command_type()
    }

    pub fn is_air_gap(&self) -> bool {
        self.meta.as_ref().is_some_and(|m| m.is_air_gap)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandMeta {
    pub is_air_gap: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WellOrigin {
    Bottom,
    Top,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WellOffset {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WellLocation {
    pub origin: WellOrigin,
    pub offset: WellOffset,
}

impl WellLocation {
    /// `z` millimetres above the well bottom
    pub fn from_bottom(z: f64) -> Self {
        Self {
            origin: WellOrigin::Bottom,
            offset: WellOffset { x: 0.0, y: 0.0, z },
        }
    }

    /// `z` millimetres relative to the well top (negative is inside the well)
    pub fn from_top(z: f64) -> Self {
        Self {
            origin: WellOrigin::Top,
            offset: WellOffset { x: 0.0, y: 0.0, z },
        }
    }
}

/// Shared by aspirate and dispense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidHandlingParams {
    pub pipette_id: String,
    pub volume: f64,
    pub labware_id: String,
    pub well_name: String,
    pub well_location: WellLocation,
    pub flow_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlowoutParams {
    pub pipette_id: String,
    pub labware_id: String,
    pub well_name: String,
    pub well_location: WellLocation,
    pub flow_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellTargetParams {
    pub pipette_id: String,
    pub labware_id: String,
    pub well_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub well_location: Option<WellLocation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRelativeParams {
    pub pipette_id: String,
    pub axis: Axis,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabwareMovementStrategy {
    UsingGripper,
    ManualMoveWithPause,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveLabwareParams {
    pub labware_id: String,
    pub new_location: LabwareLocation,
    pub strategy: LabwareMovementStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitForDurationParams {
    pub seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleParams {
    pub module_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngageMagnetParams {
    pub module_id: String,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureParams {
    pub module_id: String,
    pub celsius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShakeSpeedParams {
    pub module_id: String,
    pub rpm: f64,
}

/// Command type tag plus its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "commandType", content = "params")]
pub enum CommandParams {
    #[serde(rename = "aspirate")]
    Aspirate(LiquidHandlingParams),
    #[serde(rename = "dispense")]
    Dispense(LiquidHandlingParams),
    #[serde(rename = "blowout")]
    Blowout(BlowoutParams),
    #[serde(rename = "touchTip")]
    TouchTip(WellTargetParams),
    #[serde(rename = "pickUpTip")]
    PickUpTip(WellTargetParams),
    #[serde(rename = "dropTip")]
    DropTip(WellTargetParams),
    #[serde(rename = "moveToWell")]
    MoveToWell(WellTargetParams),
    #[serde(rename = "moveRelative")]
    MoveRelative(MoveRelativeParams),
    #[serde(rename = "moveLabware")]
    MoveLabware(MoveLabwareParams),
    #[serde(rename = "waitForDuration")]
    WaitForDuration(WaitForDurationParams),
    #[serde(rename = "magneticModule/engage")]
    EngageMagnet(EngageMagnetParams),
    #[serde(rename = "magneticModule/disengage")]
    DisengageMagnet(ModuleParams),
    #[serde(rename = "temperatureModule/setTargetTemperature")]
    SetTemperature(TemperatureParams),
    #[serde(rename = "temperatureModule/waitForTemperature")]
    AwaitTemperature(TemperatureParams),
    #[serde(rename = "temperatureModule/deactivate")]
    DeactivateTemperature(ModuleParams),
    #[serde(rename = "thermocycler/openLid")]
    ThermocyclerOpenLid(ModuleParams),
    #[serde(rename = "thermocycler/closeLid")]
    ThermocyclerCloseLid(ModuleParams),
    #[serde(rename = "thermocycler/setTargetBlockTemperature")]
    ThermocyclerSetBlockTemperature(TemperatureParams),
    #[serde(rename = "thermocycler/setTargetLidTemperature")]
    ThermocyclerSetLidTemperature(TemperatureParams),
    #[serde(rename = "thermocycler/deactivateBlock")]
    ThermocyclerDeactivateBlock(ModuleParams),
    #[serde(rename = "thermocycler/deactivateLid")]
    ThermocyclerDeactivateLid(ModuleParams),
    #[serde(rename = "heaterShaker/setTargetTemperature")]
    HeaterShakerSetTemperature(TemperatureParams),
    #[serde(rename = "heaterShaker/deactivateHeater")]
    HeaterShakerDeactivateHeater(ModuleParams),
    #[serde(rename = "heaterShaker/setAndWaitForShakeSpeed")]
    HeaterShakerSetShakeSpeed(ShakeSpeedParams),
    #[serde(rename = "heaterShaker/deactivateShaker")]
    HeaterShakerStopShake(ModuleParams),
    #[serde(rename = "heaterShaker/openLabwareLatch")]
    HeaterShakerOpenLatch(ModuleParams),
    #[serde(rename = "heaterShaker/closeLabwareLatch")]
    HeaterShakerCloseLatch(ModuleParams),
}

impl CommandParams {
    pub fn command_type(&self) -> &'static str {
        match self {
            CommandParams::Aspirate(_) => "aspirate",
            CommandParams::Dispense(_) => "dispense",
            CommandParams::Blowout(_) => "blowout",
            CommandParams::TouchTip(_) => "touchTip",
            CommandParams::PickUpTip(_) => "pickUpTip",
            CommandParams::DropTip(_) => "dropTip",
            CommandParams::MoveToWell(_) => "moveToWell",
            CommandParams::MoveRelative(_) => "moveRelative",
            CommandParams::MoveLabware(_) => "moveLabware",
            CommandParams::WaitForDuration(_) => "waitForDuration",
            CommandParams::EngageMagnet(_) => "magneticModule/engage",
            CommandParams::DisengageMagnet(_) => "magneticModule/disengage",
            CommandParams::SetTemperature(_) => "temperatureModule/setTargetTemperature",
            CommandParams::AwaitTemperature(_) => "temperatureModule/waitForTemperature",
            CommandParams::DeactivateTemperature(_) => "temperatureModule/deactivate",
            CommandParams::ThermocyclerOpenLid(_) => "thermocycler/openLid",
            CommandParams::ThermocyclerCloseLid(_) => "thermocycler/closeLid",
            CommandParams::ThermocyclerSetBlockTemperature(_) => {
                "thermocycler/setTargetBlockTemperature"
            }
            CommandParams::ThermocyclerSetLidTemperature(_) => {
                "thermocycler/setTargetLidTemperature"
            }
            CommandParams::ThermocyclerDeactivateBlock(_) => "thermocycler/deactivateBlock",
            CommandParams::ThermocyclerDeactivateLid(_) => "thermocycler/deactivateLid",
            CommandParams::HeaterShakerSetTemperature(_) => "heaterShaker/setTargetTemperature",
            CommandParams::HeaterShakerDeactivateHeater(_) => "heaterShaker/deactivateHeater",
            CommandParams::HeaterShakerSetShakeSpeed(_) => "heaterShaker/setAndWaitForShakeSpeed",
            CommandParams::HeaterShakerStopShake(_) => "heaterShaker/deactivateShaker",
            CommandParams::HeaterShakerOpenLatch(_) => "heaterShaker/openLabwareLatch",
            CommandParams::HeaterShakerCloseLatch(_) => "heaterShaker/closeLabwareLatch",
        }
    }
}
