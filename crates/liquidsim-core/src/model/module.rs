use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleType {
    #[serde(rename = "magneticModuleType")]
    MagneticModule,
    #[serde(rename = "temperatureModuleType")]
    TemperatureModule,
    #[serde(rename = "thermocyclerModuleType")]
    Thermocycler,
    #[serde(rename = "heaterShakerModuleType")]
    HeaterShaker,
    #[serde(rename = "magneticBlockType")]
    MagneticBlock,
}

impl ModuleType {
    pub fn display_name(&self) -> &'static str {
        match self {
            ModuleType::MagneticModule => "magnetic module",
            ModuleType::TemperatureModule => "temperature module",
            ModuleType::Thermocycler => "thermocycler",
            ModuleType::HeaterShaker => "heater-shaker",
            ModuleType::MagneticBlock => "magnetic block",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleModel {
    MagneticModuleV1,
    MagneticModuleV2,
    TemperatureModuleV1,
    TemperatureModuleV2,
    ThermocyclerModuleV1,
    ThermocyclerModuleV2,
    HeaterShakerModuleV1,
    MagneticBlockV1,
}

impl ModuleModel {
    pub fn module_type(&self) -> ModuleType {
        match self {
            ModuleModel::MagneticModuleV1 | ModuleModel::MagneticModuleV2 => {
                ModuleType::MagneticModule
            }
            ModuleModel::TemperatureModuleV1 | ModuleModel::TemperatureModuleV2 => {
                ModuleType::TemperatureModule
            }
            ModuleModel::ThermocyclerModuleV1 | ModuleModel::ThermocyclerModuleV2 => {
                ModuleType::Thermocycler
            }
            ModuleModel::HeaterShakerModuleV1 => ModuleType::HeaterShaker,
            ModuleModel::MagneticBlockV1 => ModuleType::MagneticBlock,
        }
    }

    /// GEN1 magnetic and temperature modules are tall enough to collide
    /// with GEN1 multi-channel pipettes reaching into neighbouring slots.
    pub fn has_gen1_collision_risk(&self) -> bool {
        matches!(
            self,
            ModuleModel::MagneticModuleV1 | ModuleModel::TemperatureModuleV1
        )
    }
}

/// A module registered in the invariant context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleEntity {
    pub id: String,
    #[serde(rename = "type")]
    pub module_type: ModuleType,
    pub model: ModuleModel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemperatureStatus {
    Deactivated,
    ApproachingTarget,
    AtTarget,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagneticModuleState {
    pub engaged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureModuleState {
    pub status: TemperatureStatus,
    pub target_temperature: Option<f64>,
}

/// `lid_open` is `None` until a lid command has run; an unknown lid is
/// treated as closed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermocyclerModuleState {
    pub block_target_temp: Option<f64>,
    pub lid_target_temp: Option<f64>,
    pub lid_open: Option<bool>,
}

/// `target_speed` is `Some` while shaking. `latch_open` is `None` until a
/// latch command has run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaterShakerModuleState {
    pub target_temp: Option<f64>,
    pub target_speed: Option<f64>,
    pub latch_open: Option<bool>,
}

impl HeaterShakerModuleState {
    pub fn is_shaking(&self) -> bool {
        self.target_speed.is_some()
    }
}

/// Per-type module state tracked in the robot state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ModuleState {
    Magnetic(MagneticModuleState),
    Temperature(TemperatureModuleState),
    Thermocycler(ThermocyclerModuleState),
    HeaterShaker(HeaterShakerModuleState),
    MagneticBlock,
}

impl ModuleState {
    /// State of a freshly loaded, idle module
    pub fn initial(module_type: ModuleType) -> Self {
        match module_type {
            ModuleType::MagneticModule => ModuleState::Magnetic(MagneticModuleState::default()),
            ModuleType::TemperatureModule => ModuleState::Temperature(TemperatureModuleState {
                status: TemperatureStatus::Deactivated,
                target_temperature: None,
            }),
            ModuleType::Thermocycler => {
                ModuleState::Thermocycler(ThermocyclerModuleState::default())
            }
            ModuleType::HeaterShaker => {
                ModuleState::HeaterShaker(HeaterShakerModuleState::default())
            }
            ModuleType::MagneticBlock => ModuleState::MagneticBlock,
        }
    }

    pub fn module_type(&self) -> ModuleType {
        match self {
            ModuleState::Magnetic(_) => ModuleType::MagneticModule,
            ModuleState::Temperature(_) => ModuleType::TemperatureModule,
            ModuleState::Thermocycler(_) => ModuleType::Thermocycler,
            ModuleState::HeaterShaker(_) => ModuleType::HeaterShaker,
            ModuleState::MagneticBlock => ModuleType::MagneticBlock,
        }
    }

    pub fn as_heater_shaker(&self) -> Option<&HeaterShakerModuleState> {
        match self {
            ModuleState::HeaterShaker(hs) => Some(hs),
            _ => None,
        }
    }

    pub fn as_thermocycler(&self) -> Option<&ThermocyclerModuleState> {
        match self {
            ModuleState::Thermocycler(tc) => Some(tc),
            _ => None,
        }
    }
}
