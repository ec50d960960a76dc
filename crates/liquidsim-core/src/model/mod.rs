pub mod equipment;
pub mod labware;
pub mod module;
pub mod pipette;

pub use equipment::{AdditionalEquipmentEntity, EquipmentKind};
pub use labware::{LabwareDefinition, LabwareEntity, WellDefinition};
pub use module::{
    HeaterShakerModuleState, MagneticModuleState, ModuleEntity, ModuleModel, ModuleState,
    ModuleType, TemperatureModuleState, TemperatureStatus, ThermocyclerModuleState,
};
pub use pipette::{DisplayCategory, Mount, PipetteClass, PipetteEntity, PipetteSpec};
