use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EquipmentKind {
    Gripper,
    TrashBin,
    WasteChute,
}

impl EquipmentKind {
    /// Whether used tips can be dropped into this equipment
    pub fn accepts_tips(&self) -> bool {
        matches!(self, EquipmentKind::TrashBin | EquipmentKind::WasteChute)
    }
}

/// Ancillary hardware that is neither a pipette, labware nor module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalEquipmentEntity {
    pub id: String,
    #[serde(rename = "name")]
    pub kind: EquipmentKind,
    #[serde(default)]
    pub location: Option<String>,
}
