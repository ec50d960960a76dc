use serde::{Deserialize, Serialize};

use super::labware::LabwareDefinition;

/// Hardware generation a pipette model belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DisplayCategory {
    Gen1,
    Gen2,
    Gen3,
}

/// Collision-rule class of a pipette
///
/// Flex-class pipettes (GEN3 hardware, or any 96-channel) are exempt from
/// the heater-shaker adjacency rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipetteClass {
    Standard,
    Flex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mount {
    Left,
    Right,
}

/// Mount-independent pipette model specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipetteSpec {
    pub name: String,
    pub channels: u32,
    pub max_volume: f64,
    pub min_volume: f64,
    pub display_category: DisplayCategory,
    pub default_aspirate_flow_rate: f64,
    pub default_dispense_flow_rate: f64,
    pub default_blowout_flow_rate: f64,
}

impl PipetteSpec {
    pub fn is_multi_channel(&self) -> bool {
        self.channels > 1
    }

    pub fn pipette_class(&self) -> PipetteClass {
        if self.display_category == DisplayCategory::Gen3 || self.channels == 96 {
            PipetteClass::Flex
        } else {
            PipetteClass::Standard
        }
    }
}

/// A pipette registered in the invariant context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipetteEntity {
    pub id: String,
    pub name: String,
    pub spec: PipetteSpec,
    pub tiprack_def_uri: String,
    pub tiprack_definition: LabwareDefinition,
}

impl PipetteEntity {
    /// Largest volume the pipette can hold with its assigned tip type fitted
    ///
    /// Never larger than the pipette's own rating, so a volume above the
    /// pipette max always exceeds the tip max too.
    pub fn tip_max_volume(&self) -> f64 {
        match self.tiprack_definition.tip_volume {
            Some(tip_volume) => tip_volume.min(self.spec.max_volume),
            None => self.spec.max_volume,
        }
    }
}
