//! Invariant context: the protocol-wide entity registry
//!
//! Built once when a protocol is loaded and shared read-only by every
//! command creator for the whole simulation run. Entity maps are ordered so
//! that any iteration over them is deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{LiquidSimError, Result};
use crate::model::{
    AdditionalEquipmentEntity, EquipmentKind, LabwareEntity, ModuleEntity, PipetteEntity,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvariantContext {
    pub pipette_entities: BTreeMap<String, PipetteEntity>,
    pub labware_entities: BTreeMap<String, LabwareEntity>,
    pub module_entities: BTreeMap<String, ModuleEntity>,
    pub additional_equipment_entities: BTreeMap<String, AdditionalEquipmentEntity>,
}

impl InvariantContext {
    pub fn builder() -> InvariantContextBuilder {
        InvariantContextBuilder::default()
    }

    pub fn pipette(&self, id: &str) -> Option<&PipetteEntity> {
        self.pipette_entities.get(id)
    }

    pub fn labware(&self, id: &str) -> Option<&LabwareEntity> {
        self.labware_entities.get(id)
    }

    pub fn module(&self, id: &str) -> Option<&ModuleEntity> {
        self.module_entities.get(id)
    }

    pub fn equipment(&self, id: &str) -> Option<&AdditionalEquipmentEntity> {
        self.additional_equipment_entities.get(id)
    }

    pub fn has_gripper(&self) -> bool {
        self.additional_equipment_entities
            .values()
            .any(|e| e.kind == EquipmentKind::Gripper)
    }

    /// Parse a context from its JSON representation and validate it
    ///
    /// # Errors
    ///
    /// Returns `Serialization` for malformed JSON, or any error
    /// [`InvariantContextBuilder::build`] would return.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let parsed: InvariantContext = serde_json::from_str(json)?;
        let mut builder = InvariantContext::builder();
        for (id, pipette) in parsed.pipette_entities {
            builder = builder.keyed_pipette(id, pipette);
        }
        for (id, labware) in parsed.labware_entities {
            builder = builder.keyed_labware(id, labware);
        }
        for (id, module) in parsed.module_entities {
            builder = builder.keyed_module(id, module);
        }
        for (id, equipment) in parsed.additional_equipment_entities {
            builder = builder.keyed_equipment(id, equipment);
        }
        builder.build()
    }
}

/// Accumulates entities and checks them as a whole on `build`
#[derive(Debug, Default)]
pub struct InvariantContextBuilder {
    context: InvariantContext,
    problems: Vec<LiquidSimError>,
}

impl InvariantContextBuilder {
    pub fn pipette(self, pipette: PipetteEntity) -> Self {
        let id = pipette.id.clone();
        self.keyed_pipette(id, pipette)
    }

    pub fn labware(self, labware: LabwareEntity) -> Self {
        let id = labware.id.clone();
        self.keyed_labware(id, labware)
    }

    pub fn module(self, module: ModuleEntity) -> Self {
        let id = module.id.clone();
        self.keyed_module(id, module)
    }

    pub fn equipment(self, equipment: AdditionalEquipmentEntity) -> Self {
        let id = equipment.id.clone();
        self.keyed_equipment(id, equipment)
    }

    fn keyed_pipette(mut self, id: String, pipette: PipetteEntity) -> Self {
        if pipette.id != id {
            self.problems.push(mismatched_key("pipette", &id, &pipette.id));
        }
        if !pipette.tiprack_definition.is_tiprack {
            self.problems.push(LiquidSimError::InvalidEntity {
                entity_kind: "pipette".to_string(),
                id: id.clone(),
                reason: format!(
                    "assigned tip rack {} is not a tip rack definition",
                    pipette.tiprack_def_uri
                ),
            });
        }
        if self.context.pipette_entities.contains_key(&id) {
            self.problems.push(duplicate("pipette", &id));
        } else {
            self.context.pipette_entities.insert(id, pipette);
        }
        self
    }

    fn keyed_labware(mut self, id: String, labware: LabwareEntity) -> Self {
        if labware.id != id {
            self.problems.push(mismatched_key("labware", &id, &labware.id));
        }
        if self.context.labware_entities.contains_key(&id) {
            self.problems.push(duplicate("labware", &id));
        } else {
            self.context.labware_entities.insert(id, labware);
        }
        self
    }

    fn keyed_module(mut self, id: String, module: ModuleEntity) -> Self {
        if module.id != id {
            self.problems.push(mismatched_key("module", &id, &module.id));
        }
        if module.model.module_type() != module.module_type {
            self.problems.push(LiquidSimError::InvalidEntity {
                entity_kind: "module".to_string(),
                id: id.clone(),
                reason: format!(
                    "model {:?} is not a {}",
                    module.model,
                    module.module_type.display_name()
                ),
            });
        }
        if self.context.module_entities.contains_key(&id) {
            self.problems.push(duplicate("module", &id));
        } else {
            self.context.module_entities.insert(id, module);
        }
        self
    }

    fn keyed_equipment(mut self, id: String, equipment: AdditionalEquipmentEntity) -> Self {
        if equipment.id != id {
            self.problems
                .push(mismatched_key("additional equipment", &id, &equipment.id));
        }
        if self.context.additional_equipment_entities.contains_key(&id) {
            self.problems.push(duplicate("additional equipment", &id));
        } else {
            self.context.additional_equipment_entities.insert(id, equipment);
        }
        self
    }

    /// Finish building
    ///
    /// # Errors
    ///
    /// Returns the first problem recorded while adding entities:
    /// `DuplicateEntity` when an id is registered twice, `InvalidEntity`
    /// when a pipette's tip rack is not a tip rack, a module's model does not
    /// match its type, or a map key disagrees with the entity's own id.
    pub fn build(self) -> Result<InvariantContext> {
        match self.problems.into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(self.context),
        }
    }
}

fn duplicate(kind: &str, id: &str) -> LiquidSimError {
    LiquidSimError::DuplicateEntity {
        entity_kind: kind.to_string(),
        id: id.to_string(),
    }
}

fn mismatched_key(kind: &str, key: &str, id: &str) -> LiquidSimError {
    LiquidSimError::InvalidEntity {
        entity_kind: kind.to_string(),
        id: key.to_string(),
        reason: format!("registered under key {} but carries id {}", key, id),
    }
}
