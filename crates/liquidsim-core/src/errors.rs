use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using LiquidSimError
pub type Result<T> = std::result::Result<T, LiquidSimError>;

// ========== Command Creator Error Facility ==========

/// Canonical error kind taxonomy for command creation
///
/// Every failed command creator surfaces one or more errors carrying one of
/// these kinds. Each kind maps to a stable code that hosts use to render a
/// message and tests use to assert on exact error sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    // Existence
    PipetteDoesNotExist,
    LabwareDoesNotExist,
    ModuleDoesNotExist,
    WellDoesNotExist,
    DropTipLocationDoesNotExist,

    // Tips
    NoTipOnPipette,
    PipetteHasTip,
    TipNotAvailable,
    InsufficientTips,

    // Capacity
    PipetteVolumeExceeded,
    TipVolumeExceeded,
    InvalidVolume,
    MismatchedSourceDestinationWells,

    // Collision / interlocks
    ModulePipetteCollisionDanger,
    ThermocyclerLidClosed,
    HeaterShakerLatchOpen,
    HeaterShakerLatchClosed,
    HeaterShakerIsShaking,
    HeaterShakerNorthSouthEastWestShaking,
    HeaterShakerEastWestLatchOpen,
    HeaterShakerEastWestMultiChannel,
    HeaterShakerNorthSouthNonTiprackMultiChannel,

    // Deck state
    LabwareOffDeck,
    LabwareSlotOccupied,
    ModuleTypeMismatch,
    GripperRequired,
}

impl ErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::PipetteDoesNotExist => "PIPETTE_DOES_NOT_EXIST",
            ErrorKind::LabwareDoesNotExist => "LABWARE_DOES_NOT_EXIST",
            ErrorKind::ModuleDoesNotExist => "MODULE_DOES_NOT_EXIST",
            ErrorKind::WellDoesNotExist => "WELL_DOES_NOT_EXIST",
            ErrorKind::DropTipLocationDoesNotExist => "DROP_TIP_LOCATION_DOES_NOT_EXIST",
            ErrorKind::NoTipOnPipette => "NO_TIP_ON_PIPETTE",
            ErrorKind::PipetteHasTip => "PIPETTE_HAS_TIP",
            ErrorKind::TipNotAvailable => "TIP_NOT_AVAILABLE",
            ErrorKind::InsufficientTips => "INSUFFICIENT_TIPS",
            ErrorKind::PipetteVolumeExceeded => "PIPETTE_VOLUME_EXCEEDED",
            ErrorKind::TipVolumeExceeded => "TIP_VOLUME_EXCEEDED",
            ErrorKind::InvalidVolume => "INVALID_VOLUME",
            ErrorKind::MismatchedSourceDestinationWells => "MISMATCHED_SOURCE_DESTINATION_WELLS",
            ErrorKind::ModulePipetteCollisionDanger => "MODULE_PIPETTE_COLLISION_DANGER",
            ErrorKind::ThermocyclerLidClosed => "THERMOCYCLER_LID_CLOSED",
            ErrorKind::HeaterShakerLatchOpen => "HEATER_SHAKER_LATCH_OPEN",
            ErrorKind::HeaterShakerLatchClosed => "HEATER_SHAKER_LATCH_CLOSED",
            ErrorKind::HeaterShakerIsShaking => "HEATER_SHAKER_IS_SHAKING",
            ErrorKind::HeaterShakerNorthSouthEastWestShaking => {
                "HEATER_SHAKER_NORTH_SOUTH_EAST_WEST_SHAKING"
            }
            ErrorKind::HeaterShakerEastWestLatchOpen => "HEATER_SHAKER_EAST_WEST_LATCH_OPEN",
            ErrorKind::HeaterShakerEastWestMultiChannel => "HEATER_SHAKER_EAST_WEST_MULTI_CHANNEL",
            ErrorKind::HeaterShakerNorthSouthNonTiprackMultiChannel => {
                "HEATER_SHAKER_NORTH_SOUTH_NON_TIPRACK_MULTI_CHANNEL"
            }
            ErrorKind::LabwareOffDeck => "LABWARE_OFF_DECK",
            ErrorKind::LabwareSlotOccupied => "LABWARE_SLOT_OCCUPIED",
            ErrorKind::ModuleTypeMismatch => "MODULE_TYPE_MISMATCH",
            ErrorKind::GripperRequired => "GRIPPER_REQUIRED",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Structured error produced when a command creator rejects its input
///
/// Carries the machine-checkable kind plus whatever context the failing
/// validator had at hand (ids, numeric bounds) so a host can render a
/// precise message without re-running validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandCreatorError {
    kind: ErrorKind,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pipette: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    labware: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    well: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_volume: Option<f64>,
}

impl CommandCreatorError {
    /// Create a new error with the specified kind
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: String::new(),
            action: None,
            pipette: None,
            labware: None,
            well: None,
            module: None,
            volume: None,
            max_volume: None,
        }
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add the name of the action that was being validated
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Add pipette ID context
    pub fn with_pipette(mut self, pipette: impl Into<String>) -> Self {
        self.pipette = Some(pipette.into());
        self
    }

    /// Add labware ID context
    pub fn with_labware(mut self, labware: impl Into<String>) -> Self {
        self.labware = Some(labware.into());
        self
    }

    /// Add well name context
    pub fn with_well(mut self, well: impl Into<String>) -> Self {
        self.well = Some(well.into());
        self
    }

    /// Add module ID context
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Add requested volume context
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Add volume bound context
    pub fn with_max_volume(mut self, max_volume: f64) -> Self {
        self.max_volume = Some(max_volume);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn pipette(&self) -> Option<&str> {
        self.pipette.as_deref()
    }

    pub fn labware(&self) -> Option<&str> {
        self.labware.as_deref()
    }

    pub fn well(&self) -> Option<&str> {
        self.well.as_deref()
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub fn volume(&self) -> Option<f64> {
        self.volume
    }

    pub fn max_volume(&self) -> Option<f64> {
        self.max_volume
    }
}

impl std::fmt::Display for CommandCreatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(action) = &self.action {
            write!(f, " during '{}'", action)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(pipette) = &self.pipette {
            write!(f, " (pipette: {})", pipette)?;
        }
        if let Some(labware) = &self.labware {
            write!(f, " (labware: {})", labware)?;
        }
        if let Some(well) = &self.well {
            write!(f, " (well: {})", well)?;
        }
        if let Some(module) = &self.module {
            write!(f, " (module: {})", module)?;
        }
        if let (Some(volume), Some(max_volume)) = (self.volume, self.max_volume) {
            write!(f, " (volume: {} > max: {})", volume, max_volume)?;
        }
        Ok(())
    }
}

impl std::error::Error for CommandCreatorError {}

// Constructors for the error kinds that carry fixed context. Messages are
// fixed per kind so identical inputs produce identical error payloads.
impl CommandCreatorError {
    pub fn pipette_does_not_exist(action: &str, pipette: &str) -> Self {
        Self::new(ErrorKind::PipetteDoesNotExist)
            .with_action(action)
            .with_pipette(pipette)
            .with_message(format!(
                "Attempted to {} with pipette id \"{}\", this pipette was not found",
                action, pipette
            ))
    }

    pub fn labware_does_not_exist(action: &str, labware: &str) -> Self {
        Self::new(ErrorKind::LabwareDoesNotExist)
            .with_action(action)
            .with_labware(labware)
            .with_message(format!(
                "Attempted to {} with labware id \"{}\", this labware was not found",
                action, labware
            ))
    }

    pub fn module_does_not_exist(action: &str, module: &str) -> Self {
        Self::new(ErrorKind::ModuleDoesNotExist)
            .with_action(action)
            .with_module(module)
            .with_message(format!(
                "Attempted to {} with module id \"{}\", this module was not found",
                action, module
            ))
    }

    pub fn well_does_not_exist(action: &str, labware: &str, well: &str) -> Self {
        Self::new(ErrorKind::WellDoesNotExist)
            .with_action(action)
            .with_labware(labware)
            .with_well(well)
            .with_message(format!("Well \"{}\" is not part of labware \"{}\"", well, labware))
    }

    pub fn drop_tip_location_does_not_exist(pipette: &str, location: &str) -> Self {
        Self::new(ErrorKind::DropTipLocationDoesNotExist)
            .with_action("drop tip")
            .with_pipette(pipette)
            .with_labware(location)
            .with_message("The destination for dropped tips was not found")
    }

    pub fn no_tip_on_pipette(action: &str, pipette: &str, labware: &str, well: &str) -> Self {
        Self::new(ErrorKind::NoTipOnPipette)
            .with_action(action)
            .with_pipette(pipette)
            .with_labware(labware)
            .with_well(well)
            .with_message(format!(
                "Attempted to {} with no tip on pipette: {} from {}'s well {}",
                action, pipette, labware, well
            ))
    }

    pub fn pipette_has_tip(pipette: &str) -> Self {
        Self::new(ErrorKind::PipetteHasTip)
            .with_action("pick up tip")
            .with_pipette(pipette)
            .with_message("Attempted to pick up a tip with a pipette that already holds one")
    }

    pub fn tip_not_available(pipette: &str, labware: &str, well: &str) -> Self {
        Self::new(ErrorKind::TipNotAvailable)
            .with_action("pick up tip")
            .with_pipette(pipette)
            .with_labware(labware)
            .with_well(well)
            .with_message("No tip is present at the requested tip rack position")
    }

    pub fn insufficient_tips(pipette: &str) -> Self {
        Self::new(ErrorKind::InsufficientTips)
            .with_pipette(pipette)
            .with_message("Not enough tips to complete action")
    }

    pub fn pipette_volume_exceeded(action: &str, volume: f64, max_volume: f64) -> Self {
        Self::new(ErrorKind::PipetteVolumeExceeded)
            .with_action(action)
            .with_volume(volume)
            .with_max_volume(max_volume)
            .with_message(format!(
                "Attempted to {} volume greater than pipette max volume ({} > {})",
                action, volume, max_volume
            ))
    }

    pub fn tip_volume_exceeded(action: &str, volume: f64, max_volume: f64) -> Self {
        Self::new(ErrorKind::TipVolumeExceeded)
            .with_action(action)
            .with_volume(volume)
            .with_max_volume(max_volume)
            .with_message(format!(
                "Attempted to {} volume greater than tip max volume ({} > {})",
                action, volume, max_volume
            ))
    }

    pub fn invalid_volume(action: &str, volume: f64) -> Self {
        Self::new(ErrorKind::InvalidVolume)
            .with_action(action)
            .with_volume(volume)
            .with_message("Volume must be a positive number")
    }

    pub fn mismatched_source_destination_wells(sources: usize, dests: usize) -> Self {
        Self::new(ErrorKind::MismatchedSourceDestinationWells).with_message(format!(
            "Cannot pair {} source wells with {} destination wells",
            sources, dests
        ))
    }

    pub fn module_pipette_collision_danger() -> Self {
        Self::new(ErrorKind::ModulePipetteCollisionDanger).with_message(
            "Gen1 multi-channel pipettes cannot access labware on or north of a Gen1 module in slot 1 or 3",
        )
    }

    pub fn thermocycler_lid_closed() -> Self {
        Self::new(ErrorKind::ThermocyclerLidClosed)
            .with_message("Attempted to interact with contents of a thermocycler with the lid closed")
    }

    pub fn heater_shaker_latch_open() -> Self {
        Self::new(ErrorKind::HeaterShakerLatchOpen)
            .with_message("Attempted to interact with contents of a heater-shaker with the latch open")
    }

    pub fn heater_shaker_latch_closed() -> Self {
        Self::new(ErrorKind::HeaterShakerLatchClosed)
            .with_message("Attempted to move labware on or off a heater-shaker with the latch closed")
    }

    pub fn heater_shaker_is_shaking() -> Self {
        Self::new(ErrorKind::HeaterShakerIsShaking)
            .with_message("Attempted to interact with contents of a heater-shaker while it is shaking")
    }

    pub fn heater_shaker_north_south_east_west_shaking() -> Self {
        Self::new(ErrorKind::HeaterShakerNorthSouthEastWestShaking)
            .with_message("Attempted to access a slot adjacent to a shaking heater-shaker")
    }

    pub fn heater_shaker_east_west_latch_open() -> Self {
        Self::new(ErrorKind::HeaterShakerEastWestLatchOpen).with_message(
            "Attempted to access a slot east or west of a heater-shaker with its latch open",
        )
    }

    pub fn heater_shaker_east_west_multi_channel() -> Self {
        Self::new(ErrorKind::HeaterShakerEastWestMultiChannel).with_message(
            "Multi-channel pipettes cannot access slots east or west of a heater-shaker",
        )
    }

    pub fn heater_shaker_north_south_non_tiprack_multi_channel() -> Self {
        Self::new(ErrorKind::HeaterShakerNorthSouthNonTiprackMultiChannel).with_message(
            "Multi-channel pipettes can only access tip racks north or south of a heater-shaker",
        )
    }

    pub fn labware_off_deck(action: &str, labware: &str) -> Self {
        Self::new(ErrorKind::LabwareOffDeck)
            .with_action(action)
            .with_labware(labware)
            .with_message("Attempted to interact with labware that is off the deck")
    }

    pub fn labware_slot_occupied(labware: &str, location: &str) -> Self {
        Self::new(ErrorKind::LabwareSlotOccupied)
            .with_action("move labware")
            .with_labware(labware)
            .with_message(format!("Destination {} is already occupied", location))
    }

    pub fn module_type_mismatch(action: &str, module: &str, expected: &str) -> Self {
        Self::new(ErrorKind::ModuleTypeMismatch)
            .with_action(action)
            .with_module(module)
            .with_message(format!("Expected module \"{}\" to be a {}", module, expected))
    }

    pub fn gripper_required(labware: &str) -> Self {
        Self::new(ErrorKind::GripperRequired)
            .with_action("move labware")
            .with_labware(labware)
            .with_message("Moving labware with the gripper requires a gripper to be attached")
    }
}

// ========== Warnings ==========

/// Non-fatal advisory kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningKind {
    AspirateFromPristineWell,
    AspirateMoreThanWellContents,
    OverMaxWellVolume,
    ChannelsOutsideLabware,
}

impl WarningKind {
    pub fn code(&self) -> &'static str {
        match self {
            WarningKind::AspirateFromPristineWell => "ASPIRATE_FROM_PRISTINE_WELL",
            WarningKind::AspirateMoreThanWellContents => "ASPIRATE_MORE_THAN_WELL_CONTENTS",
            WarningKind::OverMaxWellVolume => "OVER_MAX_WELL_VOLUME",
            WarningKind::ChannelsOutsideLabware => "CHANNELS_OUTSIDE_LABWARE",
        }
    }
}

/// Advisory carried alongside a successful result; never blocks state advancement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandCreatorWarning {
    pub kind: WarningKind,
    pub message: String,
    pub labware: String,
    pub well: String,
}

impl CommandCreatorWarning {
    pub fn aspirate_from_pristine_well(labware: &str, well: &str) -> Self {
        Self {
            kind: WarningKind::AspirateFromPristineWell,
            message: "Aspirating from a well that contains no known liquid".to_string(),
            labware: labware.to_string(),
            well: well.to_string(),
        }
    }

    pub fn aspirate_more_than_well_contents(labware: &str, well: &str) -> Self {
        Self {
            kind: WarningKind::AspirateMoreThanWellContents,
            message: "Not enough liquid in well to aspirate the requested volume".to_string(),
            labware: labware.to_string(),
            well: well.to_string(),
        }
    }

    pub fn over_max_well_volume(labware: &str, well: &str) -> Self {
        Self {
            kind: WarningKind::OverMaxWellVolume,
            message: "Dispense volume will overflow the well".to_string(),
            labware: labware.to_string(),
            well: well.to_string(),
        }
    }

    /// A multi-channel pipette aimed where its channels do not all fit; only
    /// the named well is tracked
    pub fn channels_outside_labware(labware: &str, well: &str) -> Self {
        Self {
            kind: WarningKind::ChannelsOutsideLabware,
            message: "Pipette channels cannot all be placed at this well; only the first channel's well is tracked".to_string(),
            labware: labware.to_string(),
            well: well.to_string(),
        }
    }
}

// ========== Programmatic errors ==========

/// Errors raised outside the command-creator contract
///
/// Command creators never return these; they report failures as
/// [`CommandCreatorError`] data. These cover building an invariant context,
/// seeding an initial robot state and loading configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LiquidSimError {
    /// Two entities of the same kind were registered under one id
    #[error("Duplicate {entity_kind} id: {id}")]
    DuplicateEntity { entity_kind: String, id: String },

    /// A state or setup references an id that the invariant context lacks
    #[error("Unknown {entity_kind} id: {id}")]
    UnknownEntity { entity_kind: String, id: String },

    /// An entity was registered with a definition that cannot be simulated
    #[error("Invalid {entity_kind} {id}: {reason}")]
    InvalidEntity {
        entity_kind: String,
        id: String,
        reason: String,
    },

    /// Two top-level items were placed into the same deck slot
    #[error("Slot {slot} is already occupied by {occupant}")]
    SlotOccupied { slot: String, occupant: String },

    /// Serialization/deserialization failure
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl LiquidSimError {
    /// Get a stable error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            LiquidSimError::DuplicateEntity { .. } => "ERR_DUPLICATE_ENTITY",
            LiquidSimError::UnknownEntity { .. } => "ERR_UNKNOWN_ENTITY",
            LiquidSimError::InvalidEntity { .. } => "ERR_INVALID_ENTITY",
            LiquidSimError::SlotOccupied { .. } => "ERR_SLOT_OCCUPIED",
            LiquidSimError::Serialization { .. } => "ERR_SERIALIZATION",
        }
    }
}

/// Conversion from serde_json::Error to LiquidSimError
impl From<serde_json::Error> for LiquidSimError {
    fn from(err: serde_json::Error) -> Self {
        LiquidSimError::Serialization {
            message: err.to_string(),
        }
    }
}
