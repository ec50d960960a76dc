//! LiquidSim Core - deterministic liquid-handling protocol simulator
//!
//! Turns a list of protocol steps into the hardware commands a robot would
//! execute, tracking the deck as it goes:
//! - Invariant context (pipettes, labware, modules) and evolving robot state
//! - Validators producing typed errors and warnings
//! - Atomic command creators and compound creators built from them
//! - Timeline builder with one frame per step
//! - No-op stripper and per-command substep view
//!
//! Simulation is pure: the same context, state, steps and key generator
//! always produce the same timeline.

pub mod command_creators;
pub mod commands;
pub mod config;
pub mod context;
pub mod deck;
pub mod errors;
pub mod keys;
pub mod logging_facility;
pub mod model;
pub mod robot_state;
pub mod steps;
pub mod strip_no_ops;
pub mod substeps;
pub mod timeline;
pub mod validators;

// Re-export commonly used types
pub use command_creators::CommandCreatorResult;
pub use commands::Command;
pub use config::SimulationConfig;
pub use context::InvariantContext;
pub use errors::{
    CommandCreatorError, CommandCreatorWarning, ErrorKind, LiquidSimError, Result, WarningKind,
};
pub use keys::{KeyGenerator, SequentialKeyGenerator, UuidKeyGenerator};
pub use robot_state::{InitialDeckSetup, RobotState};
pub use steps::{Step, StepArgs};
pub use strip_no_ops::strip_no_op_commands;
pub use substeps::{substep_timeline, Substep};
pub use timeline::{build_timeline, Frame, Timeline};
