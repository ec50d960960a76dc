//! Single-command creators
//!
//! Each validates its arguments against the invariant context and robot
//! state in a fixed order, collecting every applicable error, and emits
//! exactly one command when nothing failed.

mod liquid;
mod modules;
mod movement;
mod tips;

pub use liquid::{
    air_gap, aspirate, blowout, dispense, touch_tip, AspDispArgs, BlowoutArgs, TouchTipArgs,
};
pub use modules::{
    await_temperature, deactivate_temperature, disengage_magnet, engage_magnet,
    heater_shaker_close_latch, heater_shaker_deactivate_heater, heater_shaker_open_latch,
    heater_shaker_set_shake_speed, heater_shaker_set_temperature, heater_shaker_stop_shake,
    set_temperature, thermocycler_close_lid, thermocycler_deactivate_block,
    thermocycler_deactivate_lid, thermocycler_open_lid, thermocycler_set_block_temperature,
    thermocycler_set_lid_temperature, EngageMagnetArgs, ModuleArgs, ShakeArgs, TemperatureArgs,
};
pub use movement::{
    delay, move_labware, move_relative, move_to_well, DelayArgs, MoveLabwareArgs,
    MoveRelativeArgs, MoveToWellArgs,
};
pub use tips::{drop_tip, pick_up_tip, DropTipArgs, PickUpTipArgs};
