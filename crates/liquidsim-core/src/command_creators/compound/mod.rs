//! Multi-command creators
//!
//! Compound creators build a list of curried child creators and run it
//! through [`reduce_command_creators`](super::reduce_command_creators), so a
//! failing child aborts the whole compound with no commands. Liquid-handling
//! compounds share [`LiquidPlan`] to assemble their child lists.

mod consolidate;
mod distribute;
mod mix;
mod modules;
mod move_labware;
mod replace_tip;
mod transfer;

use serde::{Deserialize, Serialize};

pub use consolidate::{consolidate, ConsolidateArgs};
pub use distribute::{distribute, DistributeArgs};
pub use mix::{mix, MixArgs};
pub use modules::{
    heater_shaker, magnet, pause, temperature, thermocycler_state, HeaterShakerArgs, MagnetAction,
    MagnetArgs, PauseArgs, TemperatureStepArgs, ThermocyclerStateArgs,
};
pub use move_labware::{move_labware_step, MoveLabwareStepArgs};
pub use replace_tip::{replace_tip, ReplaceTipArgs};
pub use transfer::{transfer, TransferArgs};

use super::atomic::{
    air_gap, aspirate, blowout, dispense, drop_tip, touch_tip, AspDispArgs, BlowoutArgs,
    DropTipArgs, TouchTipArgs,
};
use super::{curry, reduce_command_creators, CommandCreatorResult, CurriedCommandCreator};
use crate::context::InvariantContext;
use crate::errors::CommandCreatorError;
use crate::keys::KeyGenerator;
use crate::model::PipetteEntity;
use crate::robot_state::RobotState;

/// When a liquid-handling compound swaps tips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeTipPolicy {
    Always,
    Once,
    PerSource,
    PerDest,
    Never,
}

impl ChangeTipPolicy {
    fn needs_new_tip(&self, is_first: bool, source_changed: bool, dest_changed: bool) -> bool {
        match self {
            ChangeTipPolicy::Always => true,
            ChangeTipPolicy::Once => is_first,
            ChangeTipPolicy::PerSource => is_first || source_changed,
            ChangeTipPolicy::PerDest => is_first || dest_changed,
            ChangeTipPolicy::Never => false,
        }
    }

    fn drops_at_end(&self) -> bool {
        *self != ChangeTipPolicy::Never
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixSettings {
    pub volume: f64,
    pub times: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlowoutLocation {
    SourceWell,
    DestWell,
    /// Any labware, typically a trash, targeted at its first well
    Labware(String),
}

/// Optional behaviour shared by transfer, consolidate, distribute and mix
///
/// Flow rates default to the pipette's own defaults; the touch-tip height
/// defaults to 1 mm below the top of the well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LiquidHandlingOptions {
    pub aspirate_offset_from_bottom_mm: f64,
    pub dispense_offset_from_bottom_mm: f64,
    pub aspirate_flow_rate: Option<f64>,
    pub dispense_flow_rate: Option<f64>,
    pub blowout_flow_rate: Option<f64>,
    pub blowout_offset_from_top_mm: f64,
    pub touch_tip_offset_from_bottom_mm: Option<f64>,
    pub pre_wet_tip: bool,
    pub mix_before_aspirate: Option<MixSettings>,
    pub touch_tip_after_aspirate: bool,
    pub air_gap_volume: Option<f64>,
    pub touch_tip_after_dispense: bool,
    pub mix_in_destination: Option<MixSettings>,
    pub blowout_location: Option<BlowoutLocation>,
}

impl Default for LiquidHandlingOptions {
    fn default() -> Self {
        Self {
            aspirate_offset_from_bottom_mm: 1.0,
            dispense_offset_from_bottom_mm: 0.5,
            aspirate_flow_rate: None,
            dispense_flow_rate: None,
            blowout_flow_rate: None,
            blowout_offset_from_top_mm: 0.0,
            touch_tip_offset_from_bottom_mm: None,
            pre_wet_tip: false,
            mix_before_aspirate: None,
            touch_tip_after_aspirate: false,
            air_gap_volume: None,
            touch_tip_after_dispense: false,
            mix_in_destination: None,
            blowout_location: None,
        }
    }
}

impl LiquidHandlingOptions {
    /// Air gap volume if one was requested
    fn air_gap(&self) -> f64 {
        self.air_gap_volume.filter(|v| *v > 0.0).unwrap_or(0.0)
    }
}

/// A labware and one of its wells
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WellRef {
    pub labware: String,
    pub well: String,
}

impl WellRef {
    pub(crate) fn new(labware: &str, well: &str) -> Self {
        Self {
            labware: labware.to_string(),
            well: well.to_string(),
        }
    }
}

/// Look up the pipette a compound will drive
fn pipette_for<'c>(
    ctx: &'c InvariantContext,
    action: &str,
    pipette: &str,
) -> Result<&'c PipetteEntity, CommandCreatorResult> {
    ctx.pipette(pipette).ok_or_else(|| {
        CommandCreatorResult::failure(vec![CommandCreatorError::pipette_does_not_exist(
            action, pipette,
        )])
    })
}

/// Ordered child list for a liquid-handling compound
pub(crate) struct LiquidPlan<'a> {
    ctx: &'a InvariantContext,
    pipette: &'a PipetteEntity,
    options: &'a LiquidHandlingOptions,
    drop_tip_location: String,
    creators: Vec<CurriedCommandCreator<'static>>,
}

impl<'a> LiquidPlan<'a> {
    pub(crate) fn new(
        ctx: &'a InvariantContext,
        pipette: &'a PipetteEntity,
        options: &'a LiquidHandlingOptions,
        drop_tip_location: &str,
    ) -> Self {
        Self {
            ctx,
            pipette,
            options,
            drop_tip_location: drop_tip_location.to_string(),
            creators: Vec::new(),
        }
    }

    /// Tip capacity left for liquid once the air gap is reserved
    pub(crate) fn liquid_capacity(&self) -> f64 {
        self.pipette.tip_max_volume() - self.options.air_gap()
    }

    fn asp_args(&self, at: &WellRef, volume: f64) -> AspDispArgs {
        AspDispArgs {
            pipette: self.pipette.id.clone(),
            volume,
            labware: at.labware.clone(),
            well: at.well.clone(),
            offset_from_bottom_mm: self.options.aspirate_offset_from_bottom_mm,
            flow_rate: self
                .options
                .aspirate_flow_rate
                .unwrap_or(self.pipette.spec.default_aspirate_flow_rate),
        }
    }

    fn disp_args(&self, at: &WellRef, volume: f64) -> AspDispArgs {
        AspDispArgs {
            pipette: self.pipette.id.clone(),
            volume,
            labware: at.labware.clone(),
            well: at.well.clone(),
            offset_from_bottom_mm: self.options.dispense_offset_from_bottom_mm,
            flow_rate: self
                .options
                .dispense_flow_rate
                .unwrap_or(self.pipette.spec.default_dispense_flow_rate),
        }
    }

    pub(crate) fn replace_tip(&mut self) {
        self.creators.push(curry(
            replace_tip,
            ReplaceTipArgs {
                pipette: self.pipette.id.clone(),
                drop_tip_location: self.drop_tip_location.clone(),
            },
        ));
    }

    pub(crate) fn drop_tip(&mut self) {
        self.creators.push(curry(
            drop_tip,
            DropTipArgs {
                pipette: self.pipette.id.clone(),
                location: self.drop_tip_location.clone(),
            },
        ));
    }

    pub(crate) fn aspirate(&mut self, at: &WellRef, volume: f64) {
        let args = self.asp_args(at, volume);
        self.creators.push(curry(aspirate, args));
    }

    pub(crate) fn dispense(&mut self, at: &WellRef, volume: f64) {
        let args = self.disp_args(at, volume);
        self.creators.push(curry(dispense, args));
    }

    /// Air gap above `at`, if the options ask for one
    pub(crate) fn air_gap(&mut self, at: &WellRef) {
        let volume = self.options.air_gap();
        if volume > 0.0 {
            let mut args = self.asp_args(at, volume);
            args.offset_from_bottom_mm = self.well_depth(at);
            self.creators.push(curry(air_gap, args));
        }
    }

    fn well_depth(&self, at: &WellRef) -> f64 {
        self.ctx
            .labware(&at.labware)
            .and_then(|l| l.definition.well(&at.well))
            .map(|w| w.depth)
            .unwrap_or(0.0)
    }

    pub(crate) fn touch_tip(&mut self, at: &WellRef) {
        let offset = self
            .options
            .touch_tip_offset_from_bottom_mm
            .unwrap_or_else(|| (self.well_depth(at) - 1.0).max(0.0));
        self.creators.push(curry(
            touch_tip,
            TouchTipArgs {
                pipette: self.pipette.id.clone(),
                labware: at.labware.clone(),
                well: at.well.clone(),
                offset_from_bottom_mm: offset,
            },
        ));
    }

    /// Aspirate and dispense `settings.volume` in place, `settings.times` times
    pub(crate) fn mix(&mut self, at: &WellRef, settings: MixSettings) {
        for _ in 0..settings.times {
            self.aspirate(at, settings.volume);
            self.dispense(at, settings.volume);
        }
    }

    pub(crate) fn blowout_at(&mut self, at: &WellRef) {
        self.creators.push(curry(
            blowout,
            BlowoutArgs {
                pipette: self.pipette.id.clone(),
                labware: at.labware.clone(),
                well: at.well.clone(),
                flow_rate: self
                    .options
                    .blowout_flow_rate
                    .unwrap_or(self.pipette.spec.default_blowout_flow_rate),
                offset_from_top_mm: self.options.blowout_offset_from_top_mm,
            },
        ));
    }

    /// Blow out wherever the options direct, if anywhere
    pub(crate) fn blowout(&mut self, source: &WellRef, dest: &WellRef) {
        let target = match &self.options.blowout_location {
            Some(BlowoutLocation::SourceWell) => source.clone(),
            Some(BlowoutLocation::DestWell) => dest.clone(),
            Some(BlowoutLocation::Labware(labware)) => WellRef::new(labware, "A1"),
            None => return,
        };
        self.blowout_at(&target);
    }

    /// Pre-wet, optional mix, aspirate, touch tip, air gap
    pub(crate) fn draw(&mut self, source: &WellRef, volume: f64, fresh_tip: bool) {
        if fresh_tip && self.options.pre_wet_tip {
            let pre_wet = volume.min(self.liquid_capacity());
            self.aspirate(source, pre_wet);
            self.dispense(source, pre_wet);
        }
        if let Some(settings) = self.options.mix_before_aspirate {
            self.mix(source, settings);
        }
        self.aspirate(source, volume);
        if self.options.touch_tip_after_aspirate {
            self.touch_tip(source);
        }
        self.air_gap(source);
    }

    pub(crate) fn options(&self) -> &'a LiquidHandlingOptions {
        self.options
    }

    pub(crate) fn run(
        self,
        state: &RobotState,
        keys: &mut dyn KeyGenerator,
    ) -> CommandCreatorResult {
        reduce_command_creators(self.creators, self.ctx, state, keys)
    }
}
