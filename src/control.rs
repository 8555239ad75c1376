/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! The control surface: enumerable descriptors plus get/set/query by raw id.
//!
//! Values are range-checked against the descriptor before anything touches
//! the bus, and state is only updated once the matching batch is written.

use core::convert::TryFrom;

use log::debug;

use crate::bus::RegisterBus;
use crate::error::ControlError;
use crate::power::Platform;
use crate::program::BatchSource;
use crate::state::{
    Contrast, Effect, ExposureBias, Flip, Mode, Pretty, StreamState, WhiteBalance,
    Zoom,
};
use crate::tables;
use crate::Sr030pc30;

/// First id of the driver-private control range
pub const PRIVATE_BASE: u32 = 0x0800_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ControlId {
    Brightness = 0x0098_0900,
    Contrast = 0x0098_0901,
    Zoom = 0x009a_090d,
    Mode = PRIVATE_BASE,
    State = PRIVATE_BASE + 1,
    WhiteBalance = PRIVATE_BASE + 2,
    Effect = PRIVATE_BASE + 3,
    Flip = PRIVATE_BASE + 4,
    Pretty = PRIVATE_BASE + 5,
    CheckDataline = PRIVATE_BASE + 6,
    CheckDatalineStop = PRIVATE_BASE + 7,
}

impl ControlId {
    pub fn from_raw(raw: u32) -> Option<Self> {
        CONTROLS.iter().map(|c| c.id).find(|id| id.raw() == raw)
    }

    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// Integer control as offered to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlDescriptor {
    pub id: ControlId,
    pub name: &'static str,
    pub minimum: i32,
    pub maximum: i32,
    pub step: i32,
    pub default: i32,
}

impl ControlDescriptor {
    const fn new(
        id: ControlId,
        name: &'static str,
        minimum: i32,
        maximum: i32,
        default: i32,
    ) -> Self {
        Self {
            id,
            name,
            minimum,
            maximum,
            step: 1,
            default,
        }
    }

    pub fn contains(&self, value: i32) -> bool {
        value >= self.minimum && value <= self.maximum
    }
}

pub static CONTROLS: [ControlDescriptor; 11] = [
    ControlDescriptor::new(ControlId::Mode, "select mode", 1, 3, 1),
    ControlDescriptor::new(ControlId::State, "select state", 0, 1, 0),
    ControlDescriptor::new(ControlId::Zoom, "zoom", 0, 12, 0),
    ControlDescriptor::new(ControlId::Brightness, "exposure bias", 0, 8, 4),
    ControlDescriptor::new(ControlId::WhiteBalance, "white balance", 0, 4, 0),
    ControlDescriptor::new(ControlId::Contrast, "contrast", -3, 3, 0),
    ControlDescriptor::new(ControlId::Effect, "effect", 0, 6, 0),
    ControlDescriptor::new(ControlId::Flip, "flip", 0, 3, 0),
    ControlDescriptor::new(ControlId::Pretty, "pretty", 0, 3, 0),
    ControlDescriptor::new(ControlId::CheckDataline, "check dataline", 0, 1, 0),
    ControlDescriptor::new(
        ControlId::CheckDatalineStop,
        "check dataline stop",
        0,
        1,
        0,
    ),
];

impl<BUS, P, S> Sr030pc30<BUS, P, S>
where
    BUS: RegisterBus,
    P: Platform,
    S: BatchSource,
{
    /// Narrow an already range-checked value to its typed setting
    fn typed<T: TryFrom<i32>>(
        descriptor: &ControlDescriptor,
        value: i32,
    ) -> Result<T, ControlError<BUS::Error>> {
        T::try_from(value).map_err(|_| ControlError::OutOfRange {
            id: descriptor.id,
            value,
            minimum: descriptor.minimum,
            maximum: descriptor.maximum,
        })
    }

    pub fn controls(&self) -> &'static [ControlDescriptor] {
        &CONTROLS
    }

    pub fn query_control(
        &self,
        raw: u32,
    ) -> Result<&'static ControlDescriptor, ControlError<BUS::Error>> {
        CONTROLS
            .iter()
            .find(|c| c.id.raw() == raw)
            .ok_or(ControlError::UnsupportedControl(raw))
    }

    pub fn get_control(&self, raw: u32) -> Result<i32, ControlError<BUS::Error>> {
        let state = &self.state;
        let value = match self.query_control(raw)?.id {
            ControlId::Mode => state.mode.value(),
            ControlId::State => state.selected.value(),
            ControlId::Zoom => state.zoom.value(),
            ControlId::Brightness => state.exposure_bias.value(),
            ControlId::WhiteBalance => state.white_balance.value(),
            ControlId::Contrast => state.contrast.value(),
            ControlId::Effect => state.effect.value(),
            ControlId::Flip => state.flip.value(),
            ControlId::Pretty => state.pretty.value(),
            ControlId::CheckDataline => state.check_dataline as i32,
            ControlId::CheckDatalineStop => 0,
        };
        Ok(value)
    }

    pub fn set_control(
        &mut self,
        raw: u32,
        value: i32,
    ) -> Result<(), ControlError<BUS::Error>> {
        let descriptor = self.query_control(raw)?;
        if !descriptor.contains(value) {
            return Err(ControlError::OutOfRange {
                id: descriptor.id,
                value,
                minimum: descriptor.minimum,
                maximum: descriptor.maximum,
            });
        }
        debug!("set {:?} = {}", descriptor.id, value);

        let mode = self.state.mode;
        match descriptor.id {
            ControlId::Mode => self.state.mode = Self::typed::<Mode>(descriptor, value)?,
            ControlId::State => {
                self.state.selected = Self::typed::<StreamState>(descriptor, value)?
            }
            ControlId::Zoom => self.state.zoom = Self::typed::<Zoom>(descriptor, value)?,
            ControlId::Contrast => {
                self.state.contrast = Self::typed::<Contrast>(descriptor, value)?
            }
            ControlId::Brightness => {
                let bias = Self::typed::<ExposureBias>(descriptor, value)?;
                self.program(tables::exposure(mode, bias))?;
                self.state.exposure_bias = bias;
            }
            ControlId::WhiteBalance => {
                let wb = Self::typed::<WhiteBalance>(descriptor, value)?;
                self.program(tables::white_balance(wb))?;
                self.state.white_balance = wb;
            }
            ControlId::Effect => {
                let effect = Self::typed::<Effect>(descriptor, value)?;
                self.program(tables::effect(effect))?;
                self.state.effect = effect;
            }
            ControlId::Flip => {
                let flip = Self::typed::<Flip>(descriptor, value)?;
                self.program(tables::flip(flip))?;
                self.state.flip = flip;
            }
            ControlId::Pretty => {
                let pretty = Self::typed::<Pretty>(descriptor, value)?;
                self.program(tables::pretty(mode, pretty))?;
                self.state.pretty = pretty;
            }
            ControlId::CheckDataline => self.state.check_dataline = value == 1,
            ControlId::CheckDatalineStop => {
                if value == 1 {
                    self.run_dataline_test()?;
                }
            }
        }
        Ok(())
    }
}
