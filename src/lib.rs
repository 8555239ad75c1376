/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/
#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! Two-wire control plane for the SR030PC30 (Hynix/SiliconFile) VGA sensor.
//!
//! The sensor streams YUV 4:2:2 or JPEG over its parallel port; all this
//! crate drives is the register side. [`Sr030pc30`] checks the sensor
//! identity at power-on, switches it between preview and capture windows,
//! maps controls such as white balance or flip onto register presets, and
//! validates frame sizes against the preview and capture tables.
//!
//! Presets are written either from tables compiled into the crate
//! ([`CompiledTables`]) or, while calibrating, from a C header read at
//! runtime ([`TuningFile`]).

extern crate alloc;

pub mod bus;
pub mod control;
pub mod error;
pub mod format;
pub mod power;
pub mod program;
pub mod registers;
pub mod state;
pub mod tables;
pub mod tuning;

pub use bus::{Bus, RegisterBus, RetryPolicy, DEFAULT_I2C_ADDRESS};
pub use control::{ControlDescriptor, ControlId};
pub use error::{BusError, ControlError, FormatError, PowerError, ProgramError, TuningError};
pub use format::{FrameFormat, FrameSize, PixelFormat, StreamParams};
pub use power::{InterfaceParams, Platform, PowerState};
pub use program::{BatchSource, CompiledTables, TuningFile};
pub use registers::{RegisterBatch, RegisterEntry};
pub use state::{CaptureState, SensorState, StreamState};
pub use tuning::{TuningLoader, TuningTable};

#[cfg(feature = "std")]
pub use tuning::FileTuning;

/// Main driver struct.
///
/// Owns the sensor state outright; callers serialize access, for example by
/// keeping the driver behind a mutex.
pub struct Sr030pc30<BUS, P, S> {
    bus: BUS,
    platform: P,
    source: S,
    state: SensorState,
    power: PowerState,
}

impl<BUS, P, S> Sr030pc30<BUS, P, S>
where
    BUS: RegisterBus,
    P: Platform,
    S: BatchSource,
{
    /// The sensor starts unpowered with default settings
    pub fn new(bus: BUS, platform: P, source: S) -> Self {
        Self {
            bus,
            platform,
            source,
            state: SensorState::default(),
            power: PowerState::Off,
        }
    }

    pub fn state(&self) -> &SensorState {
        &self.state
    }

    pub fn power_state(&self) -> PowerState {
        self.power
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Give back the bus, platform and batch source
    pub fn release(self) -> (BUS, P, S) {
        (self.bus, self.platform, self.source)
    }

    pub(crate) fn program(
        &mut self,
        batch: &RegisterBatch,
    ) -> Result<(), ProgramError<BUS::Error>> {
        self.source.apply(&mut self.bus, batch)
    }
}
