/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Power sequencing and the preview/capture state machine.

use log::{debug, info, warn};

#[cfg(feature = "rttdebug")]
use panic_rtt_core::rprintln;

use crate::bus::RegisterBus;
use crate::error::{PowerError, ProgramError};
use crate::program::BatchSource;
use crate::state::{CaptureState, SensorState, StreamState, Zoom};
use crate::tables;
use crate::Sr030pc30;

/// Register read after power-on to confirm the sensor is there
pub const IDENTITY_REGISTER: u8 = 0x04;

/// Expected contents of [`IDENTITY_REGISTER`]
pub const DEVICE_ID: u8 = 0x8C;

/// Master clock the sensor is wired for
pub const XCLK_HZ: u32 = 24_000_000;

/// Settling time between rail changes when power cycling
pub const POWER_CYCLE_DELAY_MS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    Off,
    On,
    Standby,
    Resume,
}

/// Parallel camera interface settings reported by the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceParams {
    pub clock_hz: u32,
    pub hsync_active_high: bool,
    pub vsync_active_high: bool,
    pub pclk_rising_edge: bool,
}

/// Board hooks the driver calls but does not implement
pub trait Platform {
    /// Board data handed through to the caller untouched
    type PrivateData;

    /// Switch the sensor rails; the driver handles everything sensor-side
    fn set_power(&mut self, state: PowerState);

    fn interface_params(&self) -> InterfaceParams;

    fn private_data(&self) -> &Self::PrivateData;
}

impl<BUS, P, S> Sr030pc30<BUS, P, S>
where
    BUS: RegisterBus,
    P: Platform,
    S: BatchSource,
{
    pub fn set_power(&mut self, state: PowerState) -> Result<(), PowerError<BUS::Error>> {
        match state {
            PowerState::On => self.power_on(),
            PowerState::Off => {
                self.power_off();
                Ok(())
            }
            PowerState::Standby => self.standby(),
            PowerState::Resume => self.resume(),
        }
    }

    /// Raise the rails, confirm the sensor identity and program the
    /// initialization batch for the current mode.
    ///
    /// If the identity read fails the rails are switched off again before
    /// `DeviceNotPresent` is returned.
    pub fn power_on(&mut self) -> Result<(), PowerError<BUS::Error>> {
        #[cfg(feature = "rttdebug")]
        rprintln!("sr030pc30-i2c power on start");

        self.platform.set_power(PowerState::On);
        self.power = PowerState::On;

        match self.bus.read_byte(IDENTITY_REGISTER) {
            Ok(DEVICE_ID) => {}
            Ok(id) => {
                warn!("identity register reads {:#04x}, expected {:#04x}", id, DEVICE_ID);
                return Err(self.abort_power_on());
            }
            Err(err) => {
                warn!("identity read of {:#04x} failed", err.register());
                return Err(self.abort_power_on());
            }
        }

        self.state.detected = true;
        self.state.zoom = Zoom::MIN;
        self.transition(CaptureState::Invalid);
        info!("sensor detected, mode {:?}", self.state.mode);

        self.program(tables::power_on_init(self.state.mode))?;

        #[cfg(feature = "rttdebug")]
        rprintln!("sr030pc30-i2c power on done");
        Ok(())
    }

    fn abort_power_on(&mut self) -> PowerError<BUS::Error> {
        self.platform.set_power(PowerState::Off);
        self.power = PowerState::Off;
        self.state.detected = false;
        self.transition(CaptureState::Invalid);
        PowerError::DeviceNotPresent
    }

    pub fn power_off(&mut self) {
        self.platform.set_power(PowerState::Off);
        self.power = PowerState::Off;
        self.state.detected = false;
        self.state.zoom = Zoom::MIN;
        self.transition(CaptureState::Invalid);
        info!("sensor powered off");
    }

    pub fn standby(&mut self) -> Result<(), PowerError<BUS::Error>> {
        self.forward_power(PowerState::Standby)
    }

    pub fn resume(&mut self) -> Result<(), PowerError<BUS::Error>> {
        self.forward_power(PowerState::Resume)
    }

    fn forward_power(&mut self, state: PowerState) -> Result<(), PowerError<BUS::Error>> {
        if self.power == PowerState::Off {
            return Err(PowerError::NotPowered);
        }
        self.platform.set_power(state);
        self.power = state;
        info!("power {:?}", state);
        Ok(())
    }

    fn require_detected(&self) -> Result<(), PowerError<BUS::Error>> {
        if self.state.detected {
            Ok(())
        } else {
            Err(PowerError::NotPowered)
        }
    }

    /// Program the sensor for the stored settings.
    ///
    /// An armed data-line check takes over: the test pattern is programmed
    /// instead and the check is disarmed. The capture state is left alone.
    pub fn initialize(&mut self) -> Result<(), ProgramError<BUS::Error>> {
        if self.state.check_dataline {
            self.program(&tables::DATALINE)?;
            self.state.check_dataline = false;
            info!("data-line test pattern enabled");
            return Ok(());
        }

        let mode = self.state.mode;
        self.program(tables::preview(self.state.preview_size))?;
        if self.state.selected == StreamState::Preview {
            self.program(tables::frame_rate(mode, self.state.fps))?;
        }
        self.program(tables::exposure(mode, self.state.exposure_bias))?;
        Ok(())
    }

    /// Program the preview window. Re-entering preview does nothing.
    pub fn enter_preview(&mut self) -> Result<(), PowerError<BUS::Error>> {
        self.require_detected()?;
        if self.state.capture_state == CaptureState::Preview {
            return Ok(());
        }
        self.program(tables::preview(self.state.preview_size))?;
        self.transition(CaptureState::Preview);
        Ok(())
    }

    /// Program the capture window. Re-entering capture does nothing.
    pub fn enter_capture(&mut self) -> Result<(), PowerError<BUS::Error>> {
        self.require_detected()?;
        if self.state.capture_state == CaptureState::Capture {
            return Ok(());
        }
        self.program(tables::capture(self.state.capture_size))?;
        self.transition(CaptureState::Capture);
        Ok(())
    }

    /// Enter whichever state the caller selected
    pub fn stream_on(&mut self) -> Result<(), PowerError<BUS::Error>> {
        match self.state.selected {
            StreamState::Preview => self.enter_preview(),
            StreamState::Capture => self.enter_capture(),
        }
    }

    pub fn stream_off(&mut self) -> Result<(), PowerError<BUS::Error>> {
        debug!("stream off");
        Ok(())
    }

    /// Drive the test pattern, then power cycle the sensor and bring it back
    /// to normal operation. `detected` is not changed, even on failure.
    pub fn run_dataline_test(&mut self) -> Result<(), PowerError<BUS::Error>> {
        self.require_detected()?;
        self.program(&tables::DATALINE)?;

        self.platform.set_power(PowerState::Off);
        self.bus.delay_ms(POWER_CYCLE_DELAY_MS);
        self.platform.set_power(PowerState::On);
        self.bus.delay_ms(POWER_CYCLE_DELAY_MS);
        self.power = PowerState::On;
        self.transition(CaptureState::Invalid);

        self.state.check_dataline = false;
        self.initialize()?;
        self.program(tables::power_on_init(self.state.mode))?;
        info!("data-line test finished");
        Ok(())
    }

    /// Reset every setting to its power-up default. Detection survives, since
    /// it reflects the hardware rather than a setting.
    pub fn init(&mut self) {
        let detected = self.state.detected;
        self.state = SensorState::default();
        self.state.detected = detected;
    }

    pub fn deinit(&mut self) {
        self.transition(CaptureState::Invalid);
    }

    /// Interface settings from the board, clocked at [`XCLK_HZ`]
    pub fn interface_params(&self) -> InterfaceParams {
        InterfaceParams {
            clock_hz: XCLK_HZ,
            ..self.platform.interface_params()
        }
    }

    pub fn private_data(&self) -> &P::PrivateData {
        self.platform.private_data()
    }

    fn transition(&mut self, next: CaptureState) {
        if self.state.capture_state != next {
            info!("capture state {:?} -> {:?}", self.state.capture_state, next);
        }
        self.state.previous_capture_state = self.state.capture_state;
        self.state.capture_state = next;
    }
}
