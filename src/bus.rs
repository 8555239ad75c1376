/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Two-wire register transport with bounded retry.
//!
//! The sensor occasionally misses a transaction, so every transfer is retried
//! a fixed number of times before the failure is reported.

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c::{Read, Write};
use log::warn;

use crate::error::BusError;

/// 7-bit bus address of the sensor
pub const DEFAULT_I2C_ADDRESS: u8 = 0x30;

/// Delay between attempts at one transfer
pub const POLL_TIME_MS: u32 = 10;

/// Register-level access to the sensor.
///
/// Implementations block the caller for the whole retry sequence.
pub trait RegisterBus {
    type Error;

    fn write_byte(
        &mut self,
        register: u8,
        value: u8,
    ) -> Result<(), BusError<Self::Error>>;

    fn read_byte(&mut self, register: u8) -> Result<u8, BusError<Self::Error>>;

    /// Sleep; used by tuning-file delay directives and power cycling
    fn delay_ms(&mut self, ms: u32);
}

/// How often a transfer is attempted, and how long to wait between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u8,
    delay_ms: u32,
}

impl RetryPolicy {
    /// `attempts` counts the first try; it is clamped to at least one.
    pub const fn new(attempts: u8, delay_ms: u32) -> Self {
        Self {
            attempts: if attempts == 0 { 1 } else { attempts },
            delay_ms,
        }
    }

    pub fn attempts(&self) -> u8 {
        self.attempts
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }
}

impl Default for RetryPolicy {
    /// One retry beyond the first attempt
    fn default() -> Self {
        Self::new(2, POLL_TIME_MS)
    }
}

/// Bus transport over a blocking embedded-hal I2C peripheral
pub struct Bus<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    retry: RetryPolicy,
}

impl<I2C, D, CommE> Bus<I2C, D>
where
    I2C: Write<Error = CommE> + Read<Error = CommE>,
    D: DelayMs<u32>,
{
    /// Create a new transport with an i2c address:
    /// May use DEFAULT_I2C_ADDRESS if in doubt.
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            retry: RetryPolicy::default(),
        }
    }

    pub fn default(i2c: I2C, delay: D) -> Self {
        Self::new(i2c, delay, DEFAULT_I2C_ADDRESS)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Give back the peripherals
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn attempt<T, F>(
        &mut self,
        register: u8,
        mut transfer: F,
    ) -> Result<T, BusError<CommE>>
    where
        F: FnMut(&mut I2C, u8) -> Result<T, CommE>,
    {
        let mut attempt = 1;
        loop {
            match transfer(&mut self.i2c, self.address) {
                Ok(value) => return Ok(value),
                Err(last) if attempt >= self.retry.attempts => {
                    return Err(BusError::Timeout {
                        register,
                        attempts: attempt,
                        last,
                    });
                }
                Err(_) => {
                    warn!(
                        "register {:#04x}: transfer {} of {} failed, retrying",
                        register, attempt, self.retry.attempts
                    );
                    self.delay.delay_ms(self.retry.delay_ms);
                    attempt += 1;
                }
            }
        }
    }
}

impl<I2C, D, CommE> RegisterBus for Bus<I2C, D>
where
    I2C: Write<Error = CommE> + Read<Error = CommE>,
    D: DelayMs<u32>,
{
    type Error = CommE;

    fn write_byte(
        &mut self,
        register: u8,
        value: u8,
    ) -> Result<(), BusError<CommE>> {
        let write_buf = [register, value];
        self.attempt(register, |i2c, address| i2c.write(address, &write_buf))
    }

    fn read_byte(&mut self, register: u8) -> Result<u8, BusError<CommE>> {
        // behaves like SCCB: address and data phases are separate transfers
        let cmd_buf = [register];
        self.attempt(register, |i2c, address| i2c.write(address, &cmd_buf))?;
        self.attempt(register, |i2c, address| {
            let mut recv_buf = [0u8];
            i2c.read(address, &mut recv_buf)?;
            Ok(recv_buf[0])
        })
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
