/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Applying register batches to the sensor.
//!
//! A batch is always identified by its compiled [`RegisterBatch`]; the
//! source decides whether the compiled entries or the same-named tuning-file
//! section reach the bus.

use log::debug;

use crate::bus::RegisterBus;
use crate::error::ProgramError;
use crate::registers::{Directive, RegisterBatch};
use crate::tuning::TuningLoader;

/// Where register batches come from; chosen when the driver is built
pub trait BatchSource {
    /// Write `batch` to the sensor in order, stopping at the first failure.
    /// Entries written before the failure stay written.
    fn apply<B: RegisterBus>(
        &mut self,
        bus: &mut B,
        batch: &RegisterBatch,
    ) -> Result<(), ProgramError<B::Error>>;
}

/// Binary mode: the tables compiled into the driver
#[derive(Debug, Default, Clone, Copy)]
pub struct CompiledTables;

impl BatchSource for CompiledTables {
    fn apply<B: RegisterBus>(
        &mut self,
        bus: &mut B,
        batch: &RegisterBatch,
    ) -> Result<(), ProgramError<B::Error>> {
        debug!("apply {} ({} entries, compiled)", batch.name(), batch.len());
        for (index, entry) in batch.entries().iter().enumerate() {
            bus.write_byte(entry.address, entry.value)
                .map_err(|cause| ProgramError::BusFailure {
                    batch: batch.name(),
                    index,
                    cause,
                })?;
        }
        Ok(())
    }
}

/// Tuning mode: batches are read from a calibration file on every
/// application, so edits take effect without rebuilding
#[derive(Debug)]
pub struct TuningFile<L> {
    loader: L,
}

impl<L: TuningLoader> TuningFile<L> {
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn into_loader(self) -> L {
        self.loader
    }
}

impl<L: TuningLoader> BatchSource for TuningFile<L> {
    fn apply<B: RegisterBus>(
        &mut self,
        bus: &mut B,
        batch: &RegisterBatch,
    ) -> Result<(), ProgramError<B::Error>> {
        let directives = self.loader.load()?.section(batch.name())?;
        debug!(
            "apply {} ({} directives, tuning file)",
            batch.name(),
            directives.len()
        );

        for (index, directive) in directives.into_iter().enumerate() {
            match directive {
                Directive::Delay(ms) => bus.delay_ms(u32::from(ms)),
                Directive::Write(entry) => bus
                    .write_byte(entry.address, entry.value)
                    .map_err(|cause| ProgramError::BusFailure {
                        batch: batch.name(),
                        index,
                        cause,
                    })?,
            }
        }
        Ok(())
    }
}
