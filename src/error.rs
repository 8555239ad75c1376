/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Error types, one per layer.
//!
//! Everything above the tuning parser is generic over `E`, the error type of
//! the underlying bus implementation.

use alloc::string::String;
use thiserror::Error;

use crate::control::ControlId;

/// Bus transport errors
#[derive(Debug, Error)]
pub enum BusError<E> {
    /// Every attempt at the transfer failed; `last` is the final bus error
    #[error("register {register:#04x} did not respond after {attempts} attempts")]
    Timeout { register: u8, attempts: u8, last: E },
}

impl<E> BusError<E> {
    /// Register the failed transfer was addressed to
    pub fn register(&self) -> u8 {
        match self {
            BusError::Timeout { register, .. } => *register,
        }
    }
}

/// Tuning-file errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TuningError {
    #[error("tuning file could not be loaded")]
    Unavailable,

    #[error("tuning file has no section named {name}")]
    SectionNotFound { name: String },

    #[error("tuning section {name} has no closing `}};`")]
    Unterminated { name: String },

    #[error("tuning section {name} has a malformed token at byte {offset}")]
    MalformedToken { name: String, offset: usize },
}

/// Register batch programming errors
#[derive(Debug, Error)]
pub enum ProgramError<E> {
    /// A write failed; entries before `index` were already applied
    #[error("batch {batch} failed at entry {index}")]
    BusFailure {
        batch: &'static str,
        index: usize,
        #[source]
        cause: BusError<E>,
    },

    #[error(transparent)]
    Tuning(#[from] TuningError),
}

/// Power sequencing and capture-state errors
#[derive(Debug, Error)]
pub enum PowerError<E> {
    /// The identity read failed or returned an unexpected id
    #[error("sensor did not answer the identity read")]
    DeviceNotPresent,

    #[error("sensor is not powered on")]
    NotPowered,

    #[error("register programming failed during power sequencing")]
    BusFailure(#[from] ProgramError<E>),
}

/// Format negotiation errors
#[derive(Debug, Error)]
pub enum FormatError<E> {
    #[error("frame size {width}x{height} is not supported in this state")]
    UnsupportedSize { width: u32, height: u32 },

    #[error("frame interval {numerator}/{denominator} is not supported")]
    UnsupportedFrameRate { numerator: u32, denominator: u32 },

    #[error("sensor initialization failed")]
    InitFailed(#[source] ProgramError<E>),
}

/// Control dispatch errors
#[derive(Debug, Error)]
pub enum ControlError<E> {
    #[error("control {0:#010x} is not supported")]
    UnsupportedControl(u32),

    #[error("{id:?} value {value} is outside [{minimum}, {maximum}]")]
    OutOfRange {
        id: ControlId,
        value: i32,
        minimum: i32,
        maximum: i32,
    },

    #[error("control register batch could not be written")]
    Program(#[from] ProgramError<E>),

    #[error("control needs a powered, detected sensor")]
    Power(#[from] PowerError<E>),
}
