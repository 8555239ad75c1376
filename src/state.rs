/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! The mutable record of sensor settings.
//!
//! Every settable value is a small integer on the control surface; the enums
//! here carry those integers as their discriminants.

use core::convert::TryFrom;

use crate::format::{FrameFormat, PixelFormat, CAPTURE_SIZES, PREVIEW_SIZES};
use crate::format::FrameSize;

macro_rules! control_value {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(i32)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Value as seen on the control surface
            pub const fn value(self) -> i32 {
                self as i32
            }
        }

        impl TryFrom<i32> for $name {
            type Error = i32;

            fn try_from(value: i32) -> Result<Self, i32> {
                $(
                    if value == $value {
                        return Ok($name::$variant);
                    }
                )+
                Err(value)
            }
        }
    };
}

control_value!(
    /// What the sensor is being used for; VT (video telephony) has its own
    /// tuning
    Mode {
        Camera = 1,
        Camcorder = 2,
        Vt = 3,
    }
);

control_value!(
    /// Capture state the caller has asked for
    StreamState {
        Preview = 0,
        Capture = 1,
    }
);

control_value!(
    Effect {
        Off = 0,
        Grey = 1,
        Sepia = 2,
        Aqua = 3,
        Negative = 4,
        Red = 5,
        Green = 6,
    }
);

control_value!(
    /// Exposure compensation in half-stop steps
    ExposureBias {
        Minus2_0 = 0,
        Minus1_5 = 1,
        Minus1_0 = 2,
        Minus0_5 = 3,
        Zero = 4,
        Plus0_5 = 5,
        Plus1_0 = 6,
        Plus1_5 = 7,
        Plus2_0 = 8,
    }
);

control_value!(
    WhiteBalance {
        Auto = 0,
        Daylight = 1,
        Cloudy = 2,
        Incandescent = 3,
        Fluorescent = 4,
    }
);

control_value!(
    /// Skin smoothing strength
    Pretty {
        None = 0,
        Level1 = 1,
        Level2 = 2,
        Level3 = 3,
    }
);

control_value!(
    /// Readout orientation; "water" is the vertical flip
    Flip {
        None = 0,
        Mirror = 1,
        Water = 2,
        WaterMirror = 3,
    }
);

control_value!(
    FrameRate {
        Fps7 = 7,
        Fps10 = 10,
        Fps15 = 15,
    }
);

control_value!(
    /// Index into [`PREVIEW_SIZES`]
    PreviewSize {
        Vga = 0,
        Qvga = 1,
        Cif = 2,
        Qcif = 3,
    }
);

control_value!(
    /// Index into [`CAPTURE_SIZES`]
    CaptureSize {
        Vga = 0,
        Qvga = 1,
    }
);

impl PreviewSize {
    pub fn frame_size(self) -> FrameSize {
        PREVIEW_SIZES[self as usize]
    }
}

impl CaptureSize {
    pub fn frame_size(self) -> FrameSize {
        CAPTURE_SIZES[self as usize]
    }
}

/// Digital zoom from 1.00x to 4.00x in quarter steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Zoom(u8);

impl Zoom {
    pub const MIN: Zoom = Zoom(0);
    pub const MAX: Zoom = Zoom(12);

    pub fn value(self) -> i32 {
        self.0 as i32
    }

    /// Magnification in percent, 100 at 1.00x
    pub fn percent(self) -> u32 {
        100 + 25 * self.0 as u32
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Zoom::MIN
    }
}

impl TryFrom<i32> for Zoom {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, i32> {
        if value >= Zoom::MIN.value() && value <= Zoom::MAX.value() {
            Ok(Zoom(value as u8))
        } else {
            Err(value)
        }
    }
}

/// Contrast offset, -3 to +3
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Contrast(i8);

impl Contrast {
    pub const MIN: Contrast = Contrast(-3);
    pub const MAX: Contrast = Contrast(3);

    pub fn value(self) -> i32 {
        self.0 as i32
    }
}

impl TryFrom<i32> for Contrast {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, i32> {
        if value >= Contrast::MIN.value() && value <= Contrast::MAX.value() {
            Ok(Contrast(value as i8))
        } else {
            Err(value)
        }
    }
}

/// Frame interval in seconds, as numerator / denominator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    pub numerator: u32,
    pub denominator: u32,
}

impl Fraction {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn per_second(rate: FrameRate) -> Self {
        Self::new(1, rate.value() as u32)
    }
}

/// Where the sensor is in its preview/capture cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Powered on (or never streamed) and not yet programmed for a stream
    Invalid,
    Preview,
    Capture,
}

/// Live settings and geometry of the sensor.
///
/// There is one of these per sensor and it has no internal locking: callers
/// serialize access to the driver that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorState {
    pub mode: Mode,
    /// Declared by the caller; decides which size table applies
    pub selected: StreamState,
    pub capture_state: CaptureState,
    /// Capture state before the last transition, kept for diagnostics
    pub previous_capture_state: CaptureState,
    pub fps: FrameRate,
    pub time_per_frame: Fraction,
    pub preview_size: PreviewSize,
    pub capture_size: CaptureSize,
    pub zoom: Zoom,
    pub effect: Effect,
    pub exposure_bias: ExposureBias,
    pub contrast: Contrast,
    pub white_balance: WhiteBalance,
    pub pretty: Pretty,
    pub flip: Flip,
    pub detected: bool,
    /// When set, the next initialization programs the data-line test pattern
    pub check_dataline: bool,
    pub current_format: FrameFormat,
}

impl Default for SensorState {
    fn default() -> Self {
        let preview_size = PreviewSize::Vga;
        Self {
            mode: Mode::Camera,
            selected: StreamState::Preview,
            capture_state: CaptureState::Invalid,
            previous_capture_state: CaptureState::Invalid,
            fps: FrameRate::Fps15,
            time_per_frame: Fraction::per_second(FrameRate::Fps15),
            preview_size,
            capture_size: CaptureSize::Vga,
            zoom: Zoom::default(),
            effect: Effect::Off,
            exposure_bias: ExposureBias::Zero,
            contrast: Contrast::default(),
            white_balance: WhiteBalance::Auto,
            pretty: Pretty::None,
            flip: Flip::None,
            detected: false,
            check_dataline: false,
            current_format: FrameFormat::for_size(
                preview_size.frame_size(),
                PixelFormat::Yuyv,
            ),
        }
    }
}

impl SensorState {
    /// Frames to discard after switching streams: capture settles in one,
    /// a running preview in three, and a fresh preview needs about a third
    /// of a second for the overlay to come up.
    pub fn skip_frames(&self) -> u32 {
        match self.selected {
            StreamState::Capture => 1,
            StreamState::Preview => {
                if self.capture_state == CaptureState::Preview {
                    3
                } else {
                    self.fps.value() as u32 / 3
                }
            }
        }
    }

    /// Size the current geometry is taken from
    pub fn active_size(&self) -> FrameSize {
        match self.selected {
            StreamState::Preview => self.preview_size.frame_size(),
            StreamState::Capture => self.capture_size.frame_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_values_round_trip_through_discriminants() {
        assert_eq!(WhiteBalance::try_from(4), Ok(WhiteBalance::Fluorescent));
        assert_eq!(WhiteBalance::Fluorescent.value(), 4);
        assert_eq!(Mode::try_from(0), Err(0));
        assert_eq!(FrameRate::try_from(10), Ok(FrameRate::Fps10));
        assert_eq!(FrameRate::try_from(12), Err(12));
        assert_eq!(Effect::ALL.len(), 7);
    }

    #[test]
    fn zoom_is_quarter_steps() {
        assert_eq!(Zoom::MIN.percent(), 100);
        assert_eq!(Zoom::MAX.percent(), 400);
        assert_eq!(Zoom::try_from(13), Err(13));
    }

    #[test]
    fn contrast_is_signed() {
        assert_eq!(Contrast::try_from(-3).map(Contrast::value), Ok(-3));
        assert_eq!(Contrast::try_from(-4), Err(-4));
    }

    #[test]
    fn defaults_match_power_up() {
        let state = SensorState::default();
        assert_eq!(state.mode, Mode::Camera);
        assert_eq!(state.capture_state, CaptureState::Invalid);
        assert_eq!(state.fps, FrameRate::Fps15);
        assert!(!state.detected);
        assert_eq!(state.current_format.width, 640);
        assert_eq!(state.current_format.bytes_per_line, 1280);
    }

    #[test]
    fn skip_frames_depends_on_transition() {
        let mut state = SensorState::default();
        assert_eq!(state.skip_frames(), 5);
        state.capture_state = CaptureState::Preview;
        assert_eq!(state.skip_frames(), 3);
        state.selected = StreamState::Capture;
        assert_eq!(state.skip_frames(), 1);
    }
}
