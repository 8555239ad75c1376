/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Pixel formats, frame geometry and stream parameters.

use core::convert::TryFrom;

use log::{debug, warn};

use crate::bus::RegisterBus;
use crate::error::FormatError;
use crate::power::Platform;
use crate::program::BatchSource;
use crate::state::{
    CaptureSize, CaptureState, Fraction, FrameRate, Mode, PreviewSize, StreamState,
};
use crate::Sr030pc30;

/// Compressed buffers are always sized for this frame, whatever was requested
pub const JPEG_CAPTURE_WIDTH: u32 = 640;
pub const JPEG_CAPTURE_HEIGHT: u32 = 480;

/// Bytes per pixel of the packed 4:2:2 formats
const YUV422_BYTES_PER_PIXEL: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Sizes available while previewing, indexed by [`PreviewSize`]
pub const PREVIEW_SIZES: [FrameSize; 4] = [
    FrameSize::new(640, 480),
    FrameSize::new(320, 240),
    FrameSize::new(352, 288),
    FrameSize::new(176, 144),
];

/// Sizes available for still capture, indexed by [`CaptureSize`]
pub const CAPTURE_SIZES: [FrameSize; 2] =
    [FrameSize::new(640, 480), FrameSize::new(320, 240)];

const fn fourcc(code: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*code)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Uyvy,
    Yuyv,
    Jpeg,
    Mjpeg,
}

impl PixelFormat {
    /// Enumeration order of the formats the sensor produces
    pub const ALL: &'static [PixelFormat] = &[
        PixelFormat::Uyvy,
        PixelFormat::Yuyv,
        PixelFormat::Jpeg,
        PixelFormat::Mjpeg,
    ];

    pub const fn fourcc(self) -> u32 {
        match self {
            PixelFormat::Uyvy => fourcc(b"UYVY"),
            PixelFormat::Yuyv => fourcc(b"YUYV"),
            PixelFormat::Jpeg => fourcc(b"JPEG"),
            PixelFormat::Mjpeg => fourcc(b"MJPG"),
        }
    }

    pub fn from_fourcc(code: u32) -> Option<Self> {
        PixelFormat::ALL.iter().copied().find(|f| f.fourcc() == code)
    }

    pub fn description(self) -> &'static str {
        match self {
            PixelFormat::Uyvy => "UYVY : Packed YUV422",
            PixelFormat::Yuyv => "YUYV : Packed YUV422",
            PixelFormat::Jpeg => "JPEG : Compressed",
            PixelFormat::Mjpeg => "MJPEG : Compressed",
        }
    }

    pub fn is_compressed(self) -> bool {
        matches!(self, PixelFormat::Jpeg | PixelFormat::Mjpeg)
    }
}

/// Resolved output geometry for a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFormat {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub bytes_per_line: u32,
    pub image_size: u32,
}

impl FrameFormat {
    /// Geometry for `size`. Compressed formats keep the requested size but
    /// their buffers are always laid out for the fixed JPEG framing.
    pub fn for_size(size: FrameSize, pixel_format: PixelFormat) -> Self {
        let (line_pixels, lines) = if pixel_format.is_compressed() {
            (JPEG_CAPTURE_WIDTH, JPEG_CAPTURE_HEIGHT)
        } else {
            (size.width, size.height)
        };
        let bytes_per_line = line_pixels * YUV422_BYTES_PER_PIXEL;
        Self {
            width: size.width,
            height: size.height,
            pixel_format,
            bytes_per_line,
            image_size: bytes_per_line * lines,
        }
    }
}

/// Which table entry a requested size resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeSelection {
    Preview(PreviewSize),
    Capture(CaptureSize),
}

/// Find `width` x `height` in the size table for `state`
pub fn lookup_size(
    state: StreamState,
    width: u32,
    height: u32,
) -> Option<SizeSelection> {
    let wanted = FrameSize::new(width, height);
    match state {
        StreamState::Preview => PreviewSize::ALL
            .iter()
            .copied()
            .find(|size| size.frame_size() == wanted)
            .map(SizeSelection::Preview),
        StreamState::Capture => CaptureSize::ALL
            .iter()
            .copied()
            .find(|size| size.frame_size() == wanted)
            .map(SizeSelection::Capture),
    }
}

/// Stream configuration exchanged with the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamParams {
    pub mode: Mode,
    pub state: StreamState,
    pub time_per_frame: Fraction,
}

impl<BUS, P, S> Sr030pc30<BUS, P, S>
where
    BUS: RegisterBus,
    P: Platform,
    S: BatchSource,
{
    pub fn enumerate_formats(&self) -> &'static [PixelFormat] {
        PixelFormat::ALL
    }

    pub fn enumerate_frame_sizes(&self, state: StreamState) -> &'static [FrameSize] {
        match state {
            StreamState::Preview => &PREVIEW_SIZES,
            StreamState::Capture => &CAPTURE_SIZES,
        }
    }

    /// Validate a format against the selected stream without committing it.
    ///
    /// Runs the pending initialization if the sensor has not been programmed
    /// since power-on.
    pub fn try_format(
        &mut self,
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
    ) -> Result<FrameFormat, FormatError<BUS::Error>> {
        self.negotiate(width, height, pixel_format, false)
    }

    /// Validate and commit a format.
    ///
    /// On failure the stored sizes and the current format are left as they
    /// were.
    pub fn set_format(
        &mut self,
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
    ) -> Result<FrameFormat, FormatError<BUS::Error>> {
        self.negotiate(width, height, pixel_format, true)
    }

    pub fn get_format(&self) -> FrameFormat {
        self.state.current_format
    }

    fn negotiate(
        &mut self,
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
        commit: bool,
    ) -> Result<FrameFormat, FormatError<BUS::Error>> {
        let selection = lookup_size(self.state.selected, width, height).ok_or_else(|| {
            warn!(
                "{}x{} not offered for {:?}",
                width, height, self.state.selected
            );
            FormatError::<BUS::Error>::UnsupportedSize { width, height }
        })?;
        let format = FrameFormat::for_size(FrameSize::new(width, height), pixel_format);

        let saved = (self.state.preview_size, self.state.capture_size);
        if commit {
            match selection {
                SizeSelection::Preview(size) => self.state.preview_size = size,
                SizeSelection::Capture(size) => self.state.capture_size = size,
            }
        }

        if self.state.capture_state == CaptureState::Invalid {
            if let Err(err) = self.initialize() {
                self.state.preview_size = saved.0;
                self.state.capture_size = saved.1;
                return Err(FormatError::InitFailed(err));
            }
        }

        if commit {
            self.state.current_format = format;
            debug!(
                "format {}x{} {:?}, {} bytes",
                format.width, format.height, format.pixel_format, format.image_size
            );
        }
        Ok(format)
    }

    pub fn get_stream_params(&self) -> StreamParams {
        StreamParams {
            mode: self.state.mode,
            state: self.state.selected,
            time_per_frame: self.state.time_per_frame,
        }
    }

    /// Store mode, selected stream and frame interval. A 0/0 interval means
    /// the default 15 fps. Nothing is written to the sensor here; the frame
    /// rate is programmed by the next initialization.
    pub fn set_stream_params(
        &mut self,
        params: StreamParams,
    ) -> Result<(), FormatError<BUS::Error>> {
        let Fraction {
            numerator,
            denominator,
        } = params.time_per_frame;
        let fps = if numerator == 0 && denominator == 0 {
            FrameRate::Fps15
        } else {
            let unsupported = FormatError::UnsupportedFrameRate {
                numerator,
                denominator,
            };
            if numerator == 0 || denominator % numerator != 0 {
                return Err(unsupported);
            }
            i32::try_from(denominator / numerator)
                .ok()
                .and_then(|rate| FrameRate::try_from(rate).ok())
                .ok_or(unsupported)?
        };

        self.state.mode = params.mode;
        self.state.selected = params.state;
        self.state.fps = fps;
        self.state.time_per_frame = Fraction::per_second(fps);
        debug!(
            "stream params: {:?} {:?} {} fps",
            params.mode,
            params.state,
            fps.value()
        );
        Ok(())
    }
}
