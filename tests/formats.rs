/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

mod common;

use common::{driver, entries, powered, FakeSensor};
use sr030pc30_i2c::control::ControlId;
use sr030pc30_i2c::state::{CaptureSize, Fraction, FrameRate, Mode, PreviewSize};
use sr030pc30_i2c::{
    tables, CaptureState, FormatError, PixelFormat, ProgramError, StreamParams, StreamState,
};

#[test]
fn every_listed_size_negotiates() {
    let sensor = FakeSensor::new();
    let (mut driver, _) = powered(&sensor);

    for &state in &[StreamState::Preview, StreamState::Capture] {
        driver
            .set_control(ControlId::State.raw(), state.value())
            .unwrap();
        for size in driver.enumerate_frame_sizes(state) {
            for &pixel_format in &[PixelFormat::Uyvy, PixelFormat::Yuyv] {
                let tried = driver
                    .try_format(size.width, size.height, pixel_format)
                    .unwrap();
                let set = driver
                    .set_format(size.width, size.height, pixel_format)
                    .unwrap();
                assert_eq!(tried, set);
                assert_eq!(set.bytes_per_line, size.width * 2);
                assert_eq!(set.image_size, set.bytes_per_line * size.height);
                assert_eq!(driver.get_format(), set);
            }
        }
    }
}

#[test]
fn try_format_does_not_commit() {
    let sensor = FakeSensor::new();
    let (mut driver, _) = powered(&sensor);
    let before = driver.get_format();

    let tried = driver.try_format(176, 144, PixelFormat::Uyvy).unwrap();
    assert_eq!((tried.width, tried.height), (176, 144));
    assert_eq!(driver.get_format(), before);
    assert_eq!(driver.state().preview_size, PreviewSize::Vga);
}

#[test]
fn unlisted_size_is_rejected_without_change() {
    let sensor = FakeSensor::new();
    let (mut driver, _) = powered(&sensor);
    driver.set_format(320, 240, PixelFormat::Yuyv).unwrap();
    let before = driver.state().clone();
    sensor.clear_writes();

    assert!(matches!(
        driver.set_format(800, 600, PixelFormat::Yuyv),
        Err(FormatError::UnsupportedSize {
            width: 800,
            height: 600
        })
    ));
    // 176x144 is a preview size only
    driver.set_control(ControlId::State.raw(), 1).unwrap();
    assert!(matches!(
        driver.try_format(176, 144, PixelFormat::Yuyv),
        Err(FormatError::UnsupportedSize { .. })
    ));

    assert_eq!(driver.get_format(), before.current_format);
    assert_eq!(driver.state().preview_size, before.preview_size);
    assert!(sensor.writes().is_empty());
}

#[test]
fn first_capture_negotiation_initializes_the_sensor() {
    let sensor = FakeSensor::new();
    let (mut driver, _) = powered(&sensor);
    driver
        .set_control(ControlId::State.raw(), StreamState::Capture.value())
        .unwrap();
    assert_eq!(driver.state().capture_state, CaptureState::Invalid);

    let format = driver.set_format(640, 480, PixelFormat::Yuyv).unwrap();

    assert_eq!(format.bytes_per_line, 1280);
    assert_eq!(format.image_size, 614_400);
    let mut expected = entries(&tables::PREVIEW_640X480);
    expected.extend(entries(&tables::EV_DEFAULT));
    assert_eq!(sensor.writes(), expected);
}

#[test]
fn negotiation_after_streaming_does_not_reinitialize() {
    let sensor = FakeSensor::new();
    let (mut driver, _) = powered(&sensor);
    driver.set_format(352, 288, PixelFormat::Uyvy).unwrap();
    driver.stream_on().unwrap();
    sensor.clear_writes();

    driver.set_format(640, 480, PixelFormat::Uyvy).unwrap();
    assert!(sensor.writes().is_empty());
    assert_eq!(driver.state().preview_size, PreviewSize::Vga);
}

#[test]
fn failed_initialization_restores_sizes() {
    let sensor = FakeSensor::new();
    let (mut driver, _) = powered(&sensor);
    let before = driver.state().clone();
    sensor.fail_register(0x24);

    match driver.set_format(176, 144, PixelFormat::Yuyv) {
        Err(FormatError::InitFailed(ProgramError::BusFailure { batch, .. })) => {
            assert_eq!(batch, "SR030pc30_preview_176x144");
        }
        other => panic!("expected init failure, got {:?}", other),
    }
    assert_eq!(driver.state().preview_size, before.preview_size);
    assert_eq!(driver.get_format(), before.current_format);
}

#[test]
fn compressed_formats_use_fixed_buffers() {
    let sensor = FakeSensor::new();
    let (mut driver, _) = powered(&sensor);

    let format = driver.set_format(320, 240, PixelFormat::Jpeg).unwrap();
    assert_eq!((format.width, format.height), (320, 240));
    assert_eq!(format.bytes_per_line, 1280);
    assert_eq!(format.image_size, 614_400);
    assert_eq!(driver.state().preview_size, PreviewSize::Qvga);
}

#[test]
fn compressed_capture_keeps_the_negotiated_size() {
    let sensor = FakeSensor::new();
    let (mut driver, _) = powered(&sensor);
    driver
        .set_control(ControlId::State.raw(), StreamState::Capture.value())
        .unwrap();

    let format = driver.set_format(320, 240, PixelFormat::Jpeg).unwrap();

    assert_eq!(driver.state().capture_size, CaptureSize::Qvga);
    assert_eq!(driver.get_format(), format);
    assert_eq!((format.width, format.height), (320, 240));
    assert_eq!(format.image_size, 614_400);
}

#[test]
fn formats_are_enumerated_in_order() {
    let sensor = FakeSensor::new();
    let (driver, _) = driver(&sensor);
    let names: Vec<&str> = driver
        .enumerate_formats()
        .iter()
        .map(|f| f.description())
        .collect();
    assert_eq!(
        names,
        vec![
            "UYVY : Packed YUV422",
            "YUYV : Packed YUV422",
            "JPEG : Compressed",
            "MJPEG : Compressed"
        ]
    );
    assert_eq!(driver.enumerate_frame_sizes(StreamState::Capture).len(), 2);
}

#[test]
fn stream_params_set_rate_and_mode() {
    let sensor = FakeSensor::new();
    let (mut driver, _) = driver(&sensor);

    driver
        .set_stream_params(StreamParams {
            mode: Mode::Camcorder,
            state: StreamState::Preview,
            time_per_frame: Fraction::new(1, 7),
        })
        .unwrap();
    let params = driver.get_stream_params();
    assert_eq!(params.mode, Mode::Camcorder);
    assert_eq!(params.time_per_frame, Fraction::new(1, 7));
    assert_eq!(driver.state().fps, FrameRate::Fps7);
    assert_eq!(driver.state().skip_frames(), 2);

    driver
        .set_stream_params(StreamParams {
            mode: Mode::Camera,
            state: StreamState::Capture,
            time_per_frame: Fraction::new(0, 0),
        })
        .unwrap();
    assert_eq!(driver.state().fps, FrameRate::Fps15);
    assert_eq!(driver.get_stream_params().state, StreamState::Capture);
    assert_eq!(driver.state().skip_frames(), 1);
}

#[test]
fn unsupported_frame_interval_changes_nothing() {
    let sensor = FakeSensor::new();
    let (mut driver, _) = driver(&sensor);
    let before = driver.get_stream_params();

    for &(numerator, denominator) in &[(1, 30), (0, 15), (2, 15)] {
        assert!(matches!(
            driver.set_stream_params(StreamParams {
                mode: Mode::Vt,
                state: StreamState::Capture,
                time_per_frame: Fraction::new(numerator, denominator),
            }),
            Err(FormatError::UnsupportedFrameRate { .. })
        ));
    }
    assert_eq!(driver.get_stream_params(), before);
}

#[test]
fn preview_initialization_programs_the_frame_rate() {
    let sensor = FakeSensor::new();
    let (mut driver, _) = powered(&sensor);
    driver
        .set_stream_params(StreamParams {
            mode: Mode::Vt,
            state: StreamState::Preview,
            time_per_frame: Fraction::new(1, 10),
        })
        .unwrap();

    driver.try_format(640, 480, PixelFormat::Uyvy).unwrap();

    let mut expected = entries(&tables::PREVIEW_640X480);
    expected.extend(entries(&tables::FPS_VT_10));
    expected.extend(entries(&tables::EV_VT_DEFAULT));
    assert_eq!(sensor.writes(), expected);
}
