/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Compiled register presets.
//!
//! Register 0x03 selects the page for the writes that follow. Pages used here:
//! 0x00 (timing, window, test pattern), 0x10 (ISP: format, effects, brightness),
//! 0x13 (edge / noise), 0x20 (auto exposure), 0x22 (auto white balance).
//! Register 0x01 on page 0x00 is the sleep control: 0xf1 sleep, 0xf0 run.

use core::fmt;

use crate::registers::{RegisterBatch, RegisterEntry};
use crate::state::{
    CaptureSize, Effect, ExposureBias, Flip, FrameRate, Mode, PreviewSize, Pretty,
    WhiteBalance,
};

macro_rules! batch {
    ($ident:ident, $name:literal, [$(($address:literal, $value:literal)),* $(,)?]) => {
        pub static $ident: RegisterBatch = RegisterBatch::new(
            $name,
            &[$(RegisterEntry { address: $address, value: $value }),*],
        );
    };
}

// Power-on initialization

batch!(INIT, "SR030pc30_init_reg", [
    (0x03, 0x00), (0x01, 0xf1), (0x01, 0xf3), (0x01, 0xf1),
    (0x10, 0x00), (0x11, 0x90), (0x12, 0x04),
    (0x20, 0x00), (0x21, 0x04), (0x22, 0x00), (0x23, 0x04),
    (0x40, 0x01), (0x41, 0x58), (0x42, 0x00), (0x43, 0x14),
    (0x03, 0x10), (0x10, 0x03), (0x12, 0x30), (0x40, 0x00), (0x48, 0x80),
    (0x03, 0x13), (0x10, 0x0b), (0x20, 0x02),
    (0x03, 0x20), (0x10, 0x0c), (0x70, 0x38), (0x88, 0x02), (0x89, 0xbf),
    (0x8a, 0x20), (0x10, 0x9c),
    (0x03, 0x22), (0x10, 0xea),
    (0x03, 0x00), (0x01, 0xf0),
]);

// Fixed frame rate and a brighter AE target for video calls
batch!(INIT_VT, "SR030pc30_init_vt_reg", [
    (0x03, 0x00), (0x01, 0xf1), (0x01, 0xf3), (0x01, 0xf1),
    (0x10, 0x00), (0x11, 0x90), (0x12, 0x04),
    (0x20, 0x00), (0x21, 0x04), (0x22, 0x00), (0x23, 0x04),
    (0x40, 0x01), (0x41, 0x58), (0x42, 0x00), (0x43, 0x14),
    (0x03, 0x10), (0x10, 0x03), (0x12, 0x30), (0x40, 0x00), (0x48, 0x80),
    (0x03, 0x13), (0x10, 0x0b), (0x20, 0x04),
    (0x03, 0x20), (0x10, 0x0c), (0x2a, 0x90), (0x2b, 0xf5), (0x70, 0x40),
    (0x88, 0x01), (0x89, 0x7d), (0x8a, 0x78), (0x10, 0x8c),
    (0x03, 0x22), (0x10, 0xea),
    (0x03, 0x00), (0x01, 0xf0),
]);

// Colour bar pattern on the data lines, bypassing the optics
batch!(DATALINE, "SR030pc30_dataline", [
    (0x03, 0x00), (0x50, 0x05), (0x03, 0x10), (0x11, 0x03), (0x12, 0x30),
]);

// Output windows

batch!(PREVIEW_640X480, "SR030pc30_preview_640x480", [
    (0x03, 0x00), (0x01, 0xf1), (0x10, 0x00),
    (0x20, 0x00), (0x21, 0x04), (0x22, 0x00), (0x23, 0x04),
    (0x24, 0x01), (0x25, 0xe0), (0x26, 0x02), (0x27, 0x80),
    (0x03, 0x20), (0x10, 0x9c), (0x03, 0x00), (0x01, 0xf0),
]);

batch!(PREVIEW_320X240, "SR030pc30_preview_320x240", [
    (0x03, 0x00), (0x01, 0xf1), (0x10, 0x10),
    (0x20, 0x00), (0x21, 0x04), (0x22, 0x00), (0x23, 0x04),
    (0x24, 0x01), (0x25, 0xe0), (0x26, 0x02), (0x27, 0x80),
    (0x03, 0x20), (0x10, 0x9c), (0x03, 0x00), (0x01, 0xf0),
]);

batch!(PREVIEW_352X288, "SR030pc30_preview_352x288", [
    (0x03, 0x00), (0x01, 0xf1), (0x10, 0x00),
    (0x20, 0x00), (0x21, 0x60), (0x22, 0x00), (0x23, 0x94),
    (0x24, 0x01), (0x25, 0x20), (0x26, 0x01), (0x27, 0x60),
    (0x03, 0x20), (0x10, 0x9c), (0x03, 0x00), (0x01, 0xf0),
]);

batch!(PREVIEW_176X144, "SR030pc30_preview_176x144", [
    (0x03, 0x00), (0x01, 0xf1), (0x10, 0x10),
    (0x20, 0x00), (0x21, 0x60), (0x22, 0x00), (0x23, 0x94),
    (0x24, 0x01), (0x25, 0x20), (0x26, 0x01), (0x27, 0x60),
    (0x03, 0x20), (0x10, 0x9c), (0x03, 0x00), (0x01, 0xf0),
]);

// AE is held during capture so the still matches the last preview frame
batch!(CAPTURE_640X480, "SR030pc30_capture_640x480", [
    (0x03, 0x00), (0x01, 0xf1), (0x10, 0x00),
    (0x03, 0x20), (0x10, 0x1c), (0x03, 0x00), (0x01, 0xf0),
]);

batch!(CAPTURE_320X240, "SR030pc30_capture_320x240", [
    (0x03, 0x00), (0x01, 0xf1), (0x10, 0x10),
    (0x03, 0x20), (0x10, 0x1c), (0x03, 0x00), (0x01, 0xf0),
]);

// Exposure bias: brightness offset, sign-magnitude

batch!(EV_M4, "SR030pc30_ev_m4", [(0x03, 0x10), (0x40, 0xc0)]);
batch!(EV_M3, "SR030pc30_ev_m3", [(0x03, 0x10), (0x40, 0xb0)]);
batch!(EV_M2, "SR030pc30_ev_m2", [(0x03, 0x10), (0x40, 0xa0)]);
batch!(EV_M1, "SR030pc30_ev_m1", [(0x03, 0x10), (0x40, 0x90)]);
batch!(EV_DEFAULT, "SR030pc30_ev_default", [(0x03, 0x10), (0x40, 0x00)]);
batch!(EV_P1, "SR030pc30_ev_p1", [(0x03, 0x10), (0x40, 0x10)]);
batch!(EV_P2, "SR030pc30_ev_p2", [(0x03, 0x10), (0x40, 0x20)]);
batch!(EV_P3, "SR030pc30_ev_p3", [(0x03, 0x10), (0x40, 0x30)]);
batch!(EV_P4, "SR030pc30_ev_p4", [(0x03, 0x10), (0x40, 0x40)]);

// VT moves the AE target as well as the offset
batch!(EV_VT_M4, "SR030pc30_ev_vt_m4", [(0x03, 0x10), (0x40, 0xc0), (0x03, 0x20), (0x70, 0x28)]);
batch!(EV_VT_M3, "SR030pc30_ev_vt_m3", [(0x03, 0x10), (0x40, 0xb0), (0x03, 0x20), (0x70, 0x2c)]);
batch!(EV_VT_M2, "SR030pc30_ev_vt_m2", [(0x03, 0x10), (0x40, 0xa0), (0x03, 0x20), (0x70, 0x30)]);
batch!(EV_VT_M1, "SR030pc30_ev_vt_m1", [(0x03, 0x10), (0x40, 0x90), (0x03, 0x20), (0x70, 0x34)]);
batch!(EV_VT_DEFAULT, "SR030pc30_ev_vt_default", [(0x03, 0x10), (0x40, 0x00), (0x03, 0x20), (0x70, 0x40)]);
batch!(EV_VT_P1, "SR030pc30_ev_vt_p1", [(0x03, 0x10), (0x40, 0x10), (0x03, 0x20), (0x70, 0x44)]);
batch!(EV_VT_P2, "SR030pc30_ev_vt_p2", [(0x03, 0x10), (0x40, 0x20), (0x03, 0x20), (0x70, 0x48)]);
batch!(EV_VT_P3, "SR030pc30_ev_vt_p3", [(0x03, 0x10), (0x40, 0x30), (0x03, 0x20), (0x70, 0x4c)]);
batch!(EV_VT_P4, "SR030pc30_ev_vt_p4", [(0x03, 0x10), (0x40, 0x40), (0x03, 0x20), (0x70, 0x50)]);

// White balance: AWB control, then R/G/B gains (or gain limits for auto)

batch!(WB_AUTO, "SR030pc30_wb_auto", [(0x03, 0x22), (0x10, 0xea), (0x83, 0x50), (0x84, 0x20), (0x85, 0x50)]);
batch!(WB_DAYLIGHT, "SR030pc30_wb_sunny", [(0x03, 0x22), (0x10, 0x6a), (0x80, 0x3a), (0x81, 0x20), (0x82, 0x2e)]);
batch!(WB_CLOUDY, "SR030pc30_wb_cloudy", [(0x03, 0x22), (0x10, 0x6a), (0x80, 0x48), (0x81, 0x20), (0x82, 0x24)]);
batch!(WB_INCANDESCENT, "SR030pc30_wb_tungsten", [(0x03, 0x22), (0x10, 0x6a), (0x80, 0x22), (0x81, 0x20), (0x82, 0x58)]);
batch!(WB_FLUORESCENT, "SR030pc30_wb_fluorescent", [(0x03, 0x22), (0x10, 0x6a), (0x80, 0x2c), (0x81, 0x20), (0x82, 0x4a)]);

// Effects: special-effect controls, then fixed U/V

batch!(EFFECT_NONE, "SR030pc30_effect_none", [(0x03, 0x10), (0x11, 0x43), (0x12, 0x30), (0x44, 0x80), (0x45, 0x80)]);
batch!(EFFECT_GRAY, "SR030pc30_effect_gray", [(0x03, 0x10), (0x11, 0x03), (0x12, 0x33), (0x44, 0x80), (0x45, 0x80)]);
batch!(EFFECT_SEPIA, "SR030pc30_effect_sepia", [(0x03, 0x10), (0x11, 0x03), (0x12, 0x33), (0x44, 0x60), (0x45, 0xa3)]);
batch!(EFFECT_AQUA, "SR030pc30_effect_aqua", [(0x03, 0x10), (0x11, 0x03), (0x12, 0x33), (0x44, 0xb0), (0x45, 0x40)]);
batch!(EFFECT_NEGATIVE, "SR030pc30_effect_negative", [(0x03, 0x10), (0x11, 0x03), (0x12, 0x38), (0x44, 0x80), (0x45, 0x80)]);
batch!(EFFECT_RED, "SR030pc30_effect_red", [(0x03, 0x10), (0x11, 0x03), (0x12, 0x33), (0x44, 0x70), (0x45, 0xd0)]);
batch!(EFFECT_GREEN, "SR030pc30_effect_green", [(0x03, 0x10), (0x11, 0x03), (0x12, 0x33), (0x44, 0x30), (0x45, 0x50)]);

// Flip: readout direction bits in VDOCTL2

batch!(FLIP_NONE, "SR030pc30_FLIP_NONE_640x480", [(0x03, 0x00), (0x11, 0x90)]);
batch!(FLIP_MIRROR, "SR030pc30_FLIP_MIRROR_640x480", [(0x03, 0x00), (0x11, 0x91)]);
batch!(FLIP_WATER, "SR030pc30_FLIP_WATER_640x480", [(0x03, 0x00), (0x11, 0x92)]);
batch!(FLIP_WATER_MIRROR, "SR030pc30_FLIP_WATER_MIRROR_640x480", [(0x03, 0x00), (0x11, 0x93)]);

// Pretty: noise reduction strength and edge gain

batch!(PRETTY_NONE, "SR030pc30_pretty_none", [(0x03, 0x13), (0x10, 0x0b), (0x20, 0x02)]);
batch!(PRETTY_LEVEL1, "SR030pc30_pretty_level1", [(0x03, 0x13), (0x10, 0x2b), (0x20, 0x01)]);
batch!(PRETTY_LEVEL2, "SR030pc30_pretty_level2", [(0x03, 0x13), (0x10, 0x4b), (0x20, 0x01)]);
batch!(PRETTY_LEVEL3, "SR030pc30_pretty_level3", [(0x03, 0x13), (0x10, 0x6b), (0x20, 0x00)]);
batch!(PRETTY_VT_NONE, "SR030pc30_pretty_vt_none", [(0x03, 0x13), (0x10, 0x0b), (0x20, 0x04)]);
batch!(PRETTY_VT_LEVEL1, "SR030pc30_pretty_vt_level1", [(0x03, 0x13), (0x10, 0x2b), (0x20, 0x03)]);
batch!(PRETTY_VT_LEVEL2, "SR030pc30_pretty_vt_level2", [(0x03, 0x13), (0x10, 0x4b), (0x20, 0x02)]);
batch!(PRETTY_VT_LEVEL3, "SR030pc30_pretty_vt_level3", [(0x03, 0x13), (0x10, 0x6b), (0x20, 0x01)]);

// Frame rate: maximum exposure time, AE held while it changes

batch!(FPS_7, "SR030pc30_fps_7", [(0x03, 0x20), (0x10, 0x1c), (0x88, 0x05), (0x89, 0x7e), (0x8a, 0x40), (0x10, 0x9c)]);
batch!(FPS_10, "SR030pc30_fps_10", [(0x03, 0x20), (0x10, 0x1c), (0x88, 0x03), (0x89, 0xd0), (0x8a, 0x90), (0x10, 0x9c)]);
batch!(FPS_15, "SR030pc30_fps_15", [(0x03, 0x20), (0x10, 0x1c), (0x88, 0x02), (0x89, 0xbf), (0x8a, 0x20), (0x10, 0x9c)]);
batch!(FPS_VT_7, "SR030pc30_vt_fps_7", [(0x03, 0x20), (0x10, 0x0c), (0x2a, 0x90), (0x2b, 0xf5), (0x88, 0x05), (0x89, 0x7e), (0x8a, 0x40), (0x10, 0x8c)]);
batch!(FPS_VT_10, "SR030pc30_vt_fps_10", [(0x03, 0x20), (0x10, 0x0c), (0x2a, 0x90), (0x2b, 0xf5), (0x88, 0x03), (0x89, 0xd0), (0x8a, 0x90), (0x10, 0x8c)]);
batch!(FPS_VT_15, "SR030pc30_vt_fps_15", [(0x03, 0x20), (0x10, 0x0c), (0x2a, 0x90), (0x2b, 0xf5), (0x88, 0x01), (0x89, 0x7d), (0x8a, 0x78), (0x10, 0x8c)]);

/// Every compiled batch, in the order they appear in a tuning file
pub static ALL: &[&RegisterBatch] = &[
    &INIT, &INIT_VT, &DATALINE,
    &PREVIEW_640X480, &PREVIEW_320X240, &PREVIEW_352X288, &PREVIEW_176X144,
    &CAPTURE_640X480, &CAPTURE_320X240,
    &EV_M4, &EV_M3, &EV_M2, &EV_M1, &EV_DEFAULT, &EV_P1, &EV_P2, &EV_P3, &EV_P4,
    &EV_VT_M4, &EV_VT_M3, &EV_VT_M2, &EV_VT_M1, &EV_VT_DEFAULT,
    &EV_VT_P1, &EV_VT_P2, &EV_VT_P3, &EV_VT_P4,
    &WB_AUTO, &WB_DAYLIGHT, &WB_CLOUDY, &WB_INCANDESCENT, &WB_FLUORESCENT,
    &EFFECT_NONE, &EFFECT_GRAY, &EFFECT_SEPIA, &EFFECT_AQUA, &EFFECT_NEGATIVE,
    &EFFECT_RED, &EFFECT_GREEN,
    &FLIP_NONE, &FLIP_MIRROR, &FLIP_WATER, &FLIP_WATER_MIRROR,
    &PRETTY_NONE, &PRETTY_LEVEL1, &PRETTY_LEVEL2, &PRETTY_LEVEL3,
    &PRETTY_VT_NONE, &PRETTY_VT_LEVEL1, &PRETTY_VT_LEVEL2, &PRETTY_VT_LEVEL3,
    &FPS_7, &FPS_10, &FPS_15, &FPS_VT_7, &FPS_VT_10, &FPS_VT_15,
];

pub fn power_on_init(mode: Mode) -> &'static RegisterBatch {
    match mode {
        Mode::Vt => &INIT_VT,
        Mode::Camera | Mode::Camcorder => &INIT,
    }
}

pub fn preview(size: PreviewSize) -> &'static RegisterBatch {
    match size {
        PreviewSize::Vga => &PREVIEW_640X480,
        PreviewSize::Qvga => &PREVIEW_320X240,
        PreviewSize::Cif => &PREVIEW_352X288,
        PreviewSize::Qcif => &PREVIEW_176X144,
    }
}

pub fn capture(size: CaptureSize) -> &'static RegisterBatch {
    match size {
        CaptureSize::Vga => &CAPTURE_640X480,
        CaptureSize::Qvga => &CAPTURE_320X240,
    }
}

pub fn exposure(mode: Mode, bias: ExposureBias) -> &'static RegisterBatch {
    let vt = mode == Mode::Vt;
    match bias {
        ExposureBias::Minus2_0 => if vt { &EV_VT_M4 } else { &EV_M4 },
        ExposureBias::Minus1_5 => if vt { &EV_VT_M3 } else { &EV_M3 },
        ExposureBias::Minus1_0 => if vt { &EV_VT_M2 } else { &EV_M2 },
        ExposureBias::Minus0_5 => if vt { &EV_VT_M1 } else { &EV_M1 },
        ExposureBias::Zero => if vt { &EV_VT_DEFAULT } else { &EV_DEFAULT },
        ExposureBias::Plus0_5 => if vt { &EV_VT_P1 } else { &EV_P1 },
        ExposureBias::Plus1_0 => if vt { &EV_VT_P2 } else { &EV_P2 },
        ExposureBias::Plus1_5 => if vt { &EV_VT_P3 } else { &EV_P3 },
        ExposureBias::Plus2_0 => if vt { &EV_VT_P4 } else { &EV_P4 },
    }
}

pub fn white_balance(wb: WhiteBalance) -> &'static RegisterBatch {
    match wb {
        WhiteBalance::Auto => &WB_AUTO,
        WhiteBalance::Daylight => &WB_DAYLIGHT,
        WhiteBalance::Cloudy => &WB_CLOUDY,
        WhiteBalance::Incandescent => &WB_INCANDESCENT,
        WhiteBalance::Fluorescent => &WB_FLUORESCENT,
    }
}

pub fn effect(effect: Effect) -> &'static RegisterBatch {
    match effect {
        Effect::Off => &EFFECT_NONE,
        Effect::Grey => &EFFECT_GRAY,
        Effect::Sepia => &EFFECT_SEPIA,
        Effect::Aqua => &EFFECT_AQUA,
        Effect::Negative => &EFFECT_NEGATIVE,
        Effect::Red => &EFFECT_RED,
        Effect::Green => &EFFECT_GREEN,
    }
}

pub fn flip(flip: Flip) -> &'static RegisterBatch {
    match flip {
        Flip::None => &FLIP_NONE,
        Flip::Mirror => &FLIP_MIRROR,
        Flip::Water => &FLIP_WATER,
        Flip::WaterMirror => &FLIP_WATER_MIRROR,
    }
}

pub fn pretty(mode: Mode, pretty: Pretty) -> &'static RegisterBatch {
    let vt = mode == Mode::Vt;
    match pretty {
        Pretty::None => if vt { &PRETTY_VT_NONE } else { &PRETTY_NONE },
        Pretty::Level1 => if vt { &PRETTY_VT_LEVEL1 } else { &PRETTY_LEVEL1 },
        Pretty::Level2 => if vt { &PRETTY_VT_LEVEL2 } else { &PRETTY_LEVEL2 },
        Pretty::Level3 => if vt { &PRETTY_VT_LEVEL3 } else { &PRETTY_LEVEL3 },
    }
}

pub fn frame_rate(mode: Mode, rate: FrameRate) -> &'static RegisterBatch {
    let vt = mode == Mode::Vt;
    match rate {
        FrameRate::Fps7 => if vt { &FPS_VT_7 } else { &FPS_7 },
        FrameRate::Fps10 => if vt { &FPS_VT_10 } else { &FPS_10 },
        FrameRate::Fps15 => if vt { &FPS_VT_15 } else { &FPS_15 },
    }
}

/// Write every compiled batch as a tuning file, a starting point for
/// calibration on the device
pub fn write_tuning_file<W: fmt::Write>(out: &mut W) -> fmt::Result {
    writeln!(out, "/* SR030PC30 register tables */")?;
    for batch in ALL {
        writeln!(out)?;
        write!(out, "{}", batch)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::TuningTable;
    use crate::registers::Directive;

    #[test]
    fn batch_names_are_unique() {
        for (i, a) in ALL.iter().enumerate() {
            for b in &ALL[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }

    #[test]
    fn white_balance_batches_have_five_entries() {
        for wb in WhiteBalance::ALL {
            assert_eq!(white_balance(*wb).len(), 5, "{:?}", wb);
        }
    }

    #[test]
    fn vt_mode_selects_vt_tables() {
        assert_eq!(power_on_init(Mode::Vt).name(), "SR030pc30_init_vt_reg");
        assert_eq!(power_on_init(Mode::Camcorder).name(), "SR030pc30_init_reg");
        assert_eq!(
            exposure(Mode::Vt, ExposureBias::Plus2_0).name(),
            "SR030pc30_ev_vt_p4"
        );
        assert_eq!(
            frame_rate(Mode::Camera, FrameRate::Fps7).name(),
            "SR030pc30_fps_7"
        );
    }

    #[test]
    fn no_compiled_entry_looks_like_a_delay() {
        for batch in ALL {
            assert!(batch.entries().iter().all(|e| e.address != 0xff));
        }
    }

    #[test]
    fn exported_tuning_file_reproduces_every_batch() {
        let mut text = String::new();
        write_tuning_file(&mut text).unwrap();
        let table = TuningTable::new(text);

        for batch in ALL {
            let parsed = table.section(batch.name()).unwrap();
            let compiled: Vec<Directive> =
                batch.entries().iter().copied().map(Directive::Write).collect();
            assert_eq!(parsed, compiled, "{}", batch.name());
        }
    }
}
