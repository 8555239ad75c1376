/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

use core::fmt;

/// A tuning-file word with this high byte is a delay, not a register write
pub const DELAY_MARKER: u8 = 0xFF;

/// One register write: the sensor has 8-bit registers behind an 8-bit
/// address, stored in tables as a packed 16-bit word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterEntry {
    pub address: u8,
    pub value: u8,
}

impl RegisterEntry {
    pub const fn new(address: u8, value: u8) -> Self {
        Self { address, value }
    }

    /// Split a packed word: high byte address, low byte value
    pub const fn from_word(word: u16) -> Self {
        Self::new((word >> 8) as u8, (word & 0xFF) as u8)
    }

    pub const fn word(&self) -> u16 {
        ((self.address as u16) << 8) | self.value as u16
    }
}

/// One step of a parsed tuning-file section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Write(RegisterEntry),
    /// Sleep for this many milliseconds
    Delay(u8),
}

impl Directive {
    pub fn from_word(word: u16) -> Self {
        let entry = RegisterEntry::from_word(word);
        if entry.address == DELAY_MARKER {
            Directive::Delay(entry.value)
        } else {
            Directive::Write(entry)
        }
    }
}

/// A named, ordered, read-only register preset.
///
/// The name doubles as the section header in a tuning file.
#[derive(Debug, PartialEq, Eq)]
pub struct RegisterBatch {
    name: &'static str,
    entries: &'static [RegisterEntry],
}

impl RegisterBatch {
    pub const fn new(name: &'static str, entries: &'static [RegisterEntry]) -> Self {
        Self { name, entries }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn entries(&self) -> &'static [RegisterEntry] {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Renders the batch as a tuning-file section
impl fmt::Display for RegisterBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "unsigned short {}[] = {{", self.name)?;
        for entry in self.entries {
            writeln!(f, "0x{:04x},", entry.word())?;
        }
        writeln!(f, "}};")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_packs_address_high() {
        let entry = RegisterEntry::from_word(0x2270);
        assert_eq!(entry.address, 0x22);
        assert_eq!(entry.value, 0x70);
        assert_eq!(entry.word(), 0x2270);
    }

    #[test]
    fn ff_high_byte_is_a_delay() {
        assert_eq!(Directive::from_word(0xff0a), Directive::Delay(10));
        assert_eq!(
            Directive::from_word(0xfe0a),
            Directive::Write(RegisterEntry::new(0xfe, 0x0a))
        );
    }

    #[test]
    fn renders_as_tuning_section() {
        static ENTRIES: [RegisterEntry; 2] =
            [RegisterEntry::new(0x03, 0x00), RegisterEntry::new(0x01, 0xf1)];
        let batch = RegisterBatch::new("SR030pc30_sleep", &ENTRIES);
        assert_eq!(
            batch.to_string(),
            "unsigned short SR030pc30_sleep[] = {\n0x0300,\n0x01f1,\n};\n"
        );
    }
}
