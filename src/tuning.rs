/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Runtime register tables parsed from a calibration header.
//!
//! The file is the same C header the compiled tables come from, edited on the
//! device while tuning. Each batch is looked up by name:
//!
//! ```text
//! unsigned short SR030pc30_wb_auto[] = {
//! 0x0322,   // page 22
//! 0xff0a,   // 10 ms
//! 0x10ea,
//! };
//! ```

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::error::TuningError;
use crate::registers::Directive;

/// Where the calibration header lives on the reference board
pub const DEFAULT_TUNING_PATH: &str = "/mnt/sdcard/SR030pc30.h";

const SECTION_END: &str = "};";

/// The raw text of one loaded tuning file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuningTable {
    text: String,
}

impl TuningTable {
    pub fn new(text: String) -> Self {
        Self { text }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parse the section named `name` into directives, in file order
    pub fn section(&self, name: &str) -> Result<Vec<Directive>, TuningError> {
        let start = find_header(&self.text, name).ok_or_else(|| {
            TuningError::SectionNotFound {
                name: name.to_string(),
            }
        })?;
        let rest = &self.text[start..];
        let end = rest.find(SECTION_END).ok_or_else(|| TuningError::Unterminated {
            name: name.to_string(),
        })?;

        let mut directives = Vec::new();
        let mut offset = start;
        for line in rest[..end].split_inclusive('\n') {
            let code = match line.find("//") {
                Some(comment) => &line[..comment],
                None => line,
            };
            parse_words(code, offset, name, &mut directives)?;
            offset += line.len();
        }
        Ok(directives)
    }
}

/// Byte offset just past the first occurrence of `name` that declares a
/// table: a whole identifier followed by `[`, `=` or `{`. Mentions of the
/// name in comments or inside longer identifiers are skipped.
fn find_header(text: &str, name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }
    text.match_indices(name).find_map(|(index, _)| {
        let end = index + name.len();
        let before = text[..index].chars().next_back();
        let after = text[end..].trim_start().chars().next();
        let declares = matches!(after, Some('[') | Some('=') | Some('{'));
        if before.map_or(false, is_ident) || !declares {
            None
        } else {
            Some(end)
        }
    })
}

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn parse_words(
    code: &str,
    base: usize,
    name: &str,
    out: &mut Vec<Directive>,
) -> Result<(), TuningError> {
    for (index, _) in code.match_indices("0x") {
        let malformed = || TuningError::MalformedToken {
            name: name.to_string(),
            offset: base + index,
        };
        let digits = &code[index + 2..];
        let len = digits
            .bytes()
            .take_while(|b| b.is_ascii_hexdigit())
            .count();
        if len > 4 {
            return Err(malformed());
        }
        let word = u16::from_str_radix(&digits[..len], 16).map_err(|_| malformed())?;
        out.push(Directive::from_word(word));
    }
    Ok(())
}

/// Fetches the tuning file text, once per batch application
pub trait TuningLoader {
    fn load(&mut self) -> Result<TuningTable, TuningError>;
}

impl<F> TuningLoader for F
where
    F: FnMut() -> Result<String, TuningError>,
{
    fn load(&mut self) -> Result<TuningTable, TuningError> {
        self().map(TuningTable::new)
    }
}

/// Reads the tuning file from the filesystem
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct FileTuning {
    path: std::path::PathBuf,
}

#[cfg(feature = "std")]
impl FileTuning {
    pub fn new<P: Into<std::path::PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(feature = "std")]
impl Default for FileTuning {
    fn default() -> Self {
        Self::new(DEFAULT_TUNING_PATH)
    }
}

#[cfg(feature = "std")]
impl TuningLoader for FileTuning {
    fn load(&mut self) -> Result<TuningTable, TuningError> {
        let text = std::fs::read_to_string(&self.path).map_err(|err| {
            log::warn!("tuning file {} unreadable: {}", self.path.display(), err);
            TuningError::Unavailable
        })?;
        log::debug!("tuning file {}: {} bytes", self.path.display(), text.len());
        Ok(TuningTable::new(text))
    }
}
