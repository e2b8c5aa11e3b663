//! Character sets and text encodings.
//!
//! Column definitions carry a collation id; text fields are decoded with the
//! encoding that collation implies.

use std::borrow::Cow;

pub const LATIN1_GERMAN1_CI: u16 = 5;
pub const LATIN1_SWEDISH_CI: u16 = 8;
pub const ASCII_GENERAL_CI: u16 = 11;
pub const LATIN1_DANISH_CI: u16 = 15;
pub const LATIN1_GERMAN2_CI: u16 = 31;
pub const UTF8_GENERAL_CI: u16 = 33;
pub const UTF8MB4_GENERAL_CI: u16 = 45;
pub const LATIN1_BIN: u16 = 47;
pub const LATIN1_GENERAL_CI: u16 = 48;
pub const LATIN1_GENERAL_CS: u16 = 49;
pub const BINARY: u16 = 63;
pub const ASCII_BIN: u16 = 65;
pub const LATIN1_SPANISH_CI: u16 = 94;
pub const UTF8MB4_UNICODE_CI: u16 = 224;
pub const UTF8MB4_0900_AI_CI: u16 = 255;

/// Default charset for new connections (utf8mb4).
pub const DEFAULT_CHARSET: u16 = UTF8MB4_0900_AI_CI;

/// Text encoding used to turn wire bytes into strings and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
    Ascii,
}

impl Encoding {
    /// Map a collation id to the encoding of its character set.
    ///
    /// Unlisted ids (including `binary`) fall back to UTF-8.
    pub fn for_charset(id: u16) -> Self {
        match id {
            LATIN1_GERMAN1_CI | LATIN1_SWEDISH_CI | LATIN1_DANISH_CI | LATIN1_GERMAN2_CI
            | LATIN1_BIN | LATIN1_GENERAL_CI | LATIN1_GENERAL_CS | LATIN1_SPANISH_CI => {
                Encoding::Latin1
            }
            ASCII_GENERAL_CI | ASCII_BIN => Encoding::Ascii,
            _ => Encoding::Utf8,
        }
    }

    /// Decode bytes to a string. Invalid sequences become U+FFFD.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Encoding::Ascii => bytes
                .iter()
                .map(|&b| {
                    if b.is_ascii() {
                        char::from(b)
                    } else {
                        char::REPLACEMENT_CHARACTER
                    }
                })
                .collect(),
        }
    }

    /// Encode a string. Characters outside the charset become `?`.
    pub fn encode(self, s: &str) -> Cow<'_, [u8]> {
        match self {
            Encoding::Utf8 => Cow::Borrowed(s.as_bytes()),
            _ if s.is_ascii() => Cow::Borrowed(s.as_bytes()),
            Encoding::Latin1 => Cow::Owned(
                s.chars()
                    .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                    .collect(),
            ),
            Encoding::Ascii => Cow::Owned(
                s.chars()
                    .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                    .collect(),
            ),
        }
    }
}
