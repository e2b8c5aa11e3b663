//! Length-coded integers, strings and buffers.
//!
//! MySQL uses a variable-length integer encoding:
//! - 0x00-0xFA: the value itself
//! - 0xFB: SQL NULL
//! - 0xFC + 2 bytes: values up to 2^16 - 1
//! - 0xFD + 3 bytes: values up to 2^24 - 1
//! - 0xFE + 8 bytes: values up to 2^64 - 1
//! - 0xFF: never valid as a length-coded tag

#![allow(clippy::cast_possible_truncation)]

use crate::error::{ProtocolError, ProtocolErrorKind, Result};
use crate::protocol::{Encoding, NULL_MARKER, Packet, PacketWriter, Wide64};

/// Number of bytes `write_length_coded_number(value)` emits.
pub fn length_coded_number_len(value: u64) -> usize {
    if value < 0xFB {
        1
    } else if value <= 0xFFFF {
        3
    } else if value <= 0xFF_FFFF {
        4
    } else {
        9
    }
}

/// Number of bytes a length-coded string or buffer of `len` bytes occupies.
pub fn length_coded_string_len(len: usize) -> usize {
    length_coded_number_len(len as u64) + len
}

impl<'a> Packet<'a> {
    /// Read a length-coded integer, `None` for SQL NULL.
    ///
    /// The 8-byte form honors `signed` and, when `big_number_strings` is set,
    /// returns values beyond the packet's exact-integer limit as decimal strings.
    pub fn read_length_coded_number(
        &mut self,
        big_number_strings: bool,
        signed: bool,
    ) -> Result<Option<Wide64>> {
        let at = self.offset();
        let tag = self.read_u8()?;
        let value = match tag {
            0x00..=0xFA => Wide64::Unsigned(u64::from(tag)),
            NULL_MARKER => return Ok(None),
            0xFC => Wide64::Unsigned(u64::from(self.read_u16_le()?)),
            0xFD => Wide64::Unsigned(u64::from(self.read_u24_le()?)),
            0xFE => {
                let low = self.read_u32_le()?;
                let high = self.read_u32_le()?;
                if big_number_strings {
                    Wide64::from_words(low, high, signed, self.exact_integer_limit())
                } else {
                    Wide64::exact((u64::from(high) << 32) | u64::from(low), signed)
                }
            }
            0xFF => {
                return Err(
                    ProtocolError::new(ProtocolErrorKind::InvalidLengthTag(tag), at).into(),
                );
            }
        };
        Ok(Some(value))
    }

    /// Read a length-coded integer as a plain `u64`, `None` for SQL NULL.
    pub fn read_length_coded_u64(&mut self) -> Result<Option<u64>> {
        let at = self.offset();
        let tag = self.read_u8()?;
        match tag {
            0x00..=0xFA => Ok(Some(u64::from(tag))),
            NULL_MARKER => Ok(None),
            0xFC => self.read_u16_le().map(|v| Some(u64::from(v))),
            0xFD => self.read_u24_le().map(|v| Some(u64::from(v))),
            0xFE => self.read_u64_le().map(Some),
            0xFF => Err(ProtocolError::new(ProtocolErrorKind::InvalidLengthTag(tag), at).into()),
        }
    }

    /// Read a length-coded buffer without decoding it, `None` for SQL NULL.
    pub fn read_length_coded_buffer(&mut self) -> Result<Option<&'a [u8]>> {
        let at = self.offset();
        let Some(len) = self.read_length_coded_u64()? else {
            return Ok(None);
        };
        let Ok(len) = usize::try_from(len) else {
            return Err(ProtocolError::malformed(at, "length-coded length overflows usize").into());
        };
        self.read_bytes(len).map(Some)
    }

    /// Read a length-coded string, `None` for SQL NULL.
    pub fn read_length_coded_string(&mut self, encoding: Encoding) -> Result<Option<String>> {
        Ok(self
            .read_length_coded_buffer()?
            .map(|bytes| encoding.decode(bytes)))
    }
}

impl PacketWriter {
    /// Write a length-encoded integer using the narrowest form.
    pub fn write_length_coded_number(&mut self, value: u64) {
        if value < 0xFB {
            self.write_u8(value as u8);
        } else if value <= 0xFFFF {
            self.write_u8(0xFC);
            self.write_u16_le(value as u16);
        } else if value <= 0xFF_FFFF {
            self.write_u8(0xFD);
            self.write_u24_le(value as u32);
        } else {
            self.write_u8(0xFE);
            self.write_u64_le(value);
        }
    }

    /// Write the SQL NULL marker.
    pub fn write_null(&mut self) {
        self.write_u8(NULL_MARKER);
    }

    /// Write a length-encoded string.
    pub fn write_length_coded_string(&mut self, s: &str, encoding: Encoding) {
        let bytes = encoding.encode(s);
        self.write_length_coded_buffer(&bytes);
    }

    /// Write a length-encoded byte slice.
    pub fn write_length_coded_buffer(&mut self, data: &[u8]) {
        self.write_length_coded_number(data.len() as u64);
        self.write_bytes(data);
    }
}
