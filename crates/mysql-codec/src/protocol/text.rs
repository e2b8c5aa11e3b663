//! Text protocol fields.
//!
//! Rows from COM_QUERY carry every value as a length-coded ASCII string;
//! these reads convert them to the same types the binary protocol yields.

use std::str::FromStr;

use crate::config::Timezone;
use crate::error::{ProtocolError, Result};
use crate::protocol::{DateTimeParts, DateTimeValue, Packet, TimeParts, Wide64};

/// Parse `YYYY-MM-DD[ HH:MM:SS[.f{1,6}]]`. `T` is accepted as separator.
pub fn parse_date_time(text: &str) -> Option<DateTimeParts> {
    let (date, time) = match text.split_once([' ', 'T']) {
        Some((date, time)) => (date, Some(time)),
        None => (text, None),
    };
    let mut parts = DateTimeParts::default();
    let mut ymd = date.split('-');
    parts.year = fixed_digits(ymd.next()?, 4)?;
    parts.month = fixed_digits(ymd.next()?, 2)?;
    parts.day = fixed_digits(ymd.next()?, 2)?;
    if ymd.next().is_some() {
        return None;
    }
    if let Some(time) = time {
        let (hms, fraction) = match time.split_once('.') {
            Some((hms, fraction)) => (hms, Some(fraction)),
            None => (time, None),
        };
        let mut fields = hms.split(':');
        parts.hour = fixed_digits(fields.next()?, 2)?;
        parts.minute = fixed_digits(fields.next()?, 2)?;
        parts.second = fixed_digits(fields.next()?, 2)?;
        if fields.next().is_some() {
            return None;
        }
        if let Some(fraction) = fraction {
            if fraction.is_empty() || fraction.len() > 6 {
                return None;
            }
            parts.microsecond = fixed_digits(&format!("{fraction:0<6}"), 6)?;
        }
    }
    Some(parts)
}

fn fixed_digits<T: FromStr>(field: &str, width: usize) -> Option<T> {
    if field.len() != width || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

impl<'a> Packet<'a> {
    /// Read a length-coded field as ASCII text, `None` for SQL NULL.
    fn read_text_field(&mut self) -> Result<Option<(usize, &'a str)>> {
        let at = self.offset();
        let Some(bytes) = self.read_length_coded_buffer()? else {
            return Ok(None);
        };
        match std::str::from_utf8(bytes) {
            Ok(text) => Ok(Some((at, text))),
            Err(_) => {
                Err(ProtocolError::malformed(at, "numeric or temporal field is not ASCII").into())
            }
        }
    }

    /// Read a textual integer column.
    ///
    /// With `big_number_strings`, magnitudes beyond the packet's exact-integer
    /// limit come back as [`Wide64::Decimal`]. Digits that overflow 64 bits
    /// are always returned as a decimal string.
    pub fn read_text_integer(
        &mut self,
        signed: bool,
        big_number_strings: bool,
    ) -> Result<Option<Wide64>> {
        let limit = self.exact_integer_limit();
        let Some((at, text)) = self.read_text_field()? else {
            return Ok(None);
        };
        let digits = match text.strip_prefix('-') {
            Some(digits) if signed => digits,
            Some(_) => "",
            None => text,
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(
                ProtocolError::malformed(at, format!("invalid integer text {text:?}")).into(),
            );
        }
        let exact = if signed {
            text.parse::<i64>().ok().map(Wide64::Signed)
        } else {
            text.parse::<u64>().ok().map(Wide64::Unsigned)
        };
        let value = match exact {
            Some(value) if big_number_strings => value.limited(limit),
            Some(value) => value,
            None => Wide64::Decimal(text.to_string()),
        };
        Ok(Some(value))
    }

    /// Read a textual FLOAT/DOUBLE column.
    pub fn read_text_float(&mut self) -> Result<Option<f64>> {
        let Some((at, text)) = self.read_text_field()? else {
            return Ok(None);
        };
        text.parse().map(Some).map_err(|_| {
            ProtocolError::malformed(at, format!("invalid float text {text:?}")).into()
        })
    }

    /// Read a textual DATE/DATETIME/TIMESTAMP composed in `timezone`.
    pub fn read_text_date_time(&mut self, timezone: &Timezone) -> Result<Option<DateTimeValue>> {
        let Some((at, text)) = self.read_text_field()? else {
            return Ok(None);
        };
        let Some(parts) = parse_date_time(text) else {
            return Err(ProtocolError::malformed(at, format!("invalid date text {text:?}")).into());
        };
        Ok(Some(parts.compose(timezone)))
    }

    /// Read a textual TIME column.
    pub fn read_text_time(&mut self) -> Result<Option<TimeParts>> {
        let Some((at, text)) = self.read_text_field()? else {
            return Ok(None);
        };
        text.parse()
            .map(Some)
            .map_err(|_| ProtocolError::malformed(at, format!("invalid time text {text:?}")).into())
    }
}
