//! DATE, DATETIME, TIMESTAMP and TIME in the binary protocol.
//!
//! Every temporal field starts with a length byte that selects which
//! components follow:
//!
//! | length | DATE/DATETIME                          | TIME                                 |
//! |--------|----------------------------------------|--------------------------------------|
//! | 0      | all zero                               | `00:00:00`                           |
//! | 4      | year(2) month day                      | -                                    |
//! | 7      | + hour minute second                   | -                                    |
//! | 8      | -                                      | sign days(4) hour minute second      |
//! | 11     | + microsecond(4)                       | -                                    |
//! | 12     | -                                      | + microsecond(4)                     |
//!
//! 0xFB in place of the length byte is SQL NULL.

#![allow(clippy::cast_possible_truncation)]

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Timelike, Utc,
};
use serde::{Serialize, Serializer};

use crate::config::Timezone;
use crate::error::{Error, Result};
use crate::protocol::{NULL_MARKER, Packet, PacketWriter};
use crate::types::FieldType;

/// Raw calendar fields of a DATE/DATETIME/TIMESTAMP value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTimeParts {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub microsecond: u32,
}

impl DateTimeParts {
    /// The `0000-00-00 00:00:00` value legacy SQL modes store for "no date".
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    fn naive(&self) -> Option<NaiveDateTime> {
        if self.microsecond >= 1_000_000 {
            return None;
        }
        let date = NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )?;
        let time = NaiveTime::from_hms_milli_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second),
            self.microsecond / 1000,
        )?;
        Some(date.and_time(time))
    }

    /// Compose the fields into a value in `timezone`.
    ///
    /// Microseconds are truncated to milliseconds. Fields that do not name a
    /// calendar instant (month 13, February 30) yield [`DateTimeValue::Invalid`].
    pub fn compose(&self, timezone: &Timezone) -> DateTimeValue {
        if self.is_zero() {
            return DateTimeValue::Zero;
        }
        let Some(naive) = self.naive() else {
            tracing::warn!(parts = %self, "date fields do not form a calendar date");
            return DateTimeValue::Invalid(*self);
        };
        let instant = match timezone {
            Timezone::Utc => Utc.from_utc_datetime(&naive).fixed_offset(),
            Timezone::Offset(offset) => offset
                .from_local_datetime(&naive)
                .single()
                .unwrap_or_else(|| offset.from_utc_datetime(&naive)),
            Timezone::Local => match Local.from_local_datetime(&naive).earliest() {
                Some(local) => local.fixed_offset(),
                // Wall-clock time skipped by a DST transition: keep the fields
                // and use the offset in force at that instant.
                None => {
                    let offset = Local.offset_from_utc_datetime(&naive).fix();
                    offset
                        .from_local_datetime(&naive)
                        .single()
                        .unwrap_or_else(|| offset.from_utc_datetime(&naive))
                }
            },
        };
        DateTimeValue::Instant(instant)
    }

    /// Render as `YYYY-MM-DD`, optionally followed by the time of day and up
    /// to `decimals` truncated fractional digits.
    fn render(&self, with_time: bool, decimals: usize, separator: char) -> String {
        let mut out = format!("{:04}-{:02}-{:02}", self.year, self.month, self.day);
        if with_time {
            out.push_str(&format!(
                "{separator}{:02}:{:02}:{:02}",
                self.hour, self.minute, self.second
            ));
            if decimals > 0 {
                let digits = format!("{:06}", self.microsecond);
                out.push('.');
                out.push_str(&digits[..decimals.min(digits.len())]);
            }
        }
        out
    }
}

impl fmt::Display for DateTimeParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let decimals = if self.microsecond == 0 { 0 } else { 6 };
        f.write_str(&self.render(true, decimals, ' '))
    }
}

/// A decoded DATE/DATETIME/TIMESTAMP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeValue {
    /// The all-zero date; distinct from the Unix epoch
    Zero,
    /// Non-zero fields that do not form a calendar instant
    Invalid(DateTimeParts),
    Instant(DateTime<FixedOffset>),
}

impl DateTimeValue {
    pub fn is_zero(&self) -> bool {
        matches!(self, DateTimeValue::Zero)
    }

    pub fn as_instant(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            DateTimeValue::Instant(dt) => Some(dt),
            _ => None,
        }
    }
}

impl fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateTimeValue::Zero => f.write_str("0000-00-00 00:00:00"),
            DateTimeValue::Invalid(parts) => write!(f, "{parts}"),
            DateTimeValue::Instant(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.3f %:z")),
        }
    }
}

impl Serialize for DateTimeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DateTimeValue::Zero => serializer.serialize_none(),
            DateTimeValue::Invalid(parts) => serializer.collect_str(parts),
            DateTimeValue::Instant(dt) => dt.serialize(serializer),
        }
    }
}

/// Fields of a TIME value. TIME is signed and spans more than a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeParts {
    pub negative: bool,
    pub days: u32,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub microseconds: u32,
}

impl TimeParts {
    pub fn is_zero(&self) -> bool {
        self.days == 0
            && self.hours == 0
            && self.minutes == 0
            && self.seconds == 0
            && self.microseconds == 0
    }

    /// Total hours including whole days.
    pub fn total_hours(&self) -> u64 {
        u64::from(self.days) * 24 + u64::from(self.hours)
    }

    /// Signed millisecond count; the sign is applied once to the folded total.
    #[allow(clippy::cast_possible_wrap)]
    pub fn to_millis(&self) -> i64 {
        let seconds = (self.total_hours() * 60 + u64::from(self.minutes)) * 60
            + u64::from(self.seconds);
        let millis = (seconds * 1000 + u64::from(self.microseconds / 1000)) as i64;
        if self.negative { -millis } else { millis }
    }

    /// Split a signed millisecond count into TIME fields.
    pub fn from_millis(millis: i64) -> Result<Self> {
        let magnitude = millis.unsigned_abs();
        let total_seconds = magnitude / 1000;
        let total_hours = total_seconds / 3600;
        let days = u32::try_from(total_hours / 24)
            .map_err(|_| Error::InvalidValue(format!("TIME of {millis} ms is out of range")))?;
        Ok(Self {
            negative: millis < 0,
            days,
            hours: (total_hours % 24) as u8,
            minutes: ((total_seconds / 60) % 60) as u8,
            seconds: (total_seconds % 60) as u8,
            microseconds: (magnitude % 1000) as u32 * 1000,
        })
    }
}

/// `[-]hh:mm:ss[.ffffff]`, hours including days, trailing fraction zeros stripped.
impl fmt::Display for TimeParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.total_hours(),
            self.minutes,
            self.seconds
        )?;
        if self.microseconds != 0 {
            let digits = format!("{:06}", self.microseconds);
            write!(f, ".{}", digits.trim_end_matches('0'))?;
        }
        Ok(())
    }
}

impl FromStr for TimeParts {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidValue(format!("invalid TIME value {s:?}"));
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let mut fields = body.split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(invalid());
        };
        let (sec, fraction) = match sec.split_once('.') {
            Some((sec, fraction)) => (sec, Some(fraction)),
            None => (sec, None),
        };
        let digits = |field: &str| !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit());
        if !digits(h) || m.len() != 2 || sec.len() != 2 || !digits(m) || !digits(sec) {
            return Err(invalid());
        }
        let total_hours: u64 = h.parse().map_err(|_| invalid())?;
        let minutes: u8 = m.parse().map_err(|_| invalid())?;
        let seconds: u8 = sec.parse().map_err(|_| invalid())?;
        if minutes >= 60 || seconds >= 60 {
            return Err(invalid());
        }
        let microseconds = match fraction {
            None => 0,
            Some(f) if f.len() <= 6 && digits(f) => {
                let padded = format!("{f:0<6}");
                padded.parse().map_err(|_| invalid())?
            }
            Some(_) => return Err(invalid()),
        };
        Ok(Self {
            negative,
            days: u32::try_from(total_hours / 24).map_err(|_| invalid())?,
            hours: (total_hours % 24) as u8,
            minutes,
            seconds,
            microseconds,
        })
    }
}

impl Packet<'_> {
    /// Read the length byte, `None` for SQL NULL.
    fn read_temporal_length(&mut self) -> Result<Option<usize>> {
        let len = self.read_u8()?;
        Ok((len != NULL_MARKER).then_some(usize::from(len)))
    }

    /// Read the raw fields of a DATE/DATETIME/TIMESTAMP, `None` for SQL NULL.
    ///
    /// Returns the declared length alongside the fields. Bytes beyond the
    /// fields the length selects are skipped.
    pub fn read_date_time_parts(&mut self) -> Result<Option<(usize, DateTimeParts)>> {
        let Some(len) = self.read_temporal_length()? else {
            return Ok(None);
        };
        let mut parts = DateTimeParts::default();
        let mut consumed = 0;
        if len > 3 {
            parts.year = self.read_u16_le()?;
            parts.month = self.read_u8()?;
            parts.day = self.read_u8()?;
            consumed = 4;
        }
        if len > 6 {
            parts.hour = self.read_u8()?;
            parts.minute = self.read_u8()?;
            parts.second = self.read_u8()?;
            consumed = 7;
        }
        if len > 10 {
            parts.microsecond = self.read_u32_le()?;
            consumed = 11;
        }
        self.skip(len - consumed)?;
        Ok(Some((len, parts)))
    }

    /// Read a DATE/DATETIME/TIMESTAMP composed in `timezone`, `None` for SQL NULL.
    pub fn read_date_time(&mut self, timezone: &Timezone) -> Result<Option<DateTimeValue>> {
        Ok(self
            .read_date_time_parts()?
            .map(|(_, parts)| parts.compose(timezone)))
    }

    /// Read a DATE/DATETIME/TIMESTAMP rendered as text, `None` for SQL NULL.
    ///
    /// `decimals` truncates the fractional seconds (`None` keeps all six,
    /// `Some(0)` drops the fraction). A DATETIME or TIMESTAMP column hint
    /// renders a date-only encoding with a midnight time of day.
    pub fn read_date_time_string(
        &mut self,
        decimals: Option<u8>,
        time_separator: char,
        column_type: Option<FieldType>,
    ) -> Result<Option<String>> {
        let Some((len, parts)) = self.read_date_time_parts()? else {
            return Ok(None);
        };
        let wants_time = matches!(
            column_type,
            Some(
                FieldType::DateTime
                    | FieldType::Timestamp
                    | FieldType::DateTime2
                    | FieldType::Timestamp2
            )
        );
        let with_time = len > 6 || wants_time;
        let decimals = if len > 10 {
            decimals.map_or(6, usize::from)
        } else {
            0
        };
        Ok(Some(parts.render(with_time, decimals, time_separator)))
    }

    /// Read the fields of a TIME value, `None` for SQL NULL.
    pub fn read_time_parts(&mut self) -> Result<Option<TimeParts>> {
        let Some(len) = self.read_temporal_length()? else {
            return Ok(None);
        };
        let mut parts = TimeParts::default();
        let mut consumed = 0;
        if len > 6 {
            parts.negative = self.read_u8()? == 1;
            parts.days = self.read_u32_le()?;
            parts.hours = self.read_u8()?;
            parts.minutes = self.read_u8()?;
            parts.seconds = self.read_u8()?;
            consumed = 8;
        }
        if len > 10 {
            parts.microseconds = self.read_u32_le()?;
            consumed = 12;
        }
        self.skip(len.saturating_sub(consumed))?;
        Ok(Some(parts))
    }

    /// Read a TIME rendered as `[-]hh:mm:ss[.ffffff]`, `None` for SQL NULL.
    pub fn read_time_string(&mut self) -> Result<Option<String>> {
        Ok(self.read_time_parts()?.map(|parts| parts.to_string()))
    }

    /// Read a TIME as a signed millisecond count, `None` for SQL NULL.
    pub fn read_time_millis(&mut self) -> Result<Option<i64>> {
        Ok(self.read_time_parts()?.map(|parts| parts.to_millis()))
    }
}

impl PacketWriter {
    /// Write DATETIME fields in the 11-byte form.
    pub fn write_date_time_parts(&mut self, parts: &DateTimeParts) {
        self.write_u8(11);
        self.write_u16_le(parts.year);
        self.write_u8(parts.month);
        self.write_u8(parts.day);
        self.write_u8(parts.hour);
        self.write_u8(parts.minute);
        self.write_u8(parts.second);
        self.write_u32_le(parts.microsecond);
    }

    /// Write an instant as DATETIME wall-clock fields in `timezone`.
    pub fn write_date<Tz: TimeZone>(
        &mut self,
        value: &DateTime<Tz>,
        timezone: &Timezone,
    ) -> Result<()> {
        let wall = match timezone {
            Timezone::Utc => value.naive_utc(),
            Timezone::Offset(offset) => value.with_timezone(offset).naive_local(),
            Timezone::Local => value.with_timezone(&Local).naive_local(),
        };
        let year = u16::try_from(wall.year())
            .map_err(|_| Error::InvalidValue(format!("year {} cannot be encoded", wall.year())))?;
        self.write_date_time_parts(&DateTimeParts {
            year,
            month: wall.month() as u8,
            day: wall.day() as u8,
            hour: wall.hour() as u8,
            minute: wall.minute() as u8,
            second: wall.second() as u8,
            // Leap-second nanos run past 1e9.
            microsecond: (wall.nanosecond() / 1000).min(999_999),
        });
        Ok(())
    }

    /// Write a TIME in the narrowest form: 0, 8 or 12 bytes of fields.
    pub fn write_time(&mut self, time: &TimeParts) {
        if time.is_zero() {
            self.write_u8(0);
            return;
        }
        let with_micros = time.microseconds != 0;
        self.write_u8(if with_micros { 12 } else { 8 });
        self.write_u8(u8::from(time.negative));
        self.write_u32_le(time.days);
        self.write_u8(time.hours);
        self.write_u8(time.minutes);
        self.write_u8(time.seconds);
        if with_micros {
            self.write_u32_le(time.microseconds);
        }
    }
}
