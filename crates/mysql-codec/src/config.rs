//! Decode options.
//!
//! The binary protocol leaves several rendering choices to the client:
//! how 64-bit integers beyond the exact-integer range come back, whether
//! dates are instants or strings, and which timezone composes them.

use std::fmt;
use std::str::FromStr;

use chrono::FixedOffset;

use crate::error::{ConfigError, Error, Result};
use crate::protocol::{Encoding, MAX_SAFE_INTEGER, charset};

/// Timezone used to compose and encode DATETIME values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timezone {
    /// Local wall-clock time of the host
    #[default]
    Local,
    /// UTC (`"Z"`)
    Utc,
    /// A fixed UTC offset (`"+05:30"`)
    Offset(FixedOffset),
}

impl FromStr for Timezone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "local" => Ok(Timezone::Local),
            "Z" | "z" => Ok(Timezone::Utc),
            _ => parse_offset(s).map(Timezone::Offset).ok_or_else(|| {
                ConfigError {
                    message: format!(
                        "invalid timezone {s:?}: expected \"local\", \"Z\" or \"\u{b1}HH:MM\""
                    ),
                    source: None,
                }
                .into()
            }),
        }
    }
}

fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let two_digits = |field: &str| field.len() == 2 && field.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timezone::Local => f.write_str("local"),
            Timezone::Utc => f.write_str("Z"),
            Timezone::Offset(offset) => write!(f, "{offset}"),
        }
    }
}

/// Options applied while decoding rows.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Return BIGINT columns as decimal strings, and length-coded 64-bit
    /// integers beyond `exact_integer_limit`
    pub big_number_strings: bool,
    /// Largest magnitude returned as an exact integer (default: 2^53 - 1)
    pub exact_integer_limit: u64,
    /// Timezone for composing and writing DATETIME values
    pub timezone: Timezone,
    /// Render DATE/DATETIME/TIMESTAMP as strings instead of instants
    pub date_strings: bool,
    /// Decode TIME as a signed millisecond count
    pub time_as_milliseconds: bool,
    /// Separator between date and time in rendered strings
    pub time_separator: char,
    /// Connection collation id (default: utf8mb4); names in column
    /// definitions and server messages use its encoding
    pub charset: u16,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            big_number_strings: false,
            exact_integer_limit: MAX_SAFE_INTEGER,
            timezone: Timezone::Local,
            date_strings: false,
            time_as_milliseconds: false,
            time_separator: ' ',
            charset: charset::DEFAULT_CHARSET,
        }
    }
}

impl CodecConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn big_number_strings(mut self, enabled: bool) -> Self {
        self.big_number_strings = enabled;
        self
    }

    pub fn exact_integer_limit(mut self, limit: u64) -> Self {
        self.exact_integer_limit = limit;
        self
    }

    pub fn timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = timezone;
        self
    }

    /// Set the timezone from its textual form (`local`, `Z` or `±HH:MM`).
    pub fn timezone_str(self, timezone: &str) -> Result<Self> {
        Ok(self.timezone(timezone.parse()?))
    }

    pub fn date_strings(mut self, enabled: bool) -> Self {
        self.date_strings = enabled;
        self
    }

    pub fn time_as_milliseconds(mut self, enabled: bool) -> Self {
        self.time_as_milliseconds = enabled;
        self
    }

    pub fn time_separator(mut self, separator: char) -> Self {
        self.time_separator = separator;
        self
    }

    /// Set the connection character set.
    pub fn charset(mut self, charset: u16) -> Self {
        self.charset = charset;
        self
    }

    /// Text encoding implied by the connection character set.
    pub fn encoding(&self) -> Encoding {
        Encoding::for_charset(self.charset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert!(!config.big_number_strings);
        assert_eq!(config.exact_integer_limit, MAX_SAFE_INTEGER);
        assert_eq!(config.timezone, Timezone::Local);
        assert_eq!(config.time_separator, ' ');
        assert_eq!(config.encoding(), Encoding::Utf8);
    }

    #[test]
    fn test_builder_pattern() {
        let config = CodecConfig::new()
            .big_number_strings(true)
            .exact_integer_limit(u64::MAX)
            .date_strings(true)
            .time_as_milliseconds(true)
            .time_separator('T')
            .charset(charset::LATIN1_SWEDISH_CI)
            .timezone_str("Z")
            .unwrap();

        assert!(config.big_number_strings);
        assert_eq!(config.exact_integer_limit, u64::MAX);
        assert!(config.date_strings);
        assert!(config.time_as_milliseconds);
        assert_eq!(config.time_separator, 'T');
        assert_eq!(config.encoding(), Encoding::Latin1);
        assert_eq!(config.timezone, Timezone::Utc);
    }

    #[test]
    fn test_timezone_parsing() {
        assert_eq!("local".parse::<Timezone>().unwrap(), Timezone::Local);
        assert_eq!("Z".parse::<Timezone>().unwrap(), Timezone::Utc);
        assert_eq!(
            "+05:30".parse::<Timezone>().unwrap(),
            Timezone::Offset(FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap())
        );
        assert_eq!(
            "-08:00".parse::<Timezone>().unwrap(),
            Timezone::Offset(FixedOffset::west_opt(8 * 3600).unwrap())
        );
        for bad in [
            "UTC", "+5:30", "+05:75", "05:00", "+05", "+-5:00", "++5:00", "-+5:00", "+24:00",
            "+0a:00", "+05:-1",
        ] {
            assert!(
                matches!(bad.parse::<Timezone>(), Err(Error::Config(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_timezone_display() {
        assert_eq!(Timezone::Utc.to_string(), "Z");
        assert_eq!(Timezone::Local.to_string(), "local");
        let tz: Timezone = "-03:00".parse().unwrap();
        assert_eq!(tz.to_string(), "-03:00");
    }
}
