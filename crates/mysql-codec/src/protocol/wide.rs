//! 64-bit integers assembled from two little-endian 32-bit words.
//!
//! A decoded 64-bit value is either an exact integer or its decimal
//! rendering. Values whose magnitude exceeds the exact-integer limit (by
//! default the 2^53 - 1 bound shared by JSON and JavaScript consumers) fall
//! back to a decimal string so no digit is silently lost downstream.

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::protocol::Packet;

/// Largest integer exactly representable as an IEEE-754 double (2^53 - 1).
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// A 64-bit integer in exact or decimal-string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Wide64 {
    Signed(i64),
    Unsigned(u64),
    /// Decimal rendering of a value beyond the exact-integer limit
    Decimal(String),
}

fn compose(low: u32, high: u32) -> u64 {
    (u64::from(high) << 32) | u64::from(low)
}

impl Wide64 {
    /// Exact value without any limit applied.
    pub fn exact(value: u64, signed: bool) -> Self {
        if signed {
            Wide64::Signed(value as i64)
        } else {
            Wide64::Unsigned(value)
        }
    }

    /// Number-mode composition: exact when the high word is zero or the
    /// magnitude is within `limit`, decimal string otherwise.
    ///
    /// For the signed interpretation the high word's top bit is the two's
    /// complement sign of the composed value.
    pub fn from_words(low: u32, high: u32, signed: bool, limit: u64) -> Self {
        if high == 0 {
            return Self::exact(u64::from(low), signed);
        }
        Self::exact(compose(low, high), signed).limited(limit)
    }

    /// String-mode composition: always the decimal rendering.
    pub fn decimal_from_words(low: u32, high: u32, signed: bool) -> String {
        let value = compose(low, high);
        if signed {
            (value as i64).to_string()
        } else {
            value.to_string()
        }
    }

    /// Replace an exact value whose magnitude exceeds `limit` by its decimal form.
    pub fn limited(self, limit: u64) -> Self {
        let magnitude = match self {
            Wide64::Signed(v) => v.unsigned_abs(),
            Wide64::Unsigned(v) => v,
            Wide64::Decimal(_) => return self,
        };
        if magnitude <= limit {
            self
        } else {
            Wide64::Decimal(self.to_string())
        }
    }

    pub fn is_exact(&self) -> bool {
        !matches!(self, Wide64::Decimal(_))
    }

    /// The value as `i64`, parsing the decimal form if needed.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Wide64::Signed(v) => Some(*v),
            Wide64::Unsigned(v) => i64::try_from(*v).ok(),
            Wide64::Decimal(s) => s.parse().ok(),
        }
    }

    /// The value as `u64`, parsing the decimal form if needed.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Wide64::Signed(v) => u64::try_from(*v).ok(),
            Wide64::Unsigned(v) => Some(*v),
            Wide64::Decimal(s) => s.parse().ok(),
        }
    }
}

impl fmt::Display for Wide64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wide64::Signed(v) => write!(f, "{v}"),
            Wide64::Unsigned(v) => write!(f, "{v}"),
            Wide64::Decimal(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Wide64 {
    fn from(value: i64) -> Self {
        Wide64::Signed(value)
    }
}

impl From<u64> for Wide64 {
    fn from(value: u64) -> Self {
        Wide64::Unsigned(value)
    }
}

impl Packet<'_> {
    fn read_words(&mut self) -> Result<(u32, u32)> {
        let low = self.read_u32_le()?;
        let high = self.read_u32_le()?;
        Ok((low, high))
    }

    /// Unsigned 64-bit value, exact when within the packet's exact-integer limit.
    pub fn read_u64_number(&mut self) -> Result<Wide64> {
        let (low, high) = self.read_words()?;
        Ok(Wide64::from_words(
            low,
            high,
            false,
            self.exact_integer_limit(),
        ))
    }

    /// Signed 64-bit value, exact when within the packet's exact-integer limit.
    pub fn read_i64_number(&mut self) -> Result<Wide64> {
        let (low, high) = self.read_words()?;
        Ok(Wide64::from_words(
            low,
            high,
            true,
            self.exact_integer_limit(),
        ))
    }

    /// Unsigned 64-bit value rendered in decimal.
    pub fn read_u64_string(&mut self) -> Result<String> {
        let (low, high) = self.read_words()?;
        Ok(Wide64::decimal_from_words(low, high, false))
    }

    /// Signed 64-bit value rendered in decimal.
    pub fn read_i64_string(&mut self) -> Result<String> {
        let (low, high) = self.read_words()?;
        Ok(Wide64::decimal_from_words(low, high, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::packet::frame;

    fn words(value: u64) -> Vec<u8> {
        value.to_le_bytes().to_vec()
    }

    #[test]
    fn test_high_word_zero_is_always_exact() {
        assert_eq!(
            Wide64::from_words(u32::MAX, 0, false, 0),
            Wide64::Unsigned(u64::from(u32::MAX))
        );
        assert_eq!(
            Wide64::from_words(u32::MAX, 0, true, 0),
            Wide64::Signed(i64::from(u32::MAX))
        );
    }

    #[test]
    fn test_safe_range_boundary() {
        let at = MAX_SAFE_INTEGER;
        let low = (at & 0xFFFF_FFFF) as u32;
        let high = (at >> 32) as u32;
        assert_eq!(
            Wide64::from_words(low, high, false, MAX_SAFE_INTEGER),
            Wide64::Unsigned(at)
        );
        let over = at + 1;
        assert_eq!(
            Wide64::from_words(
                (over & 0xFFFF_FFFF) as u32,
                (over >> 32) as u32,
                false,
                MAX_SAFE_INTEGER
            ),
            Wide64::Decimal("9007199254740992".to_string())
        );
    }

    #[test]
    fn test_twos_complement_sign() {
        let buf = frame(0, &words((-5i64) as u64));
        let mut packet = Packet::parse(&buf).unwrap();
        assert_eq!(packet.read_i64_number().unwrap(), Wide64::Signed(-5));
        packet.reset();
        assert_eq!(
            packet.read_u64_number().unwrap(),
            Wide64::Decimal("18446744073709551611".to_string())
        );
        packet.reset();
        assert_eq!(packet.read_i64_string().unwrap(), "-5");
    }

    #[test]
    fn test_four_modes_at_extremes() {
        let mut payload = words(i64::MAX as u64);
        payload.extend(words(u64::MAX));
        let buf = frame(0, &payload);
        let mut packet = Packet::parse(&buf).unwrap();

        assert_eq!(packet.read_i64_string().unwrap(), "9223372036854775807");
        assert_eq!(packet.read_u64_string().unwrap(), "18446744073709551615");

        packet.reset();
        let mut unlimited = packet.clone().with_exact_integer_limit(u64::MAX);
        assert_eq!(
            unlimited.read_i64_number().unwrap(),
            Wide64::Signed(i64::MAX)
        );
        assert_eq!(
            unlimited.read_u64_number().unwrap(),
            Wide64::Unsigned(u64::MAX)
        );
        assert_eq!(
            packet.read_i64_number().unwrap(),
            Wide64::Decimal("9223372036854775807".to_string())
        );
    }

    #[test]
    fn test_negative_limit_uses_magnitude() {
        let min_safe = -(MAX_SAFE_INTEGER as i64);
        assert_eq!(
            Wide64::Signed(min_safe).limited(MAX_SAFE_INTEGER),
            Wide64::Signed(min_safe)
        );
        assert_eq!(
            Wide64::Signed(min_safe - 1).limited(MAX_SAFE_INTEGER),
            Wide64::Decimal("-9007199254740992".to_string())
        );
    }

    #[test]
    fn test_accessors_and_json() {
        let decimal = Wide64::Decimal("12345678901234567890".to_string());
        assert_eq!(decimal.as_u64(), Some(12_345_678_901_234_567_890));
        assert_eq!(decimal.as_i64(), None);
        assert!(!decimal.is_exact());
        assert_eq!(Wide64::Signed(-1).as_u64(), None);

        assert_eq!(serde_json::to_string(&Wide64::Signed(-7)).unwrap(), "-7");
        assert_eq!(
            serde_json::to_string(&decimal).unwrap(),
            "\"12345678901234567890\""
        );
    }
}
