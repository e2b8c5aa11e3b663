//! Column metadata and row decoding.
//!
//! The wire format is not self-describing: a result set sends one column
//! definition packet per column, and each row is then decoded by invoking the
//! typed read that column's [`FieldType`] calls for.
//!
//! # Binary vs. text rows
//!
//! Rows of a prepared statement use the binary protocol (fixed-width integers,
//! length-byte temporal values, a NULL bitmap). Rows of a plain query carry
//! every value as a length-coded string.

#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

use crate::config::CodecConfig;
use crate::error::{ProtocolError, Result};
use crate::protocol::{Encoding, Packet, TimeParts, Wide64, charset};
use crate::value::Value;

/// MySQL field type codes.
///
/// These are the `MYSQL_TYPE_*` constants from the MySQL C API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FieldType {
    Decimal = 0x00,
    Tiny = 0x01,
    Short = 0x02,
    Long = 0x03,
    Float = 0x04,
    Double = 0x05,
    Null = 0x06,
    Timestamp = 0x07,
    LongLong = 0x08,
    Int24 = 0x09,
    Date = 0x0A,
    Time = 0x0B,
    DateTime = 0x0C,
    Year = 0x0D,
    /// Internal to the server; never sent by current versions
    NewDate = 0x0E,
    VarChar = 0x0F,
    Bit = 0x10,
    Timestamp2 = 0x11,
    DateTime2 = 0x12,
    Time2 = 0x13,
    Json = 0xF5,
    NewDecimal = 0xF6,
    Enum = 0xF7,
    Set = 0xF8,
    TinyBlob = 0xF9,
    MediumBlob = 0xFA,
    LongBlob = 0xFB,
    Blob = 0xFC,
    VarString = 0xFD,
    String = 0xFE,
    Geometry = 0xFF,
}

impl FieldType {
    /// Parse a field type from a byte. Unknown codes are treated as strings.
    #[must_use]
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x00 => FieldType::Decimal,
            0x01 => FieldType::Tiny,
            0x02 => FieldType::Short,
            0x03 => FieldType::Long,
            0x04 => FieldType::Float,
            0x05 => FieldType::Double,
            0x06 => FieldType::Null,
            0x07 => FieldType::Timestamp,
            0x08 => FieldType::LongLong,
            0x09 => FieldType::Int24,
            0x0A => FieldType::Date,
            0x0B => FieldType::Time,
            0x0C => FieldType::DateTime,
            0x0D => FieldType::Year,
            0x0E => FieldType::NewDate,
            0x0F => FieldType::VarChar,
            0x10 => FieldType::Bit,
            0x11 => FieldType::Timestamp2,
            0x12 => FieldType::DateTime2,
            0x13 => FieldType::Time2,
            0xF5 => FieldType::Json,
            0xF6 => FieldType::NewDecimal,
            0xF7 => FieldType::Enum,
            0xF8 => FieldType::Set,
            0xF9 => FieldType::TinyBlob,
            0xFA => FieldType::MediumBlob,
            0xFB => FieldType::LongBlob,
            0xFC => FieldType::Blob,
            0xFD => FieldType::VarString,
            0xFF => FieldType::Geometry,
            _ => FieldType::String,
        }
    }

    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            FieldType::Tiny
                | FieldType::Short
                | FieldType::Long
                | FieldType::LongLong
                | FieldType::Int24
                | FieldType::Year
        )
    }

    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, FieldType::Float | FieldType::Double)
    }

    #[must_use]
    pub const fn is_decimal(self) -> bool {
        matches!(self, FieldType::Decimal | FieldType::NewDecimal)
    }

    #[must_use]
    pub const fn is_string(self) -> bool {
        matches!(
            self,
            FieldType::VarChar
                | FieldType::VarString
                | FieldType::String
                | FieldType::Enum
                | FieldType::Set
        )
    }

    #[must_use]
    pub const fn is_blob(self) -> bool {
        matches!(
            self,
            FieldType::TinyBlob | FieldType::MediumBlob | FieldType::LongBlob | FieldType::Blob
        )
    }

    /// DATE, DATETIME and TIMESTAMP in all their encodings (not TIME).
    #[must_use]
    pub const fn is_date_time(self) -> bool {
        matches!(
            self,
            FieldType::Date
                | FieldType::NewDate
                | FieldType::DateTime
                | FieldType::Timestamp
                | FieldType::DateTime2
                | FieldType::Timestamp2
        )
    }

    #[must_use]
    pub const fn is_time(self) -> bool {
        matches!(self, FieldType::Time | FieldType::Time2)
    }

    /// Get the type name as a string.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            FieldType::Decimal | FieldType::NewDecimal => "DECIMAL",
            FieldType::Tiny => "TINYINT",
            FieldType::Short => "SMALLINT",
            FieldType::Long => "INT",
            FieldType::Float => "FLOAT",
            FieldType::Double => "DOUBLE",
            FieldType::Null => "NULL",
            FieldType::Timestamp | FieldType::Timestamp2 => "TIMESTAMP",
            FieldType::LongLong => "BIGINT",
            FieldType::Int24 => "MEDIUMINT",
            FieldType::Date | FieldType::NewDate => "DATE",
            FieldType::Time | FieldType::Time2 => "TIME",
            FieldType::DateTime | FieldType::DateTime2 => "DATETIME",
            FieldType::Year => "YEAR",
            FieldType::VarChar | FieldType::VarString => "VARCHAR",
            FieldType::Bit => "BIT",
            FieldType::Json => "JSON",
            FieldType::Enum => "ENUM",
            FieldType::Set => "SET",
            FieldType::TinyBlob => "TINYBLOB",
            FieldType::MediumBlob => "MEDIUMBLOB",
            FieldType::LongBlob => "LONGBLOB",
            FieldType::Blob => "BLOB",
            FieldType::String => "CHAR",
            FieldType::Geometry => "GEOMETRY",
        }
    }
}

/// Column flags in result set metadata.
pub mod column_flags {
    pub const NOT_NULL: u16 = 1;
    pub const PRIMARY_KEY: u16 = 2;
    pub const UNIQUE_KEY: u16 = 4;
    pub const MULTIPLE_KEY: u16 = 8;
    pub const BLOB: u16 = 16;
    pub const UNSIGNED: u16 = 32;
    pub const ZEROFILL: u16 = 64;
    pub const BINARY: u16 = 128;
    pub const ENUM: u16 = 256;
    pub const AUTO_INCREMENT: u16 = 512;
    pub const TIMESTAMP: u16 = 1024;
    pub const SET: u16 = 2048;
    pub const NO_DEFAULT_VALUE: u16 = 4096;
    pub const ON_UPDATE_NOW: u16 = 8192;
    pub const NUM: u16 = 32768;
}

/// Decimals value the server sends when a column has no fixed scale.
const DYNAMIC_DECIMALS: u8 = 0x1F;

/// Column definition from a result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Catalog name (always "def")
    pub catalog: String,
    /// Schema (database) name
    pub schema: String,
    /// Table name (or alias)
    pub table: String,
    /// Original table name
    pub org_table: String,
    /// Column name (or alias)
    pub name: String,
    /// Original column name
    pub org_name: String,
    /// Character set number
    pub charset: u16,
    /// Column length
    pub column_length: u32,
    /// Column type
    pub column_type: FieldType,
    /// Column flags
    pub flags: u16,
    /// Number of decimals
    pub decimals: u8,
}

impl ColumnDef {
    /// A bare definition, mostly useful to drive row decoding in tests.
    pub fn new(name: impl Into<String>, column_type: FieldType) -> Self {
        Self {
            catalog: "def".to_string(),
            schema: String::new(),
            table: String::new(),
            org_table: String::new(),
            name: name.into(),
            org_name: String::new(),
            charset: charset::DEFAULT_CHARSET,
            column_length: 0,
            column_type,
            flags: 0,
            decimals: 0,
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_charset(mut self, charset: u16) -> Self {
        self.charset = charset;
        self
    }

    #[must_use]
    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    #[must_use]
    pub const fn is_not_null(&self) -> bool {
        self.flags & column_flags::NOT_NULL != 0
    }

    #[must_use]
    pub const fn is_primary_key(&self) -> bool {
        self.flags & column_flags::PRIMARY_KEY != 0
    }

    #[must_use]
    pub const fn is_unsigned(&self) -> bool {
        self.flags & column_flags::UNSIGNED != 0
    }

    #[must_use]
    pub const fn is_auto_increment(&self) -> bool {
        self.flags & column_flags::AUTO_INCREMENT != 0
    }

    /// Whether values are raw bytes rather than text (`binary` collation).
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        self.charset == charset::BINARY
    }

    /// Text encoding of this column's values.
    pub fn encoding(&self) -> Encoding {
        Encoding::for_charset(self.charset)
    }

    /// Fractional digits to render for temporal columns, `None` when unfixed.
    fn fraction_digits(&self) -> Option<u8> {
        (self.decimals != DYNAMIC_DECIMALS).then_some(self.decimals.min(6))
    }
}

impl Packet<'_> {
    /// Decode a protocol 4.1 column definition packet.
    ///
    /// Names arrive in the connection character set, usually
    /// [`CodecConfig::encoding`].
    pub fn read_column_definition(&mut self, encoding: Encoding) -> Result<ColumnDef> {
        self.reset();
        let mut name = || -> Result<String> {
            Ok(self.read_length_coded_string(encoding)?.unwrap_or_default())
        };
        let catalog = name()?;
        let schema = name()?;
        let table = name()?;
        let org_table = name()?;
        let column_name = name()?;
        let org_name = name()?;

        // Length of the fixed-size fields that follow (always 0x0C).
        let at = self.offset();
        if self.read_length_coded_u64()?.is_none() {
            return Err(ProtocolError::malformed(at, "NULL fixed-length marker").into());
        }
        let charset = self.read_u16_le()?;
        let column_length = self.read_u32_le()?;
        let column_type = FieldType::from_u8(self.read_u8()?);
        let flags = self.read_u16_le()?;
        let decimals = self.read_u8()?;

        Ok(ColumnDef {
            catalog,
            schema,
            table,
            org_table,
            name: column_name,
            org_name,
            charset,
            column_length,
            column_type,
            flags,
            decimals,
        })
    }
}

fn integer_value(value: Option<Wide64>) -> Value {
    match value {
        None => Value::Null,
        Some(Wide64::Signed(v)) => Value::Int(v),
        Some(Wide64::Unsigned(v)) => Value::UInt(v),
        Some(big @ Wide64::Decimal(_)) => Value::BigInt(big),
    }
}

fn json_value(bytes: Option<&[u8]>, encoding: Encoding) -> Value {
    match bytes {
        None => Value::Null,
        Some(bytes) => serde_json::from_slice(bytes)
            .map_or_else(|_| Value::Text(encoding.decode(bytes)), Value::Json),
    }
}

/// Blob and string columns: bytes for the binary collation, text otherwise.
fn string_value(packet: &mut Packet<'_>, column: &ColumnDef) -> Result<Value> {
    let Some(bytes) = packet.read_length_coded_buffer()? else {
        return Ok(Value::Null);
    };
    if column.is_binary() || column.column_type == FieldType::Bit {
        Ok(Value::Bytes(bytes.to_vec()))
    } else {
        Ok(Value::Text(column.encoding().decode(bytes)))
    }
}

/// Decode one non-NULL binary protocol value.
pub fn decode_binary_value(
    packet: &mut Packet<'_>,
    column: &ColumnDef,
    config: &CodecConfig,
) -> Result<Value> {
    let unsigned = column.is_unsigned();
    let value = match column.column_type {
        FieldType::Tiny if unsigned => Value::UInt(u64::from(packet.read_u8()?)),
        FieldType::Tiny => Value::Int(i64::from(packet.read_i8()?)),
        FieldType::Short | FieldType::Year if unsigned => {
            Value::UInt(u64::from(packet.read_u16_le()?))
        }
        FieldType::Short | FieldType::Year => Value::Int(i64::from(packet.read_i16_le()?)),
        FieldType::Long | FieldType::Int24 if unsigned => {
            Value::UInt(u64::from(packet.read_u32_le()?))
        }
        FieldType::Long | FieldType::Int24 => Value::Int(i64::from(packet.read_i32_le()?)),
        FieldType::LongLong => Value::BigInt(match (config.big_number_strings, unsigned) {
            (true, true) => Wide64::Decimal(packet.read_u64_string()?),
            (true, false) => Wide64::Decimal(packet.read_i64_string()?),
            (false, true) => packet.read_u64_number()?,
            (false, false) => packet.read_i64_number()?,
        }),
        FieldType::Float => Value::Float(packet.read_f32_le()?),
        FieldType::Double => Value::Double(packet.read_f64_le()?),
        FieldType::Decimal | FieldType::NewDecimal => packet
            .read_length_coded_string(Encoding::Ascii)?
            .map_or(Value::Null, Value::Decimal),
        t if t.is_date_time() => {
            if config.date_strings {
                let decimals = column.fraction_digits();
                packet
                    .read_date_time_string(decimals, config.time_separator, Some(t))?
                    .into()
            } else {
                packet.read_date_time(&config.timezone)?.into()
            }
        }
        FieldType::Time | FieldType::Time2 => {
            if config.time_as_milliseconds {
                packet.read_time_millis()?.into()
            } else {
                packet.read_time_string()?.into()
            }
        }
        FieldType::Json => json_value(packet.read_length_coded_buffer()?, column.encoding()),
        FieldType::Geometry => packet.read_geometry()?.into(),
        FieldType::Null => Value::Null,
        _ => string_value(packet, column)?,
    };
    Ok(value)
}

/// Decode a binary protocol row: 0x00 header, NULL bitmap, non-NULL values.
///
/// The NULL bitmap has `(columns + 7 + 2) / 8` bytes; bit `i + 2` is set when
/// column `i` is NULL.
pub fn decode_binary_row(
    packet: &mut Packet<'_>,
    columns: &[ColumnDef],
    config: &CodecConfig,
) -> Result<Vec<Value>> {
    packet.reset();
    packet.set_exact_integer_limit(config.exact_integer_limit);
    let at = packet.offset();
    let header = packet.read_u8()?;
    if header != 0x00 {
        return Err(ProtocolError::malformed(
            at,
            format!("binary row header 0x{header:02x}, expected 0x00"),
        )
        .into());
    }
    let null_bitmap = packet.read_bytes((columns.len() + 7 + 2) / 8)?;

    let mut values = Vec::with_capacity(columns.len());
    for (i, column) in columns.iter().enumerate() {
        let bit = i + 2;
        if null_bitmap[bit / 8] & (1 << (bit % 8)) != 0 {
            values.push(Value::Null);
        } else {
            values.push(decode_binary_value(packet, column, config)?);
        }
    }
    Ok(values)
}

/// Decode one text protocol value (a length-coded string or NULL).
pub fn decode_text_value(
    packet: &mut Packet<'_>,
    column: &ColumnDef,
    config: &CodecConfig,
) -> Result<Value> {
    let signed = !column.is_unsigned();
    let value = match column.column_type {
        FieldType::LongLong => {
            let value = packet.read_text_integer(signed, true)?;
            if config.big_number_strings {
                value.map(|v| Wide64::Decimal(v.to_string())).into()
            } else {
                value.into()
            }
        }
        t if t.is_integer() => integer_value(packet.read_text_integer(signed, false)?),
        FieldType::Float => packet
            .read_text_float()?
            .map_or(Value::Null, |v| Value::Float(v as f32)),
        FieldType::Double => packet.read_text_float()?.map_or(Value::Null, Value::Double),
        FieldType::Decimal | FieldType::NewDecimal => packet
            .read_length_coded_string(Encoding::Ascii)?
            .map_or(Value::Null, Value::Decimal),
        t if t.is_date_time() => {
            if config.date_strings {
                packet.read_length_coded_string(Encoding::Ascii)?.into()
            } else {
                packet.read_text_date_time(&config.timezone)?.into()
            }
        }
        FieldType::Time | FieldType::Time2 => {
            if config.time_as_milliseconds {
                packet
                    .read_text_time()?
                    .as_ref()
                    .map(TimeParts::to_millis)
                    .into()
            } else {
                packet.read_length_coded_string(Encoding::Ascii)?.into()
            }
        }
        FieldType::Json => json_value(packet.read_length_coded_buffer()?, column.encoding()),
        FieldType::Geometry => packet.read_geometry()?.into(),
        FieldType::Null => {
            packet.read_length_coded_buffer()?;
            Value::Null
        }
        _ => string_value(packet, column)?,
    };
    Ok(value)
}

/// Decode a text protocol row: one length-coded field per column.
pub fn decode_text_row(
    packet: &mut Packet<'_>,
    columns: &[ColumnDef],
    config: &CodecConfig,
) -> Result<Vec<Value>> {
    packet.reset();
    packet.set_exact_integer_limit(config.exact_integer_limit);
    columns
        .iter()
        .map(|column| decode_text_value(packet, column, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timezone;
    use crate::protocol::{DateTimeValue, PacketWriter};

    #[test]
    fn test_field_type_from_u8() {
        assert_eq!(FieldType::from_u8(0x01), FieldType::Tiny);
        assert_eq!(FieldType::from_u8(0x08), FieldType::LongLong);
        assert_eq!(FieldType::from_u8(0xF5), FieldType::Json);
        assert_eq!(FieldType::from_u8(0xFF), FieldType::Geometry);
        assert_eq!(FieldType::from_u8(0x99), FieldType::String);
    }

    #[test]
    fn test_field_type_categories() {
        assert!(FieldType::Year.is_integer());
        assert!(FieldType::Double.is_float());
        assert!(FieldType::NewDecimal.is_decimal());
        assert!(FieldType::Enum.is_string());
        assert!(FieldType::MediumBlob.is_blob());
        assert!(FieldType::Timestamp2.is_date_time());
        assert!(!FieldType::Time.is_date_time());
        assert!(FieldType::Time2.is_time());
        assert_eq!(FieldType::DateTime2.name(), "DATETIME");
    }

    #[test]
    fn test_read_column_definition() {
        let mut writer = PacketWriter::new();
        for s in ["def", "shop", "o", "orders", "total", "total"] {
            writer.write_length_coded_string(s, Encoding::Utf8);
        }
        writer.write_length_coded_number(0x0C);
        writer.write_u16_le(charset::BINARY);
        writer.write_u32_le(20);
        writer.write_u8(FieldType::LongLong as u8);
        writer.write_u16_le(column_flags::NOT_NULL | column_flags::UNSIGNED);
        writer.write_u8(0);
        writer.write_zeros(2);
        let buf = writer.finish(2).unwrap();

        let mut packet = Packet::parse(&buf).unwrap();
        let column = packet
            .read_column_definition(CodecConfig::default().encoding())
            .unwrap();
        assert_eq!(column.schema, "shop");
        assert_eq!(column.table, "o");
        assert_eq!(column.org_table, "orders");
        assert_eq!(column.name, "total");
        assert_eq!(column.column_type, FieldType::LongLong);
        assert_eq!(column.column_length, 20);
        assert!(column.is_unsigned());
        assert!(column.is_not_null());
        assert!(!column.is_primary_key());
        assert!(column.is_binary());
    }

    #[test]
    fn test_column_names_use_connection_charset() {
        let config = CodecConfig::new().charset(charset::LATIN1_SWEDISH_CI);
        let mut writer = PacketWriter::new();
        for s in ["def", "lager", "v", "v", "Größe", "Größe"] {
            writer.write_length_coded_string(s, config.encoding());
        }
        writer.write_length_coded_number(0x0C);
        writer.write_u16_le(charset::UTF8MB4_GENERAL_CI);
        writer.write_u32_le(40);
        writer.write_u8(FieldType::VarString as u8);
        writer.write_u16_le(0);
        writer.write_u8(0);
        writer.write_zeros(2);
        let buf = writer.finish(2).unwrap();
        // "ö" is one byte on the wire.
        assert!(buf.windows(6).any(|w| w == [0x05, b'G', b'r', 0xF6, 0xDF, b'e']));

        let mut packet = Packet::parse(&buf).unwrap();
        let column = packet.read_column_definition(config.encoding()).unwrap();
        assert_eq!(column.name, "Größe");
        assert_eq!(column.org_name, "Größe");
        assert_eq!(column.encoding(), Encoding::Utf8);

        let mut packet = Packet::parse(&buf).unwrap();
        let misread = packet.read_column_definition(Encoding::Utf8).unwrap();
        assert_ne!(misread.name, "Größe");
    }

    #[test]
    fn test_binary_row_with_nulls() {
        let columns = [
            ColumnDef::new("id", FieldType::Long),
            ColumnDef::new("note", FieldType::VarString),
            ColumnDef::new("flag", FieldType::Tiny).with_flags(column_flags::UNSIGNED),
            ColumnDef::new("big", FieldType::LongLong),
        ];
        let mut writer = PacketWriter::new();
        writer.write_u8(0x00);
        // Column 1 is NULL: bit 3.
        writer.write_u8(0b0000_1000);
        writer.write_i32_le(-7);
        writer.write_u8(200);
        writer.write_i64_le(i64::MAX);
        let buf = writer.finish(1).unwrap();
        let mut packet = Packet::parse(&buf).unwrap();

        let values = decode_binary_row(&mut packet, &columns, &CodecConfig::default()).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Int(-7),
                Value::Null,
                Value::UInt(200),
                Value::BigInt(Wide64::Decimal("9223372036854775807".to_string())),
            ]
        );
        assert!(!packet.have_more_data());

        let exact = CodecConfig::new().exact_integer_limit(u64::MAX);
        let values = decode_binary_row(&mut packet, &columns, &exact).unwrap();
        assert_eq!(values[3], Value::BigInt(Wide64::Signed(i64::MAX)));
    }

    #[test]
    fn test_binary_row_rejects_bad_header() {
        let mut writer = PacketWriter::new();
        writer.write_u8(0xFE);
        writer.write_u8(0);
        let bytes = writer.finish(0).unwrap();
        let mut packet = Packet::parse(&bytes).unwrap();
        let columns = [ColumnDef::new("a", FieldType::Long)];
        assert!(decode_binary_row(&mut packet, &columns, &CodecConfig::default()).is_err());
    }

    #[test]
    fn test_binary_temporal_and_strings() {
        let columns = [
            ColumnDef::new("at", FieldType::DateTime).with_decimals(3),
            ColumnDef::new("span", FieldType::Time),
            ColumnDef::new("raw", FieldType::Blob).with_charset(charset::BINARY),
            ColumnDef::new("doc", FieldType::Json),
        ];
        let mut writer = PacketWriter::new();
        writer.write_u8(0x00);
        writer.write_u8(0x00);
        writer.write_bytes(&[11, 0xE8, 0x07, 1, 2, 3, 4, 5]);
        writer.write_u32_le(678_900);
        writer.write_time(&"-30:15:00".parse().unwrap());
        writer.write_length_coded_buffer(&[0x00, 0xFF]);
        writer.write_length_coded_string(r#"{"a":1}"#, Encoding::Utf8);
        let buf = writer.finish(1).unwrap();
        let mut packet = Packet::parse(&buf).unwrap();

        let config = CodecConfig::new().date_strings(true).time_separator('T');
        let values = decode_binary_row(&mut packet, &columns, &config).unwrap();
        assert_eq!(values[0], Value::Text("2024-01-02T03:04:05.678".to_string()));
        assert_eq!(values[1], Value::Text("-30:15:00".to_string()));
        assert_eq!(values[2], Value::Bytes(vec![0x00, 0xFF]));
        assert_eq!(values[3], Value::Json(serde_json::json!({"a": 1})));

        let config = CodecConfig::new()
            .timezone(Timezone::Utc)
            .time_as_milliseconds(true);
        let values = decode_binary_row(&mut packet, &columns, &config).unwrap();
        match &values[0] {
            Value::DateTime(DateTimeValue::Instant(dt)) => {
                assert_eq!(dt.to_rfc3339(), "2024-01-02T03:04:05.678+00:00");
            }
            other => panic!("expected instant, got {other:?}"),
        }
        assert_eq!(values[1], Value::Int(-108_900_000));
    }

    #[test]
    fn test_text_row() {
        let columns = [
            ColumnDef::new("id", FieldType::LongLong).with_flags(column_flags::UNSIGNED),
            ColumnDef::new("name", FieldType::VarString),
            ColumnDef::new("price", FieldType::NewDecimal),
            ColumnDef::new("born", FieldType::Date),
            ColumnDef::new("small", FieldType::Short),
            ColumnDef::new("ratio", FieldType::Double),
        ];
        let mut writer = PacketWriter::new();
        for field in [
            Some("18446744073709551615"),
            Some("Zoë"),
            Some("12.50"),
            Some("0000-00-00"),
            None,
            Some("0.5"),
        ] {
            match field {
                Some(text) => writer.write_length_coded_string(text, Encoding::Utf8),
                None => writer.write_null(),
            }
        }
        let buf = writer.finish(1).unwrap();
        let mut packet = Packet::parse(&buf).unwrap();

        let values = decode_text_row(&mut packet, &columns, &CodecConfig::default()).unwrap();
        assert_eq!(
            values,
            vec![
                Value::BigInt(Wide64::Decimal("18446744073709551615".to_string())),
                Value::Text("Zoë".to_string()),
                Value::Decimal("12.50".to_string()),
                Value::DateTime(DateTimeValue::Zero),
                Value::Null,
                Value::Double(0.5),
            ]
        );
    }

    #[test]
    fn test_text_bigint_string_mode() {
        let columns = [ColumnDef::new("n", FieldType::LongLong)];
        let mut writer = PacketWriter::new();
        writer.write_length_coded_string("42", Encoding::Utf8);
        let buf = writer.finish(0).unwrap();
        let mut packet = Packet::parse(&buf).unwrap();

        let values = decode_text_row(&mut packet, &columns, &CodecConfig::default()).unwrap();
        assert_eq!(values[0], Value::BigInt(Wide64::Signed(42)));
        let config = CodecConfig::new().big_number_strings(true);
        let values = decode_text_row(&mut packet, &columns, &config).unwrap();
        assert_eq!(values[0], Value::BigInt(Wide64::Decimal("42".to_string())));
    }
}
