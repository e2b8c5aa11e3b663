//! Value-level codec for the MySQL binary wire protocol.
//!
//! This crate decodes and encodes the values carried inside MySQL client/server
//! packets. It does no I/O: callers hand it complete packets and get typed
//! values back. It provides:
//!
//! - Packet views with bounds-checked primitive reads, and a packet writer
//! - Length-coded integers and strings, with SQL NULL as `None`
//! - 64-bit integers that stay exact up to a configurable limit
//! - DATE/DATETIME/TIMESTAMP and TIME in their variable-length binary forms
//! - WKB geometry inside MySQL's SRID-prefixed blobs
//! - ERR/OK/EOF packets and the server error-code mnemonic table
//! - Column definitions and binary/text row decoding
//!
//! # Example
//!
//! ```rust
//! use mysql_codec::protocol::{Encoding, Packet, PacketWriter, Wide64};
//!
//! let mut writer = PacketWriter::new();
//! writer.write_length_coded_number(300);
//! writer.write_null();
//! writer.write_length_coded_string("hi", Encoding::Utf8);
//! let bytes = writer.finish(0)?;
//!
//! let mut packet = Packet::parse(&bytes)?;
//! assert_eq!(packet.read_length_coded_number(false, false)?, Some(Wide64::Unsigned(300)));
//! assert_eq!(packet.read_length_coded_number(false, false)?, None);
//! assert_eq!(packet.read_length_coded_string(Encoding::Utf8)?.as_deref(), Some("hi"));
//! # Ok::<(), mysql_codec::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod protocol;
pub mod types;
pub mod value;

pub use config::{CodecConfig, Timezone};
pub use error::{Error, Result};
pub use protocol::{ErrPacket, Packet, PacketWriter, Wide64};
pub use types::{ColumnDef, FieldType, decode_binary_row, decode_text_row};
pub use value::Value;
