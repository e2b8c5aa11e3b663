//! Packet-level codec.
//!
//! Every packet is a 3-byte little-endian payload length, a 1-byte sequence
//! id, then the payload. A payload of `MAX_PACKET_SIZE` bytes or more is split
//! across consecutive packets.
//!
//! The payload is not self-describing: callers read fields in wire order,
//! choosing each typed read from column metadata received earlier.

pub mod charset;
pub mod error_codes;
pub mod geometry;
pub mod lenenc;
pub mod packet;
pub mod response;
pub mod temporal;
pub mod text;
pub mod wide;
pub mod writer;

pub use charset::Encoding;
pub use error_codes::error_name;
pub use geometry::{CollectionKind, Geometry, Point};
pub use lenenc::{length_coded_number_len, length_coded_string_len};
pub use packet::{Packet, Packets, packets};
pub use response::ErrPacket;
pub use temporal::{DateTimeParts, DateTimeValue, TimeParts};
pub use wide::{MAX_SAFE_INTEGER, Wide64};
pub use writer::{PacketWriter, frame_payload};

/// Largest payload one packet can frame (2^24 - 1 bytes).
pub const MAX_PACKET_SIZE: usize = 0xFF_FF_FF;

/// Length-coded marker for SQL NULL.
pub const NULL_MARKER: u8 = 0xFB;

/// Status flags carried by OK and EOF packets.
pub mod server_status {
    pub const SERVER_STATUS_IN_TRANS: u16 = 0x0001;
    pub const SERVER_STATUS_AUTOCOMMIT: u16 = 0x0002;
    pub const SERVER_MORE_RESULTS_EXISTS: u16 = 0x0008;
    pub const SERVER_STATUS_CURSOR_EXISTS: u16 = 0x0040;
    pub const SERVER_STATUS_LAST_ROW_SENT: u16 = 0x0080;
    pub const SERVER_PS_OUT_PARAMS: u16 = 0x1000;
}

/// The 4-byte frame in front of every payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// 24-bit little-endian payload length
    pub payload_length: u32,
    /// Wrapping packet counter
    pub sequence_id: u8,
}

impl PacketHeader {
    pub const SIZE: usize = 4;

    pub fn from_bytes(bytes: &[u8; 4]) -> Self {
        let [b0, b1, b2, sequence_id] = *bytes;
        Self {
            payload_length: u32::from_le_bytes([b0, b1, b2, 0]),
            sequence_id,
        }
    }

    pub fn to_bytes(&self) -> [u8; 4] {
        let [b0, b1, b2, _] = self.payload_length.to_le_bytes();
        [b0, b1, b2, self.sequence_id]
    }
}

/// Classification of a response by its first payload byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    /// 0x00
    Ok,
    /// 0xFF
    Error,
    /// 0xFE with a payload shorter than 9 bytes
    Eof,
    /// 0xFB, the server asking for a local file
    LocalInfile,
    /// Anything else: column definitions, rows
    Data,
}

impl PacketType {
    pub fn from_first_byte(byte: u8, payload_len: u32) -> Self {
        match byte {
            0x00 => PacketType::Ok,
            0xFF => PacketType::Error,
            // A row may also start with 0xFE (8-byte length-coded field).
            0xFE if payload_len < 9 => PacketType::Eof,
            NULL_MARKER => PacketType::LocalInfile,
            _ => PacketType::Data,
        }
    }
}

/// Decoded OK packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OkPacket {
    pub affected_rows: u64,
    pub last_insert_id: u64,
    pub status_flags: u16,
    pub warnings: u16,
    /// Human-readable trailer such as "Rows matched: 1"
    pub info: String,
}

/// Decoded EOF packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EofPacket {
    pub warnings: u16,
    pub status_flags: u16,
}

impl EofPacket {
    /// Whether the server announced another result set.
    pub fn has_more_results(&self) -> bool {
        self.status_flags & server_status::SERVER_MORE_RESULTS_EXISTS != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_bytes() {
        let header = PacketHeader {
            payload_length: 0x0012_3456,
            sequence_id: 7,
        };
        assert_eq!(header.to_bytes(), [0x56, 0x34, 0x12, 7]);
        assert_eq!(PacketHeader::from_bytes(&header.to_bytes()), header);

        let full = PacketHeader::from_bytes(&[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(full.payload_length as usize, MAX_PACKET_SIZE);
        assert_eq!(full.sequence_id, 255);
    }

    #[test]
    fn test_classify_first_byte() {
        let cases = [
            (0x00, 7, PacketType::Ok),
            (0xFF, 20, PacketType::Error),
            (0xFE, 5, PacketType::Eof),
            (0xFE, 9, PacketType::Data),
            (0xFB, 12, PacketType::LocalInfile),
            (0x03, 4, PacketType::Data),
        ];
        for (byte, len, expected) in cases {
            assert_eq!(PacketType::from_first_byte(byte, len), expected, "0x{byte:02x}");
        }
    }

    #[test]
    fn test_eof_more_results() {
        let eof = EofPacket {
            warnings: 0,
            status_flags: server_status::SERVER_MORE_RESULTS_EXISTS
                | server_status::SERVER_STATUS_AUTOCOMMIT,
        };
        assert!(eof.has_more_results());
        assert!(
            !EofPacket {
                warnings: 1,
                status_flags: server_status::SERVER_STATUS_IN_TRANS,
            }
            .has_more_results()
        );
    }
}
