//! Packet construction.
//!
//! A [`PacketWriter`] reserves four header bytes up front and appends the
//! payload behind them; [`PacketWriter::write_header`] patches the length and
//! sequence id once the payload is complete.

#![allow(clippy::cast_possible_truncation)]

use crate::error::{ProtocolError, ProtocolErrorKind, Result};
use crate::protocol::{Encoding, MAX_PACKET_SIZE, PacketHeader};

/// A writer for one outgoing MySQL packet.
#[derive(Debug, Clone)]
pub struct PacketWriter {
    buffer: Vec<u8>,
}

impl Default for PacketWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketWriter {
    /// Create a new writer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a new writer with room for `capacity` payload bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut buffer = Vec::with_capacity(PacketHeader::SIZE + capacity);
        buffer.resize(PacketHeader::SIZE, 0);
        Self { buffer }
    }

    /// Payload length written so far.
    pub fn len(&self) -> usize {
        self.buffer.len() - PacketHeader::SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the payload, keeping the reserved header.
    pub fn clear(&mut self) {
        self.buffer.truncate(PacketHeader::SIZE);
    }

    /// The payload written so far.
    pub fn payload(&self) -> &[u8] {
        &self.buffer[PacketHeader::SIZE..]
    }

    /// The whole packet, header included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Write a single byte.
    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Write a u16 (little-endian).
    pub fn write_u16_le(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a u24 (little-endian, 3 bytes).
    pub fn write_u24_le(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes()[..3]);
    }

    /// Write a u32 (little-endian).
    pub fn write_u32_le(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a u64 (little-endian).
    pub fn write_u64_le(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i8(&mut self, value: i8) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i16_le(&mut self, value: i16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Write the low 24 bits of a signed value.
    pub fn write_i24_le(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_le_bytes()[..3]);
    }

    pub fn write_i32_le(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i64_le(&mut self, value: i64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32_le(&mut self, value: f32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f64_le(&mut self, value: f64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Write zeros (padding).
    pub fn write_zeros(&mut self, count: usize) {
        self.buffer.resize(self.buffer.len() + count, 0);
    }

    /// Write a string without terminator or length prefix.
    pub fn write_string(&mut self, s: &str, encoding: Encoding) {
        self.buffer.extend_from_slice(&encoding.encode(s));
    }

    /// Write a null-terminated string.
    pub fn write_null_terminated_string(&mut self, s: &str, encoding: Encoding) {
        self.write_string(s, encoding);
        self.buffer.push(0);
    }

    /// Write a fixed-length string, truncated or zero-padded to `len` bytes.
    pub fn write_fixed_string(&mut self, s: &str, len: usize, encoding: Encoding) {
        let bytes = encoding.encode(s);
        let take = bytes.len().min(len);
        self.buffer.extend_from_slice(&bytes[..take]);
        self.write_zeros(len - take);
    }

    /// Patch the reserved header with the payload length and `sequence_id`.
    pub fn write_header(&mut self, sequence_id: u8) -> Result<()> {
        let len = self.len();
        if len > MAX_PACKET_SIZE {
            return Err(
                ProtocolError::new(ProtocolErrorKind::PacketTooLarge(len), PacketHeader::SIZE)
                    .into(),
            );
        }
        let header = PacketHeader {
            payload_length: len as u32,
            sequence_id,
        };
        self.buffer[..PacketHeader::SIZE].copy_from_slice(&header.to_bytes());
        Ok(())
    }

    /// Patch the header and return the finished packet.
    pub fn finish(mut self, sequence_id: u8) -> Result<Vec<u8>> {
        self.write_header(sequence_id)?;
        tracing::trace!(sequence_id, len = self.len(), "built packet");
        Ok(self.buffer)
    }
}

/// Frame an arbitrarily large payload as one or more packets.
///
/// Payloads of `MAX_PACKET_SIZE` bytes or more are split into full-size
/// chunks with consecutive sequence ids; a payload that ends exactly on a
/// chunk boundary is followed by an empty packet.
pub fn frame_payload(payload: &[u8], mut sequence_id: u8) -> Vec<u8> {
    let chunks = payload.len() / MAX_PACKET_SIZE + 1;
    let mut out = Vec::with_capacity(payload.len() + chunks * PacketHeader::SIZE);
    let mut offset = 0;
    loop {
        let chunk_len = (payload.len() - offset).min(MAX_PACKET_SIZE);
        let header = PacketHeader {
            payload_length: chunk_len as u32,
            sequence_id,
        };
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&payload[offset..offset + chunk_len]);
        offset += chunk_len;
        sequence_id = sequence_id.wrapping_add(1);
        if chunk_len < MAX_PACKET_SIZE {
            break;
        }
    }
    out
}
