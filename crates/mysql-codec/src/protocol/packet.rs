//! Packet views and primitive reads.
//!
//! A [`Packet`] is a cursor over one packet inside a shared byte buffer. It
//! never copies the buffer: cloning a packet produces an independent cursor
//! over the same storage with the same range and offset.

use crate::error::{ProtocolError, ProtocolErrorKind, Result};
use crate::protocol::{Encoding, MAX_SAFE_INTEGER, PacketHeader, PacketType};

/// A read cursor over a single packet (header included) in a byte buffer.
#[derive(Debug, Clone)]
pub struct Packet<'a> {
    sequence_id: u8,
    buffer: &'a [u8],
    start: usize,
    end: usize,
    offset: usize,
    exact_integer_limit: u64,
}

impl<'a> Packet<'a> {
    /// Create a view over `buffer[start..end]`, positioned just past the header.
    pub fn new(sequence_id: u8, buffer: &'a [u8], start: usize, end: usize) -> Result<Self> {
        if end > buffer.len() {
            return Err(ProtocolError::new(
                ProtocolErrorKind::UnexpectedEof {
                    needed: end - start.min(end),
                    available: buffer.len().saturating_sub(start),
                },
                start,
            )
            .into());
        }
        if start + PacketHeader::SIZE > end {
            return Err(
                ProtocolError::malformed(start, "packet range shorter than its header").into(),
            );
        }
        Ok(Self {
            sequence_id,
            buffer,
            start,
            end,
            offset: start + PacketHeader::SIZE,
            exact_integer_limit: MAX_SAFE_INTEGER,
        })
    }

    /// Parse the header at the front of `buffer` and view the packet it frames.
    pub fn parse(buffer: &'a [u8]) -> Result<Self> {
        let Some(header_bytes) = buffer.first_chunk::<4>() else {
            return Err(ProtocolError::new(
                ProtocolErrorKind::UnexpectedEof {
                    needed: PacketHeader::SIZE,
                    available: buffer.len(),
                },
                0,
            )
            .into());
        };
        let header = PacketHeader::from_bytes(header_bytes);
        let end = PacketHeader::SIZE + header.payload_length as usize;
        Self::new(header.sequence_id, buffer, 0, end)
    }

    /// Override the largest magnitude returned as an exact integer by the
    /// number-mode 64-bit reads (see [`crate::protocol::Wide64`]).
    pub fn with_exact_integer_limit(mut self, limit: u64) -> Self {
        self.exact_integer_limit = limit;
        self
    }

    pub fn set_exact_integer_limit(&mut self, limit: u64) {
        self.exact_integer_limit = limit;
    }

    pub fn exact_integer_limit(&self) -> u64 {
        self.exact_integer_limit
    }

    pub fn sequence_id(&self) -> u8 {
        self.sequence_id
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Current absolute offset in the backing buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Move the cursor to an absolute offset within the payload.
    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset < self.start + PacketHeader::SIZE || offset > self.end {
            return Err(ProtocolError::malformed(offset, "seek outside packet payload").into());
        }
        self.offset = offset;
        Ok(())
    }

    /// Rewind to the first payload byte.
    pub fn reset(&mut self) {
        self.offset = self.start + PacketHeader::SIZE;
    }

    /// Packet length including the header.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.payload_len() == 0
    }

    pub fn payload_len(&self) -> usize {
        self.len() - PacketHeader::SIZE
    }

    /// The whole payload, independent of the cursor.
    pub fn payload(&self) -> &'a [u8] {
        &self.buffer[self.start + PacketHeader::SIZE..self.end]
    }

    /// Bytes left between the cursor and the end of the packet.
    pub fn remaining(&self) -> usize {
        self.end - self.offset
    }

    pub fn have_more_data(&self) -> bool {
        self.offset < self.end
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        let available = self.remaining();
        if needed > available {
            return Err(ProtocolError::new(
                ProtocolErrorKind::UnexpectedEof { needed, available },
                self.offset,
            )
            .into());
        }
        Ok(())
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buffer[self.offset..self.offset + N]);
        self.offset += N;
        Ok(out)
    }

    /// Peek at the next byte without advancing.
    pub fn peek_byte(&self) -> Option<u8> {
        if self.offset < self.end {
            Some(self.buffer[self.offset])
        } else {
            None
        }
    }

    /// Skip a number of bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.offset += n;
        Ok(())
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.take::<1>()?;
        Ok(b)
    }

    /// Read a u16 (little-endian).
    pub fn read_u16_le(&mut self) -> Result<u16> {
        self.take::<2>().map(u16::from_le_bytes)
    }

    /// Read a u24 (little-endian, 3 bytes).
    pub fn read_u24_le(&mut self) -> Result<u32> {
        let [a, b, c] = self.take::<3>()?;
        Ok(u32::from_le_bytes([a, b, c, 0]))
    }

    /// Read a u32 (little-endian).
    pub fn read_u32_le(&mut self) -> Result<u32> {
        self.take::<4>().map(u32::from_le_bytes)
    }

    /// Read a u64 (little-endian).
    pub fn read_u64_le(&mut self) -> Result<u64> {
        self.take::<8>().map(u64::from_le_bytes)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.take::<1>().map(i8::from_le_bytes)
    }

    pub fn read_i16_le(&mut self) -> Result<i16> {
        self.take::<2>().map(i16::from_le_bytes)
    }

    /// Read a sign-extended 24-bit integer.
    pub fn read_i24_le(&mut self) -> Result<i32> {
        let raw = self.read_u24_le()?;
        Ok(((raw << 8) as i32) >> 8)
    }

    pub fn read_i32_le(&mut self) -> Result<i32> {
        self.take::<4>().map(i32::from_le_bytes)
    }

    pub fn read_i64_le(&mut self) -> Result<i64> {
        self.take::<8>().map(i64::from_le_bytes)
    }

    pub fn read_f32_le(&mut self) -> Result<f32> {
        self.take::<4>().map(f32::from_le_bytes)
    }

    pub fn read_f64_le(&mut self) -> Result<f64> {
        self.take::<8>().map(f64::from_le_bytes)
    }

    /// Read a fixed number of bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        let bytes = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    /// Read everything up to the end of the packet.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.buffer[self.offset..self.end];
        self.offset = self.end;
        rest
    }

    /// Read bytes up to a NUL terminator, consuming the terminator.
    pub fn read_null_terminated_bytes(&mut self) -> Result<&'a [u8]> {
        let window = &self.buffer[self.offset..self.end];
        let Some(len) = window.iter().position(|&b| b == 0) else {
            return Err(
                ProtocolError::malformed(self.offset, "missing NUL terminator").into(),
            );
        };
        self.offset += len + 1;
        Ok(&window[..len])
    }

    /// Read a null-terminated string.
    pub fn read_null_terminated_string(&mut self, encoding: Encoding) -> Result<String> {
        self.read_null_terminated_bytes()
            .map(|bytes| encoding.decode(bytes))
    }

    /// Read a fixed-length string.
    pub fn read_fixed_string(&mut self, len: usize, encoding: Encoding) -> Result<String> {
        self.read_bytes(len).map(|bytes| encoding.decode(bytes))
    }

    /// Read remaining data as a string.
    pub fn read_rest_string(&mut self, encoding: Encoding) -> String {
        encoding.decode(self.read_rest())
    }

    fn first_byte(&self) -> Option<u8> {
        self.payload().first().copied()
    }

    /// Classify the packet from its first payload byte.
    #[allow(clippy::cast_possible_truncation)]
    pub fn packet_type(&self) -> Option<PacketType> {
        self.first_byte()
            .map(|b| PacketType::from_first_byte(b, self.payload_len() as u32))
    }

    pub fn is_ok(&self) -> bool {
        self.packet_type() == Some(PacketType::Ok)
    }

    pub fn is_error(&self) -> bool {
        self.packet_type() == Some(PacketType::Error)
    }

    pub fn is_eof(&self) -> bool {
        self.packet_type() == Some(PacketType::Eof)
    }

    /// Whether the byte at the cursor is 0xFE (EOF or auth switch).
    pub fn is_alt(&self) -> bool {
        self.peek_byte() == Some(0xFE)
    }

    /// Warning count of an EOF packet, read without moving the cursor.
    pub fn eof_warning_count(&self) -> Result<u16> {
        let mut probe = self.clone();
        probe.reset();
        probe.skip(1)?;
        probe.read_u16_le()
    }

    /// Status flags of an EOF packet, read without moving the cursor.
    pub fn eof_status_flags(&self) -> Result<u16> {
        let mut probe = self.clone();
        probe.reset();
        probe.skip(3)?;
        probe.read_u16_le()
    }
}

/// Iterator over the complete packets in a buffer of concatenated packets.
#[derive(Debug, Clone)]
pub struct Packets<'a> {
    buffer: &'a [u8],
    pos: usize,
}

/// View each complete packet in `buffer`. A trailing partial packet is left
/// unconsumed; [`Packets::consumed`] reports where it starts.
pub fn packets(buffer: &[u8]) -> Packets<'_> {
    Packets { buffer, pos: 0 }
}

impl Packets<'_> {
    /// Bytes covered by the packets yielded so far.
    pub fn consumed(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for Packets<'a> {
    type Item = Packet<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let header_bytes = self.buffer.get(self.pos..)?.first_chunk::<4>()?;
        let header = PacketHeader::from_bytes(header_bytes);
        let end = self.pos + PacketHeader::SIZE + header.payload_length as usize;
        if end > self.buffer.len() {
            tracing::trace!(
                start = self.pos,
                needed = end - self.buffer.len(),
                "partial packet at end of buffer"
            );
            return None;
        }
        let packet = Packet::new(header.sequence_id, self.buffer, self.pos, end).ok()?;
        tracing::trace!(
            sequence_id = header.sequence_id,
            start = self.pos,
            len = header.payload_length,
            "framed packet"
        );
        self.pos = end;
        Some(packet)
    }
}

#[cfg(test)]
pub(crate) fn frame(sequence_id: u8, payload: &[u8]) -> Vec<u8> {
    let header = PacketHeader {
        payload_length: u32::try_from(payload.len()).unwrap(),
        sequence_id,
    };
    let mut out = header.to_bytes().to_vec();
    out.extend_from_slice(payload);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_read_u8() {
        let buf = frame(0, &[0x42, 0x43]);
        let mut packet = Packet::parse(&buf).unwrap();
        assert_eq!(packet.read_u8().unwrap(), 0x42);
        assert_eq!(packet.read_u8().unwrap(), 0x43);
        assert!(packet.read_u8().is_err());
    }

    #[test]
    fn test_fixed_width_reads() {
        let buf = frame(
            0,
            &[
                0x34, 0x12, // u16
                0x56, 0x34, 0x12, // u24
                0x78, 0x56, 0x34, 0x12, // u32
                0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, // u64
            ],
        );
        let mut packet = Packet::parse(&buf).unwrap();
        assert_eq!(packet.read_u16_le().unwrap(), 0x1234);
        assert_eq!(packet.read_u24_le().unwrap(), 0x0012_3456);
        assert_eq!(packet.read_u32_le().unwrap(), 0x1234_5678);
        assert_eq!(packet.read_u64_le().unwrap(), 0x0807_0605_0403_0201);
        assert!(!packet.have_more_data());
    }

    #[test]
    fn test_signed_reads() {
        let buf = frame(0, &[0xFF, 0xFE, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x80]);
        let mut packet = Packet::parse(&buf).unwrap();
        assert_eq!(packet.read_i8().unwrap(), -1);
        assert_eq!(packet.read_i16_le().unwrap(), -2);
        assert_eq!(packet.read_i24_le().unwrap(), -1);
        assert_eq!(packet.read_i24_le().unwrap(), -0x80_0000);
    }

    #[test]
    fn test_float_reads() {
        let mut payload = 1.5f32.to_le_bytes().to_vec();
        payload.extend_from_slice(&(-2.25f64).to_le_bytes());
        let buf = frame(0, &payload);
        let mut packet = Packet::parse(&buf).unwrap();
        assert!((packet.read_f32_le().unwrap() - 1.5).abs() < f32::EPSILON);
        assert!((packet.read_f64_le().unwrap() + 2.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_exact_boundary_reads() {
        let buf = frame(0, &[1, 2, 3, 4]);
        let mut packet = Packet::parse(&buf).unwrap();
        assert_eq!(packet.read_u32_le().unwrap(), 0x0403_0201);
        assert_eq!(packet.offset(), packet.end());

        packet.reset();
        packet.skip(1).unwrap();
        let err = packet.read_u32_le().unwrap_err();
        match err {
            Error::Protocol(e) => {
                assert_eq!(
                    e.kind,
                    ProtocolErrorKind::UnexpectedEof {
                        needed: 4,
                        available: 3
                    }
                );
                assert_eq!(e.offset, 5);
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
        // Failed read leaves the cursor in place.
        assert_eq!(packet.offset(), 5);
    }

    #[test]
    fn test_reads_stay_inside_packet_range() {
        // Two packets back to back; the first must not read into the second.
        let mut buf = frame(0, &[0xAA]);
        buf.extend(frame(1, &[0xBB, 0xCC]));
        let mut iter = packets(&buf);
        let mut first = iter.next().unwrap();
        assert_eq!(first.read_u8().unwrap(), 0xAA);
        assert!(first.read_u8().is_err());

        let mut second = iter.next().unwrap();
        assert_eq!(second.sequence_id(), 1);
        assert_eq!(second.read_u16_le().unwrap(), 0xCCBB);
        assert!(iter.next().is_none());
        assert_eq!(iter.consumed(), buf.len());
    }

    #[test]
    fn test_partial_trailing_packet() {
        let mut buf = frame(0, b"ok");
        let complete = buf.len();
        buf.extend_from_slice(&[0x05, 0x00, 0x00, 0x01, b'x']);
        let mut iter = packets(&buf);
        assert!(iter.next().is_some());
        assert!(iter.next().is_none());
        assert_eq!(iter.consumed(), complete);
    }

    #[test]
    fn test_null_terminated_and_fixed_strings() {
        let buf = frame(0, b"hello\0worldabc");
        let mut packet = Packet::parse(&buf).unwrap();
        assert_eq!(
            packet.read_null_terminated_string(Encoding::Utf8).unwrap(),
            "hello"
        );
        assert_eq!(packet.read_fixed_string(5, Encoding::Utf8).unwrap(), "world");
        assert!(packet.read_null_terminated_string(Encoding::Utf8).is_err());
        assert_eq!(packet.read_rest_string(Encoding::Utf8), "abc");
    }

    #[test]
    fn test_peek_reset_and_clone() {
        let buf = frame(3, &[0x01, 0x02]);
        let mut packet = Packet::parse(&buf).unwrap();
        assert_eq!(packet.peek_byte(), Some(0x01));
        assert_eq!(packet.read_u8().unwrap(), 0x01);

        let mut copy = packet.clone();
        assert_eq!(copy.offset(), packet.offset());
        assert_eq!(copy.read_u8().unwrap(), 0x02);
        // The original cursor is unaffected by reads through the clone.
        assert_eq!(packet.peek_byte(), Some(0x02));

        packet.reset();
        assert_eq!(packet.offset(), 4);
        assert_eq!(packet.sequence_id(), 3);
    }

    #[test]
    fn test_invalid_ranges() {
        let buf = [0u8; 6];
        assert!(Packet::new(0, &buf, 0, 7).is_err());
        assert!(Packet::new(0, &buf, 4, 6).is_err());
        assert!(Packet::parse(&[0x01, 0x00]).is_err());
        // Header claims more payload than the buffer holds.
        assert!(Packet::parse(&[0x05, 0x00, 0x00, 0x00, 0x01]).is_err());
    }

    #[test]
    fn test_eof_classification() {
        let buf = frame(5, &[0xFE, 0x02, 0x00, 0x08, 0x00]);
        let packet = Packet::parse(&buf).unwrap();
        assert!(packet.is_eof());
        assert!(packet.is_alt());
        assert!(!packet.is_error());
        assert_eq!(packet.eof_warning_count().unwrap(), 2);
        assert_eq!(packet.eof_status_flags().unwrap(), 8);
        assert_eq!(packet.offset(), 4);
    }
}
