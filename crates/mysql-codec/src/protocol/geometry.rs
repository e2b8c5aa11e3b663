//! Geometry values.
//!
//! A geometry column arrives as a length-coded blob: a 4-byte SRID followed
//! by Well-Known Binary. Each WKB geometry carries its own byte-order flag
//! (0 = big-endian) and a 4-byte type tag.

#![allow(clippy::cast_possible_truncation)]

use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

use crate::error::{ProtocolError, ProtocolErrorKind, Result};
use crate::protocol::{Packet, PacketWriter};

/// Nesting limit for collections inside collections.
const MAX_DEPTH: usize = 64;

const WKB_POINT: u32 = 1;
const WKB_LINE_STRING: u32 = 2;
const WKB_POLYGON: u32 = 3;

/// Size of a WKB point payload (two f64).
const POINT_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// WKB type tags 4-7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    MultiPoint = 4,
    MultiLineString = 5,
    MultiPolygon = 6,
    GeometryCollection = 7,
}

impl CollectionKind {
    fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            4 => Some(CollectionKind::MultiPoint),
            5 => Some(CollectionKind::MultiLineString),
            6 => Some(CollectionKind::MultiPolygon),
            7 => Some(CollectionKind::GeometryCollection),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    LineString(Vec<Point>),
    /// Rings; the first is the exterior
    Polygon(Vec<Vec<Point>>),
    Collection {
        kind: CollectionKind,
        members: Vec<Geometry>,
    },
}

impl Geometry {
    fn type_tag(&self) -> u32 {
        match self {
            Geometry::Point(_) => WKB_POINT,
            Geometry::LineString(_) => WKB_LINE_STRING,
            Geometry::Polygon(_) => WKB_POLYGON,
            Geometry::Collection { kind, .. } => *kind as u32,
        }
    }

    /// Append little-endian WKB for this geometry.
    pub fn write_wkb(&self, out: &mut Vec<u8>) {
        out.push(1);
        out.extend_from_slice(&self.type_tag().to_le_bytes());
        match self {
            Geometry::Point(p) => write_point(out, *p),
            Geometry::LineString(points) => write_points(out, points),
            Geometry::Polygon(rings) => {
                write_count(out, rings.len());
                for ring in rings {
                    write_points(out, ring);
                }
            }
            Geometry::Collection { members, .. } => {
                write_count(out, members.len());
                for member in members {
                    member.write_wkb(out);
                }
            }
        }
    }

    /// Parse one WKB geometry (no SRID prefix).
    pub fn from_wkb(bytes: &[u8]) -> Result<Self> {
        let mut reader = WkbReader {
            bytes,
            pos: 0,
            base: 0,
            big_endian: false,
        };
        reader.geometry(0)
    }
}

fn write_count(out: &mut Vec<u8>, count: usize) {
    out.extend_from_slice(&(count as u32).to_le_bytes());
}

fn write_point(out: &mut Vec<u8>, point: Point) {
    out.extend_from_slice(&point.x.to_le_bytes());
    out.extend_from_slice(&point.y.to_le_bytes());
}

fn write_points(out: &mut Vec<u8>, points: &[Point]) {
    write_count(out, points.len());
    for p in points {
        write_point(out, *p);
    }
}

/// Points serialize as `{x, y}`, everything else as nested arrays.
impl Serialize for Geometry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Geometry::Point(p) => p.serialize(serializer),
            Geometry::LineString(points) => points.serialize(serializer),
            Geometry::Polygon(rings) => rings.serialize(serializer),
            Geometry::Collection { members, .. } => {
                let mut seq = serializer.serialize_seq(Some(members.len()))?;
                for member in members {
                    seq.serialize_element(member)?;
                }
                seq.end()
            }
        }
    }
}

/// Cursor over a WKB blob. Offsets in errors are absolute (`base + pos`).
struct WkbReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    base: usize,
    big_endian: bool,
}

impl WkbReader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let available = self.bytes.len() - self.pos;
        if N > available {
            return Err(ProtocolError::new(
                ProtocolErrorKind::UnexpectedEof {
                    needed: N,
                    available,
                },
                self.base + self.pos,
            )
            .into());
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    fn u32(&mut self) -> Result<u32> {
        let raw = self.take::<4>()?;
        Ok(if self.big_endian {
            u32::from_be_bytes(raw)
        } else {
            u32::from_le_bytes(raw)
        })
    }

    fn f64(&mut self) -> Result<f64> {
        let raw = self.take::<8>()?;
        Ok(if self.big_endian {
            f64::from_be_bytes(raw)
        } else {
            f64::from_le_bytes(raw)
        })
    }

    fn point(&mut self) -> Result<Point> {
        Ok(Point {
            x: self.f64()?,
            y: self.f64()?,
        })
    }

    /// Read a count and pre-size a vec without trusting the count for memory.
    fn counted<T>(&mut self, min_item_size: usize) -> Result<(usize, Vec<T>)> {
        let count = self.u32()? as usize;
        let room = (self.bytes.len() - self.pos) / min_item_size.max(1);
        Ok((count, Vec::with_capacity(count.min(room))))
    }

    fn points(&mut self) -> Result<Vec<Point>> {
        let (count, mut points) = self.counted(POINT_SIZE)?;
        for _ in 0..count {
            points.push(self.point()?);
        }
        Ok(points)
    }

    fn geometry(&mut self, depth: usize) -> Result<Geometry> {
        if depth > MAX_DEPTH {
            return Err(ProtocolError::malformed(
                self.base + self.pos,
                "geometry collections nested too deeply",
            )
            .into());
        }
        let [order] = self.take::<1>()?;
        self.big_endian = order == 0;
        let at = self.base + self.pos;
        let tag = self.u32()?;
        let geometry = match tag {
            WKB_POINT => Geometry::Point(self.point()?),
            WKB_LINE_STRING => Geometry::LineString(self.points()?),
            WKB_POLYGON => {
                let (count, mut rings) = self.counted(4)?;
                for _ in 0..count {
                    rings.push(self.points()?);
                }
                Geometry::Polygon(rings)
            }
            _ => {
                let Some(kind) = CollectionKind::from_tag(tag) else {
                    return Err(
                        ProtocolError::new(ProtocolErrorKind::UnknownGeometryType(tag), at).into(),
                    );
                };
                // Smallest member is a 1-byte order flag plus a 4-byte tag.
                let (count, mut members) = self.counted(5)?;
                for _ in 0..count {
                    members.push(self.geometry(depth + 1)?);
                }
                Geometry::Collection { kind, members }
            }
        };
        Ok(geometry)
    }
}

impl Packet<'_> {
    /// Read a length-coded geometry blob (SRID + WKB).
    ///
    /// SQL NULL and an empty blob both yield `None`.
    pub fn read_geometry(&mut self) -> Result<Option<Geometry>> {
        let Some(blob) = self.read_length_coded_buffer()? else {
            return Ok(None);
        };
        if blob.is_empty() {
            return Ok(None);
        }
        let base = self.offset() - blob.len();
        let mut reader = WkbReader {
            bytes: blob,
            pos: 0,
            base,
            big_endian: false,
        };
        // SRID; not used by the decoded value.
        reader.take::<4>()?;
        let geometry = reader.geometry(0)?;
        tracing::trace!(offset = base, len = blob.len(), "decoded geometry");
        Ok(Some(geometry))
    }
}

impl PacketWriter {
    /// Write a geometry as a length-coded SRID + little-endian WKB blob.
    pub fn write_geometry(&mut self, srid: u32, geometry: &Geometry) {
        let mut blob = srid.to_le_bytes().to_vec();
        geometry.write_wkb(&mut blob);
        self.write_length_coded_buffer(&blob);
    }
}
