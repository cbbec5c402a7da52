//! Geometry command stream decoding and ring classification.
//!
//! A feature's geometry field is a run of command integers
//! (`cmd = value & 0x7`, `repeat = value >> 3`) interleaved with zig-zag
//! delta-encoded coordinate pairs. Decoding produces one flat coordinate
//! buffer plus "ring end" offsets marking the exclusive end of each
//! subpath. For polygons the rings are then grouped into exterior/interior
//! sets by signed-area winding order.

use alloc::vec;
use alloc::vec::Vec;

use crate::cursor::Cursor;
use crate::error::{DecodeError, ErrorKind};
use crate::walker;

const MOVE_TO: u64 = 1;
const LINE_TO: u64 = 2;
const CLOSE_PATH: u64 = 7;

/// Flat decoded geometry: interleaved x,y pairs in tile-local integer
/// space, plus strictly increasing subpath end offsets whose final entry
/// equals `coords.len()`.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct GeometryBuffer {
    pub(crate) coords: Vec<i64>,
    pub(crate) ends: Vec<usize>,
}

/// Decodes the geometry command stream the cursor is positioned at (its
/// length prefix included).
pub(crate) fn read_geometry(cursor: &mut Cursor<'_>) -> Result<GeometryBuffer, DecodeError> {
    let end = walker::message_end(cursor)?;
    let mut geom = GeometryBuffer::default();
    let mut cmd = MOVE_TO;
    let mut repeat = 0u64;
    let (mut x, mut y) = (0i64, 0i64);
    // Start of the subpath currently being appended to.
    let mut current_end = 0usize;
    while cursor.pos() < end {
        if repeat == 0 {
            let at = cursor.pos();
            let command = cursor.read_varint()?;
            cmd = command & 0x7;
            repeat = command >> 3;
            match cmd {
                MOVE_TO | LINE_TO => {}
                CLOSE_PATH => {
                    // Materialize the implicit closing edge by duplicating
                    // the subpath's first point. Closing an empty subpath is
                    // a no-op, and repeats beyond the first would only stack
                    // duplicate points, so the count is consumed in one go.
                    if geom.coords.len() > current_end {
                        geom.coords.push(geom.coords[current_end]);
                        geom.coords.push(geom.coords[current_end + 1]);
                    }
                    repeat = 0;
                }
                _ => {
                    return Err(DecodeError::new(
                        ErrorKind::MalformedMessage("invalid geometry command"),
                        at,
                    ));
                }
            }
        } else {
            repeat -= 1;
            x = x.wrapping_add(cursor.read_svarint()?);
            y = y.wrapping_add(cursor.read_svarint()?);
            if cmd == MOVE_TO && geom.coords.len() > current_end {
                // A new subpath begins: close out the previous one.
                geom.ends.push(geom.coords.len());
                current_end = geom.coords.len();
            }
            geom.coords.push(x);
            geom.coords.push(y);
        }
    }
    if cursor.pos() > end {
        return Err(DecodeError::new(
            ErrorKind::MalformedMessage("geometry command overruns stream"),
            end,
        ));
    }
    if geom.coords.len() > current_end {
        geom.ends.push(geom.coords.len());
    }
    Ok(geom)
}

/// Partitions consecutive rings into polygons.
///
/// A ring with negative signed area (clockwise in the tile's y-down frame)
/// starts a new polygon as its exterior ring; a non-negative ring continues
/// the current polygon as an interior ring. Ring order and count are
/// preserved exactly, zero-area rings included, so consumers can rely on
/// index alignment with the flat buffer.
pub(crate) fn classify_rings(coords: &[i64], ends: &[usize]) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut start = 0usize;
    for &end in ends {
        let exterior = signed_area(&coords[start..end]) < 0.0;
        match groups.last_mut() {
            Some(group) if !exterior => group.push(end),
            _ => groups.push(vec![end]),
        }
        start = end;
    }
    groups
}

/// Signed shoelace area of one flat ring, in the tile's y-down frame:
/// clockwise rings come out negative. Rings with fewer than three points
/// are zero-area.
#[allow(clippy::cast_precision_loss)]
fn signed_area(ring: &[i64]) -> f64 {
    if ring.len() < 2 {
        return 0.0;
    }
    let (mut x1, mut y1) = (ring[ring.len() - 2] as f64, ring[ring.len() - 1] as f64);
    let mut sum = 0.0;
    for pair in ring.chunks_exact(2) {
        let (x2, y2) = (pair[0] as f64, pair[1] as f64);
        sum += (x2 - x1) * (y2 + y1);
        x1 = x2;
        y1 = y2;
    }
    sum * 0.5
}
