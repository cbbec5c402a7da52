//! Feature decoding and materialization.
//!
//! A raw feature is decoded lazily from its recorded byte offset, its
//! property index pairs are resolved against the owning layer's
//! dictionaries, and its geometry command stream is turned into either a
//! flat render-oriented buffer or a fully-typed [`Geometry`], with the
//! caller-supplied [`Transform`] applied to every coordinate pair.

use alloc::vec::Vec;

use crate::cursor::Cursor;
use crate::error::{DecodeError, ErrorKind};
use crate::geometry::{self, GeometryBuffer};
use crate::layer::RawLayer;
use crate::options::{FeatureMode, ReadOptions};
use crate::value::{Map, Value};
use crate::walker::{self, WireType};

const FEATURE_ID: u64 = 1;
const FEATURE_TAGS: u64 = 2;
const FEATURE_TYPE: u64 = 3;
const FEATURE_GEOMETRY: u64 = 4;

/// Geometry type code meaning "no geometry"; such features are discarded.
const GEOM_UNKNOWN: u64 = 0;
const GEOM_POINT: u64 = 1;
const GEOM_LINESTRING: u64 = 2;
const GEOM_POLYGON: u64 = 3;

/// Maps one tile-local point, given the owning layer's extent, to the
/// target coordinate system.
///
/// The blanket impl lets any matching closure serve as a transform:
///
/// ```rust
/// use mvtile::Transform;
///
/// let unit = |point: [f64; 2], extent: u32| {
///     [point[0] / f64::from(extent), point[1] / f64::from(extent)]
/// };
/// assert_eq!(unit.apply([2048.0, 1024.0], 4096), [0.5, 0.25]);
/// ```
pub trait Transform {
    fn apply(&self, point: [f64; 2], extent: u32) -> [f64; 2];
}

impl<F> Transform for F
where
    F: Fn([f64; 2], u32) -> [f64; 2],
{
    fn apply(&self, point: [f64; 2], extent: u32) -> [f64; 2] {
        self(point, extent)
    }
}

/// Geometry type tag of a decoded feature.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryType {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
}

/// A fully-typed geometry, produced in [`FeatureMode::Full`].
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point([f64; 2]),
    MultiPoint(Vec<[f64; 2]>),
    LineString(Vec<[f64; 2]>),
    MultiLineString(Vec<Vec<[f64; 2]>>),
    /// One exterior ring followed by zero or more interior rings.
    Polygon(Vec<Vec<[f64; 2]>>),
    MultiPolygon(Vec<Vec<Vec<[f64; 2]>>>),
}

impl Geometry {
    #[must_use]
    pub fn kind(&self) -> GeometryType {
        match self {
            Self::Point(_) => GeometryType::Point,
            Self::MultiPoint(_) => GeometryType::MultiPoint,
            Self::LineString(_) => GeometryType::LineString,
            Self::MultiLineString(_) => GeometryType::MultiLineString,
            Self::Polygon(_) => GeometryType::Polygon,
            Self::MultiPolygon(_) => GeometryType::MultiPolygon,
        }
    }
}

/// Geometry payload in the materialization selected by
/// [`ReadOptions::mode`].
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    /// Flat transformed coordinates (interleaved x,y) plus subpath end
    /// offsets into them.
    Render {
        kind: GeometryType,
        coords: Vec<f64>,
        ends: Vec<usize>,
    },
    /// Fully-typed geometry.
    Full(Geometry),
}

impl FeatureGeometry {
    #[must_use]
    pub fn kind(&self) -> GeometryType {
        match self {
            Self::Render { kind, .. } => *kind,
            Self::Full(geometry) => geometry.kind(),
        }
    }
}

/// One decoded feature: the externally visible unit of a tile.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Either the native wire id or the value of the configured
    /// [`id_property`](ReadOptions::id_property).
    pub id: Option<Value>,
    /// Resolved properties, including the injected layer name.
    pub properties: Map,
    pub geometry: FeatureGeometry,
}

/// One feature message as read off the wire; property pairs stay as
/// dictionary indices and the geometry stays a byte offset until
/// materialization.
#[derive(Debug)]
struct RawFeature {
    id: Option<u64>,
    geom_type: u64,
    geometry: Option<usize>,
    tags: Vec<(u64, u64)>,
}

fn read_raw_feature(cursor: &mut Cursor<'_>, offset: usize) -> Result<RawFeature, DecodeError> {
    cursor.seek(offset);
    let end = walker::message_end(cursor)?;
    let mut raw = RawFeature {
        id: None,
        geom_type: GEOM_UNKNOWN,
        geometry: None,
        tags: Vec::new(),
    };
    walker::walk(cursor, end, |field, wire_type, cursor| {
        match (field, wire_type) {
            (FEATURE_ID, WireType::Varint) => raw.id = Some(cursor.read_varint()?),
            (FEATURE_TAGS, WireType::LengthDelimited) => {
                let end = walker::message_end(cursor)?;
                while cursor.pos() < end {
                    let key = cursor.read_varint()?;
                    let value = cursor.read_varint()?;
                    raw.tags.push((key, value));
                }
                if cursor.pos() > end {
                    return Err(DecodeError::new(
                        ErrorKind::MalformedMessage("dangling property index pair"),
                        end,
                    ));
                }
            }
            (FEATURE_TYPE, WireType::Varint) => raw.geom_type = cursor.read_varint()?,
            (FEATURE_GEOMETRY, WireType::LengthDelimited) => {
                raw.geometry = Some(cursor.pos());
                walker::skip_value(cursor, wire_type)?;
            }
            _ => walker::skip_value(cursor, wire_type)?,
        }
        Ok(())
    })?;
    Ok(raw)
}

fn resolve_properties(
    raw: &RawFeature,
    layer: &RawLayer,
    offset: usize,
) -> Result<Map, DecodeError> {
    let mut properties = Map::new();
    for &(key, value) in &raw.tags {
        let key = usize::try_from(key)
            .ok()
            .and_then(|i| layer.keys.get(i))
            .ok_or_else(|| {
                DecodeError::new(
                    ErrorKind::MalformedMessage("property key index out of range"),
                    offset,
                )
            })?;
        let value = usize::try_from(value)
            .ok()
            .and_then(|i| layer.values.get(i))
            .ok_or_else(|| {
                DecodeError::new(
                    ErrorKind::MalformedMessage("property value index out of range"),
                    offset,
                )
            })?;
        // Later pairs overwrite earlier occurrences of the same key.
        properties.insert(key.clone(), value.clone());
    }
    Ok(properties)
}

/// Decodes and materializes the feature at `offset`. Returns `None` for
/// features that carry no geometry (type code 0, or no geometry field);
/// that is a well-defined outcome of the format, not an error.
pub(crate) fn materialize<T>(
    cursor: &mut Cursor<'_>,
    layer: &RawLayer,
    offset: usize,
    options: &ReadOptions,
    transform: &T,
) -> Result<Option<Feature>, DecodeError>
where
    T: Transform + ?Sized,
{
    let raw = read_raw_feature(cursor, offset)?;
    if raw.geom_type > GEOM_POLYGON {
        return Err(DecodeError::new(
            ErrorKind::UnsupportedGeometryType(raw.geom_type),
            offset,
        ));
    }
    if raw.geom_type == GEOM_UNKNOWN {
        return Ok(None);
    }
    let Some(geometry_at) = raw.geometry else {
        return Ok(None);
    };

    let mut properties = resolve_properties(&raw, layer, offset)?;
    let id = match &options.id_property {
        Some(key) => properties.remove(key),
        None => raw.id.map(Value::Uint),
    };
    properties.insert(options.layer_key.clone(), Value::String(layer.name.clone()));

    cursor.seek(geometry_at);
    let geom = geometry::read_geometry(cursor)?;
    let (kind, groups) = match raw.geom_type {
        GEOM_POINT => (
            if geom.ends.len() == 1 {
                GeometryType::Point
            } else {
                GeometryType::MultiPoint
            },
            Vec::new(),
        ),
        GEOM_LINESTRING => (
            if geom.ends.len() == 1 {
                GeometryType::LineString
            } else {
                GeometryType::MultiLineString
            },
            Vec::new(),
        ),
        _ => {
            let groups = geometry::classify_rings(&geom.coords, &geom.ends);
            (
                if groups.len() > 1 {
                    GeometryType::MultiPolygon
                } else {
                    GeometryType::Polygon
                },
                groups,
            )
        }
    };

    let geometry = match options.mode {
        FeatureMode::Render => FeatureGeometry::Render {
            kind,
            coords: transformed_flat(&geom.coords, transform, layer.extent),
            ends: geom.ends,
        },
        FeatureMode::Full => {
            FeatureGeometry::Full(build_full(kind, &geom, &groups, transform, layer.extent))
        }
    };

    Ok(Some(Feature {
        id,
        properties,
        geometry,
    }))
}

#[allow(clippy::cast_precision_loss)]
fn transformed_pairs<T>(coords: &[i64], transform: &T, extent: u32) -> Vec<[f64; 2]>
where
    T: Transform + ?Sized,
{
    coords
        .chunks_exact(2)
        .map(|pair| transform.apply([pair[0] as f64, pair[1] as f64], extent))
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn transformed_flat<T>(coords: &[i64], transform: &T, extent: u32) -> Vec<f64>
where
    T: Transform + ?Sized,
{
    let mut out = Vec::with_capacity(coords.len());
    for pair in coords.chunks_exact(2) {
        let [x, y] = transform.apply([pair[0] as f64, pair[1] as f64], extent);
        out.push(x);
        out.push(y);
    }
    out
}

fn build_full<T>(
    kind: GeometryType,
    geom: &GeometryBuffer,
    groups: &[Vec<usize>],
    transform: &T,
    extent: u32,
) -> Geometry
where
    T: Transform + ?Sized,
{
    match kind {
        GeometryType::Point => Geometry::Point(
            transformed_pairs(&geom.coords, transform, extent)
                .into_iter()
                .next()
                .unwrap_or_default(),
        ),
        GeometryType::MultiPoint => {
            Geometry::MultiPoint(transformed_pairs(&geom.coords, transform, extent))
        }
        GeometryType::LineString => {
            Geometry::LineString(transformed_pairs(&geom.coords, transform, extent))
        }
        GeometryType::MultiLineString => {
            let mut lines = Vec::with_capacity(geom.ends.len());
            let mut start = 0;
            for &end in &geom.ends {
                lines.push(transformed_pairs(&geom.coords[start..end], transform, extent));
                start = end;
            }
            Geometry::MultiLineString(lines)
        }
        GeometryType::Polygon | GeometryType::MultiPolygon => {
            let mut polygons = Vec::with_capacity(groups.len());
            let mut start = 0;
            for group in groups {
                let mut rings = Vec::with_capacity(group.len());
                for &end in group {
                    rings.push(transformed_pairs(&geom.coords[start..end], transform, extent));
                    start = end;
                }
                polygons.push(rings);
            }
            if kind == GeometryType::MultiPolygon {
                Geometry::MultiPolygon(polygons)
            } else {
                Geometry::Polygon(polygons.pop().unwrap_or_default())
            }
        }
    }
}
