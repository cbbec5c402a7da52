//! Wire-format writers for tests and fuzzing.
//!
//! The crate ships no production encode path; these builders exist so the
//! test suite and the fuzz harness can construct tiles without binary
//! fixture files. Geometry methods take absolute tile-local points and
//! handle the delta/zig-zag encoding themselves.

use alloc::string::String;
use alloc::vec::Vec;

use crate::value::Value;

pub const GEOM_POINT: u64 = 1;
pub const GEOM_LINESTRING: u64 = 2;
pub const GEOM_POLYGON: u64 = 3;

pub fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        #[allow(clippy::cast_possible_truncation)]
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

pub fn write_svarint(buf: &mut Vec<u8>, value: i64) {
    #[allow(clippy::cast_sign_loss)]
    write_varint(buf, (value.wrapping_shl(1) ^ (value >> 63)) as u64);
}

pub fn write_tag(buf: &mut Vec<u8>, field: u64, wire_type: u64) {
    write_varint(buf, (field << 3) | wire_type);
}

pub fn write_varint_field(buf: &mut Vec<u8>, field: u64, value: u64) {
    write_tag(buf, field, 0);
    write_varint(buf, value);
}

pub fn write_len_field(buf: &mut Vec<u8>, field: u64, bytes: &[u8]) {
    write_tag(buf, field, 2);
    write_varint(buf, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Packs a geometry command integer.
#[must_use]
pub fn command(cmd: u64, count: u64) -> u64 {
    (count << 3) | cmd
}

/// Builds one feature message, tracking the running geometry position so
/// callers pass absolute points.
#[derive(Debug)]
pub struct FeatureBuilder {
    geom_type: u64,
    id: Option<u64>,
    tags: Vec<u64>,
    geometry: Vec<u8>,
    x: i64,
    y: i64,
}

impl FeatureBuilder {
    #[must_use]
    pub fn new(geom_type: u64) -> Self {
        Self {
            geom_type,
            id: None,
            tags: Vec::new(),
            geometry: Vec::new(),
            x: 0,
            y: 0,
        }
    }

    #[must_use]
    pub fn id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Appends one key/value dictionary index pair.
    #[must_use]
    pub fn tag(mut self, key: u64, value: u64) -> Self {
        self.tags.push(key);
        self.tags.push(value);
        self
    }

    #[must_use]
    pub fn move_to(self, points: &[(i64, i64)]) -> Self {
        self.path(1, points)
    }

    #[must_use]
    pub fn line_to(self, points: &[(i64, i64)]) -> Self {
        self.path(2, points)
    }

    fn path(mut self, cmd: u64, points: &[(i64, i64)]) -> Self {
        write_varint(&mut self.geometry, command(cmd, points.len() as u64));
        for &(x, y) in points {
            write_svarint(&mut self.geometry, x.wrapping_sub(self.x));
            write_svarint(&mut self.geometry, y.wrapping_sub(self.y));
            self.x = x;
            self.y = y;
        }
        self
    }

    #[must_use]
    pub fn close_path(mut self) -> Self {
        write_varint(&mut self.geometry, command(7, 1));
        self
    }

    /// Replaces the geometry stream with arbitrary bytes.
    #[must_use]
    pub fn raw_geometry(mut self, bytes: &[u8]) -> Self {
        self.geometry = bytes.to_vec();
        self
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some(id) = self.id {
            write_varint_field(&mut body, 1, id);
        }
        if !self.tags.is_empty() {
            let mut tags = Vec::new();
            for &index in &self.tags {
                write_varint(&mut tags, index);
            }
            write_len_field(&mut body, 2, &tags);
        }
        write_varint_field(&mut body, 3, self.geom_type);
        write_len_field(&mut body, 4, &self.geometry);
        body
    }
}

/// Builds one layer message.
#[derive(Debug)]
pub struct LayerBuilder {
    name: String,
    extent: Option<u32>,
    keys: Vec<String>,
    values: Vec<Vec<u8>>,
    features: Vec<Vec<u8>>,
}

impl LayerBuilder {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            extent: None,
            keys: Vec::new(),
            values: Vec::new(),
            features: Vec::new(),
        }
    }

    #[must_use]
    pub fn extent(mut self, extent: u32) -> Self {
        self.extent = Some(extent);
        self
    }

    #[must_use]
    pub fn key(mut self, key: &str) -> Self {
        self.keys.push(key.into());
        self
    }

    #[must_use]
    pub fn value(mut self, value: Value) -> Self {
        self.values.push(encode_value(&value));
        self
    }

    /// Appends a value submessage with caller-provided body bytes.
    #[must_use]
    pub fn raw_value(mut self, bytes: &[u8]) -> Self {
        self.values.push(bytes.to_vec());
        self
    }

    #[must_use]
    pub fn feature(mut self, feature: FeatureBuilder) -> Self {
        self.features.push(feature.encode());
        self
    }

    /// Appends a feature message with caller-provided body bytes.
    #[must_use]
    pub fn raw_feature(mut self, bytes: &[u8]) -> Self {
        self.features.push(bytes.to_vec());
        self
    }

    fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        write_varint_field(&mut body, 15, 2); // version
        write_len_field(&mut body, 1, self.name.as_bytes());
        for feature in &self.features {
            write_len_field(&mut body, 2, feature);
        }
        for key in &self.keys {
            write_len_field(&mut body, 3, key.as_bytes());
        }
        for value in &self.values {
            write_len_field(&mut body, 4, value);
        }
        if let Some(extent) = self.extent {
            write_varint_field(&mut body, 5, u64::from(extent));
        }
        body
    }
}

fn encode_value(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    match value {
        Value::String(s) => write_len_field(&mut buf, 1, s.as_bytes()),
        Value::Double(d) => {
            write_tag(&mut buf, 3, 1);
            buf.extend_from_slice(&d.to_le_bytes());
        }
        Value::Int(i) => {
            write_tag(&mut buf, 6, 0);
            write_svarint(&mut buf, *i);
        }
        Value::Uint(u) => write_varint_field(&mut buf, 5, *u),
        Value::Bool(b) => write_varint_field(&mut buf, 7, u64::from(*b)),
    }
    buf
}

/// Builds one tile buffer.
#[derive(Debug, Default)]
pub struct TileBuilder {
    buf: Vec<u8>,
}

impl TileBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn layer(mut self, layer: LayerBuilder) -> Self {
        write_len_field(&mut self.buf, 3, &layer.encode());
        self
    }

    /// Appends a layer submessage with caller-provided body bytes.
    #[must_use]
    pub fn raw_layer(mut self, bytes: &[u8]) -> Self {
        write_len_field(&mut self.buf, 3, bytes);
        self
    }

    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
