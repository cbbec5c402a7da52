//! Tile schema decoding: the tile and layer message levels.
//!
//! Feature bodies are not decoded here. Each layer records only the byte
//! offset of every feature message it carries, so layers the caller filters
//! out cost a few tag reads instead of a full feature decode.

use alloc::string::String;
use alloc::vec::Vec;

use crate::cursor::Cursor;
use crate::error::{DecodeError, ErrorKind};
use crate::value::Value;
use crate::walker::{self, WireType};

/// Tile-level field number of a layer submessage.
const TILE_LAYER: u64 = 3;

const LAYER_NAME: u64 = 1;
const LAYER_FEATURE: u64 = 2;
const LAYER_KEY: u64 = 3;
const LAYER_VALUE: u64 = 4;
const LAYER_EXTENT: u64 = 5;
const LAYER_VERSION: u64 = 15;

const VALUE_STRING: u64 = 1;
const VALUE_FLOAT: u64 = 2;
const VALUE_DOUBLE: u64 = 3;
const VALUE_INT: u64 = 4;
const VALUE_UINT: u64 = 5;
const VALUE_SINT: u64 = 6;
const VALUE_BOOL: u64 = 7;

/// Extent implied when the layer omits field 5.
const DEFAULT_EXTENT: u32 = 4096;

/// One layer as read off the wire, before any feature is materialized.
///
/// `keys` and `values` are append-only during decode and indexed by
/// position; feature tag pairs reference them by index.
#[derive(Debug)]
pub(crate) struct RawLayer {
    pub(crate) name: String,
    pub(crate) extent: u32,
    pub(crate) keys: Vec<String>,
    pub(crate) values: Vec<Value>,
    /// Byte offset of each feature message's length prefix, in order.
    pub(crate) features: Vec<usize>,
}

/// Decodes the tile message, collecting its layers in encounter order.
/// Layers with no features are never surfaced.
pub(crate) fn read_layers(cursor: &mut Cursor<'_>) -> Result<Vec<RawLayer>, DecodeError> {
    let mut layers = Vec::new();
    let end = cursor.len();
    walker::walk(cursor, end, |field, wire_type, cursor| {
        if field == TILE_LAYER && wire_type == WireType::LengthDelimited {
            let layer = read_layer(cursor)?;
            if !layer.features.is_empty() {
                layers.push(layer);
            }
            Ok(())
        } else {
            walker::skip_value(cursor, wire_type)
        }
    })?;
    Ok(layers)
}

fn read_layer(cursor: &mut Cursor<'_>) -> Result<RawLayer, DecodeError> {
    let end = walker::message_end(cursor)?;
    let mut layer = RawLayer {
        name: String::new(),
        extent: DEFAULT_EXTENT,
        keys: Vec::new(),
        values: Vec::new(),
        features: Vec::new(),
    };
    walker::walk(cursor, end, |field, wire_type, cursor| {
        match (field, wire_type) {
            (LAYER_NAME, WireType::LengthDelimited) => layer.name = cursor.read_string()?,
            (LAYER_FEATURE, WireType::LengthDelimited) => {
                // Lazy: remember where the feature message starts, then
                // step over it.
                layer.features.push(cursor.pos());
                walker::skip_value(cursor, wire_type)?;
            }
            (LAYER_KEY, WireType::LengthDelimited) => layer.keys.push(cursor.read_string()?),
            (LAYER_VALUE, WireType::LengthDelimited) => layer.values.push(read_value(cursor)?),
            (LAYER_EXTENT, WireType::Varint) => {
                let at = cursor.pos();
                let raw = cursor.read_varint()?;
                layer.extent = u32::try_from(raw).map_err(|_| {
                    DecodeError::new(ErrorKind::MalformedMessage("extent out of range"), at)
                })?;
            }
            (LAYER_VERSION, WireType::Varint) => {
                // Consumed for cursor sync; nothing downstream needs it.
                cursor.read_varint()?;
            }
            _ => walker::skip_value(cursor, wire_type)?,
        }
        Ok(())
    })?;
    Ok(layer)
}

/// Decodes one entry of the value dictionary: a submessage carrying exactly
/// one scalar field. When several are present the last one wins; a value
/// with none is malformed.
fn read_value(cursor: &mut Cursor<'_>) -> Result<Value, DecodeError> {
    let at = cursor.pos();
    let end = walker::message_end(cursor)?;
    let mut value = None;
    walker::walk(cursor, end, |field, wire_type, cursor| {
        match (field, wire_type) {
            (VALUE_STRING, WireType::LengthDelimited) => {
                value = Some(Value::String(cursor.read_string()?));
            }
            (VALUE_FLOAT, WireType::Fixed32) => {
                value = Some(Value::Double(f64::from(cursor.read_float()?)));
            }
            (VALUE_DOUBLE, WireType::Fixed64) => {
                value = Some(Value::Double(cursor.read_double()?));
            }
            (VALUE_INT, WireType::Varint) => {
                #[allow(clippy::cast_possible_wrap)]
                {
                    value = Some(Value::Int(cursor.read_varint()? as i64));
                }
            }
            (VALUE_UINT, WireType::Varint) => {
                value = Some(Value::Uint(cursor.read_varint()?));
            }
            (VALUE_SINT, WireType::Varint) => {
                value = Some(Value::Int(cursor.read_svarint()?));
            }
            (VALUE_BOOL, WireType::Varint) => {
                value = Some(Value::Bool(cursor.read_bool()?));
            }
            _ => walker::skip_value(cursor, wire_type)?,
        }
        Ok(())
    })?;
    value.ok_or_else(|| {
        DecodeError::new(
            ErrorKind::MalformedMessage("value without a recognized payload"),
            at,
        )
    })
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::support::{LayerBuilder, TileBuilder, write_tag, write_varint};

    fn layers_of(data: &[u8]) -> Vec<RawLayer> {
        let mut cursor = Cursor::new(data);
        read_layers(&mut cursor).unwrap()
    }

    #[test]
    fn empty_tile_has_no_layers() {
        assert!(layers_of(&[]).is_empty());
    }

    #[test]
    fn layer_without_features_is_dropped() {
        let data = TileBuilder::new()
            .layer(LayerBuilder::new("empty"))
            .finish();
        assert!(layers_of(&data).is_empty());
    }

    #[test]
    fn layer_fields_decode() {
        let data = TileBuilder::new()
            .layer(
                LayerBuilder::new("roads")
                    .extent(512)
                    .key("kind")
                    .value(Value::from("primary"))
                    .raw_feature(&[0x18, 0x01]), // type = point
            )
            .finish();
        let layers = layers_of(&data);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].name, "roads");
        assert_eq!(layers[0].extent, 512);
        assert_eq!(layers[0].keys, ["kind"]);
        assert_eq!(layers[0].values, [Value::from("primary")]);
        assert_eq!(layers[0].features.len(), 1);
    }

    #[test]
    fn extent_defaults_when_absent() {
        let data = TileBuilder::new()
            .layer(LayerBuilder::new("roads").raw_feature(&[0x18, 0x01]))
            .finish();
        assert_eq!(layers_of(&data)[0].extent, DEFAULT_EXTENT);
    }

    #[test]
    fn extent_larger_than_u32_is_malformed() {
        let mut body = vec![];
        write_tag(&mut body, LAYER_EXTENT, 0);
        write_varint(&mut body, u64::from(u32::MAX) + 1);
        let data = TileBuilder::new().raw_layer(&body).finish();
        let mut cursor = Cursor::new(&data);
        let err = read_layers(&mut cursor).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedMessage("extent out of range"));
    }

    #[test]
    fn value_payload_missing_is_malformed() {
        let data = TileBuilder::new()
            .layer(
                LayerBuilder::new("roads")
                    .raw_value(&[])
                    .raw_feature(&[0x18, 0x01]),
            )
            .finish();
        let mut cursor = Cursor::new(&data);
        let err = read_layers(&mut cursor).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::MalformedMessage("value without a recognized payload")
        );
    }

    #[test]
    fn value_scalar_encodings() {
        // Float (field 2) and plain int64 (field 4) have no canonical
        // builder encoding, so write those two by hand.
        let mut float_body = vec![];
        write_tag(&mut float_body, VALUE_FLOAT, 5);
        float_body.extend_from_slice(&1.5f32.to_le_bytes());
        let mut int_body = vec![];
        write_tag(&mut int_body, VALUE_INT, 0);
        #[allow(clippy::cast_sign_loss)]
        write_varint(&mut int_body, -3i64 as u64);
        let data = TileBuilder::new()
            .layer(
                LayerBuilder::new("mixed")
                    .value(Value::from("name"))
                    .value(Value::Double(2.5))
                    .value(Value::Int(-7))
                    .value(Value::Uint(9))
                    .value(Value::Bool(true))
                    .raw_value(&float_body)
                    .raw_value(&int_body)
                    .raw_feature(&[0x18, 0x01]),
            )
            .finish();
        let layers = layers_of(&data);
        assert_eq!(
            layers[0].values,
            [
                Value::from("name"),
                Value::Double(2.5),
                Value::Int(-7),
                Value::Uint(9),
                Value::Bool(true),
                Value::Double(1.5),
                Value::Int(-3),
            ]
        );
    }
}
