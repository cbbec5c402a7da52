use alloc::vec;
use alloc::vec::Vec;

use rstest::rstest;

use super::{identity, reader};
use crate::support::{
    FeatureBuilder, GEOM_LINESTRING, GEOM_POINT, GEOM_POLYGON, LayerBuilder, TileBuilder, command,
    write_tag, write_varint,
};
use crate::{ErrorKind, FeatureMode};

fn decode_err(data: &[u8]) -> crate::DecodeError {
    reader(FeatureMode::Full).read_features(data, &identity).unwrap_err()
}

fn one_layer(feature: FeatureBuilder) -> Vec<u8> {
    TileBuilder::new()
        .layer(LayerBuilder::new("test").feature(feature))
        .finish()
}

#[test]
fn truncated_tag_varint() {
    let err = decode_err(&[0x80]);
    assert_eq!(err.kind, ErrorKind::TruncatedInput("varint"));
}

#[test]
fn overlong_tag_varint() {
    let err = decode_err(&[0x80; 11]);
    assert_eq!(err.kind, ErrorKind::TruncatedInput("varint exceeds 10 bytes"));
}

#[rstest]
#[case(3)]
#[case(4)]
#[case(6)]
#[case(7)]
fn invalid_wire_type(#[case] wire: u64) {
    let mut data = vec![];
    write_tag(&mut data, 1, wire);
    let err = decode_err(&data);
    assert_eq!(err.kind, ErrorKind::MalformedMessage("invalid wire type"));
}

#[test]
fn layer_length_past_buffer_end() {
    let mut data = vec![];
    write_tag(&mut data, 3, 2);
    write_varint(&mut data, 100);
    let err = decode_err(&data);
    assert_eq!(err.kind, ErrorKind::TruncatedInput("message body"));
}

#[test]
fn field_overruns_layer_boundary() {
    // A layer claiming to span two bytes, whose name field's payload runs
    // past that boundary into the rest of the buffer.
    let mut data = vec![];
    write_tag(&mut data, 3, 2);
    write_varint(&mut data, 2);
    write_tag(&mut data, 1, 2);
    write_varint(&mut data, 5);
    data.extend_from_slice(b"hello");
    let err = decode_err(&data);
    assert_eq!(
        err.kind,
        ErrorKind::MalformedMessage("field overruns message boundary")
    );
}

#[rstest]
#[case(0)]
#[case(3)]
#[case(4)]
#[case(5)]
#[case(6)]
fn invalid_geometry_command(#[case] cmd: u64) {
    let mut geometry = vec![];
    write_varint(&mut geometry, command(cmd, 1));
    let data = one_layer(FeatureBuilder::new(GEOM_LINESTRING).raw_geometry(&geometry));
    let err = decode_err(&data);
    assert_eq!(err.kind, ErrorKind::MalformedMessage("invalid geometry command"));
}

#[test]
fn geometry_length_past_buffer_end() {
    // Feature body: type = linestring, then a geometry field claiming 100
    // bytes that the buffer does not hold.
    let mut body = vec![];
    write_tag(&mut body, 3, 0);
    write_varint(&mut body, GEOM_LINESTRING);
    write_tag(&mut body, 4, 2);
    write_varint(&mut body, 100);
    body.extend_from_slice(&[0x09, 0x09]);
    let data = TileBuilder::new()
        .layer(LayerBuilder::new("test").raw_feature(&body))
        .finish();
    let err = decode_err(&data);
    assert_eq!(err.kind, ErrorKind::TruncatedInput("skipped field"));
}

#[test]
fn truncated_geometry_aborts_whole_tile() {
    // A valid feature first, then one whose geometry is cut short: the call
    // must fail as a whole instead of returning the valid prefix.
    let mut body = vec![];
    write_tag(&mut body, 3, 0);
    write_varint(&mut body, GEOM_LINESTRING);
    write_tag(&mut body, 4, 2);
    write_varint(&mut body, 100);
    let data = TileBuilder::new()
        .layer(
            LayerBuilder::new("test")
                .feature(FeatureBuilder::new(GEOM_POINT).move_to(&[(1, 1)]))
                .raw_feature(&body),
        )
        .finish();
    let err = decode_err(&data);
    assert_eq!(err.kind, ErrorKind::TruncatedInput("skipped field"));
}

#[test]
fn geometry_command_overrunning_stream() {
    // Geometry field of two bytes: a LineTo command and only one of its two
    // deltas; the second delta read crosses the declared stream end.
    let mut body = vec![];
    write_tag(&mut body, 4, 2);
    write_varint(&mut body, 2);
    write_varint(&mut body, command(2, 1));
    write_varint(&mut body, 4); // dx only
    write_tag(&mut body, 3, 0);
    write_varint(&mut body, GEOM_LINESTRING);
    let data = TileBuilder::new()
        .layer(LayerBuilder::new("test").raw_feature(&body))
        .finish();
    let err = decode_err(&data);
    assert_eq!(
        err.kind,
        ErrorKind::MalformedMessage("geometry command overruns stream")
    );
}

#[rstest]
#[case(4)]
#[case(5)]
#[case(200)]
fn unsupported_geometry_type(#[case] geom_type: u64) {
    let data = one_layer(FeatureBuilder::new(geom_type).move_to(&[(1, 1)]));
    let err = decode_err(&data);
    assert_eq!(err.kind, ErrorKind::UnsupportedGeometryType(geom_type));
}

#[test]
fn property_key_index_out_of_range() {
    let data = TileBuilder::new()
        .layer(
            LayerBuilder::new("test")
                .key("kind")
                .value(crate::Value::Bool(true))
                .feature(FeatureBuilder::new(GEOM_POINT).tag(5, 0).move_to(&[(1, 1)])),
        )
        .finish();
    let err = decode_err(&data);
    assert_eq!(
        err.kind,
        ErrorKind::MalformedMessage("property key index out of range")
    );
}

#[test]
fn property_value_index_out_of_range() {
    let data = TileBuilder::new()
        .layer(
            LayerBuilder::new("test")
                .key("kind")
                .value(crate::Value::Bool(true))
                .feature(FeatureBuilder::new(GEOM_POINT).tag(0, 9).move_to(&[(1, 1)])),
        )
        .finish();
    let err = decode_err(&data);
    assert_eq!(
        err.kind,
        ErrorKind::MalformedMessage("property value index out of range")
    );
}

#[test]
fn dangling_property_index_pair() {
    // Tags submessage holding a single index: its value read crosses the
    // submessage boundary.
    let mut body = vec![];
    write_tag(&mut body, 2, 2);
    write_varint(&mut body, 1);
    write_varint(&mut body, 0);
    write_tag(&mut body, 3, 0);
    write_varint(&mut body, GEOM_POINT);
    let data = TileBuilder::new()
        .layer(
            LayerBuilder::new("test")
                .key("kind")
                .value(crate::Value::Bool(true))
                .raw_feature(&body),
        )
        .finish();
    let err = decode_err(&data);
    assert_eq!(
        err.kind,
        ErrorKind::MalformedMessage("dangling property index pair")
    );
}

#[test]
fn error_reports_byte_offset() {
    let err = decode_err(&[0x80]);
    assert_eq!(err.offset, 0);
    assert_eq!(
        alloc::format!("{err}"),
        "truncated input: varint at byte 0"
    );
}

#[test]
fn polygon_with_malformed_ring_aborts() {
    // First ring valid, then garbage commands inside the same stream.
    let mut geometry = vec![];
    write_varint(&mut geometry, command(1, 1));
    write_varint(&mut geometry, 2); // x = 1
    write_varint(&mut geometry, 2); // y = 1
    write_varint(&mut geometry, command(5, 2));
    let data = one_layer(FeatureBuilder::new(GEOM_POLYGON).raw_geometry(&geometry));
    let err = decode_err(&data);
    assert_eq!(err.kind, ErrorKind::MalformedMessage("invalid geometry command"));
}
