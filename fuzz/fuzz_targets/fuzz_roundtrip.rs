#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mvtile::support::{
    FeatureBuilder, GEOM_LINESTRING, GEOM_POINT, GEOM_POLYGON, LayerBuilder, TileBuilder,
};
use mvtile::{FeatureMode, ReadOptions, TileReader, Value};

#[derive(Arbitrary, Debug, Clone, Copy)]
enum Step {
    Move(i16, i16),
    Line(i16, i16),
    Close,
}

#[derive(Arbitrary, Debug)]
struct FeatureDesc {
    type_seed: u8,
    id: Option<u64>,
    tags: Vec<(u8, u8)>,
    steps: Vec<Step>,
}

#[derive(Arbitrary, Debug)]
struct LayerDesc {
    name: String,
    extent: Option<u16>,
    keys: Vec<String>,
    values: Vec<bool>,
    features: Vec<FeatureDesc>,
}

#[derive(Arbitrary, Debug)]
struct TileDesc {
    layers: Vec<LayerDesc>,
}

fn build(desc: &TileDesc) -> (Vec<u8>, usize) {
    let mut tile = TileBuilder::new();
    let mut feature_count = 0;
    for layer_desc in &desc.layers {
        let mut layer = LayerBuilder::new(&layer_desc.name);
        if let Some(extent) = layer_desc.extent {
            layer = layer.extent(u32::from(extent));
        }
        for key in &layer_desc.keys {
            layer = layer.key(key);
        }
        for &value in &layer_desc.values {
            layer = layer.value(Value::Bool(value));
        }
        for feature_desc in &layer_desc.features {
            let geom_type =
                [GEOM_POINT, GEOM_LINESTRING, GEOM_POLYGON][usize::from(feature_desc.type_seed) % 3];
            let mut feature = FeatureBuilder::new(geom_type);
            if let Some(id) = feature_desc.id {
                feature = feature.id(id);
            }
            if !layer_desc.keys.is_empty() && !layer_desc.values.is_empty() {
                for &(key, value) in &feature_desc.tags {
                    feature = feature.tag(
                        (usize::from(key) % layer_desc.keys.len()) as u64,
                        (usize::from(value) % layer_desc.values.len()) as u64,
                    );
                }
            }
            for &step in &feature_desc.steps {
                feature = match step {
                    Step::Move(x, y) => feature.move_to(&[(i64::from(x), i64::from(y))]),
                    Step::Line(x, y) => feature.line_to(&[(i64::from(x), i64::from(y))]),
                    Step::Close => feature.close_path(),
                };
            }
            layer = layer.feature(feature);
            feature_count += 1;
        }
        tile = tile.layer(layer);
    }
    (tile.finish(), feature_count)
}

/// Every tile assembled from a well-formed description must decode cleanly
/// in both modes, to the same number of features.
fn roundtrip(desc: &TileDesc) {
    let (data, expected) = build(desc);
    let identity = |point: [f64; 2], _extent: u32| point;
    let full = TileReader::new(ReadOptions {
        mode: FeatureMode::Full,
        ..ReadOptions::default()
    })
    .read_features(&data, &identity)
    .expect("well-formed tile failed to decode");
    let render = TileReader::new(ReadOptions::default())
        .read_features(&data, &identity)
        .expect("well-formed tile failed to decode");
    assert_eq!(full.len(), expected);
    assert_eq!(render.len(), expected);
}

fuzz_target!(|desc: TileDesc| roundtrip(&desc));
