#![no_main]
use std::collections::BTreeSet;

use libfuzzer_sys::fuzz_target;
use mvtile::{FeatureMode, ReadOptions, TileReader};

/// Feeds raw bytes straight into the decoder. The first byte selects the
/// read options, the rest is the tile buffer; any outcome but a panic is
/// acceptable.
fn decode(data: &[u8]) {
    if data.is_empty() {
        return;
    }
    let flags = data[0];
    let tile = &data[1..];

    let reader = TileReader::new(ReadOptions {
        mode: if flags & 1 != 0 {
            FeatureMode::Full
        } else {
            FeatureMode::Render
        },
        layers: (flags & 2 != 0).then(|| BTreeSet::from([String::from("water")])),
        id_property: (flags & 4 != 0).then(|| String::from("id")),
        ..ReadOptions::default()
    });

    let unit = |point: [f64; 2], extent: u32| {
        let extent = f64::from(extent.max(1));
        [point[0] / extent, point[1] / extent]
    };
    if let Ok(features) = reader.read_features(tile, &unit) {
        for feature in &features {
            let _ = feature.geometry.kind();
        }
    }
}

fuzz_target!(|data: &[u8]| decode(data));
