mod decode_bad;

use crate::{FeatureMode, ReadOptions, TileReader};

pub(crate) fn identity(point: [f64; 2], _extent: u32) -> [f64; 2] {
    point
}

pub(crate) fn unit_scale(point: [f64; 2], extent: u32) -> [f64; 2] {
    let extent = f64::from(extent.max(1));
    [point[0] / extent, point[1] / extent]
}

pub(crate) fn reader(mode: FeatureMode) -> TileReader {
    TileReader::new(ReadOptions {
        mode,
        ..ReadOptions::default()
    })
}
