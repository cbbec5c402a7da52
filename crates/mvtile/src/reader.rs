//! Tile-level orchestration.

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;

use crate::cursor::Cursor;
use crate::error::DecodeError;
use crate::feature::{self, Feature, Transform};
use crate::layer::read_layers;
use crate::options::ReadOptions;

/// Media types conventionally carrying encoded tiles.
pub const SUPPORTED_MEDIA_TYPES: [&str; 2] = [
    "application/vnd.mapbox-vector-tile",
    "application/x-protobuf",
];

/// Decoder for encoded vector tiles.
///
/// A reader holds only configuration: it borrows each tile buffer for the
/// duration of one [`read_features`](Self::read_features) call and keeps no
/// state across calls, so one reader can decode independent tiles from any
/// number of threads.
#[derive(Debug, Clone, Default)]
pub struct TileReader {
    options: ReadOptions,
}

impl TileReader {
    #[must_use]
    pub fn new(options: ReadOptions) -> Self {
        Self { options }
    }

    /// Replaces the layer allow-list for subsequent calls.
    pub fn set_layers(&mut self, layers: Option<BTreeSet<String>>) {
        self.options.layers = layers;
    }

    /// Decodes every feature of one tile buffer.
    ///
    /// Features come back in layer-then-feature encounter order, with each
    /// coordinate pair run through `transform` together with the owning
    /// layer's extent. Features whose geometry type code is 0 are dropped;
    /// layers absent from a configured allow-list are stepped over without
    /// decoding their features.
    ///
    /// # Errors
    ///
    /// Returns the first [`DecodeError`] encountered. There is no partial
    /// output: the caller sees either the complete feature sequence or a
    /// single terminal error.
    pub fn read_features<T>(&self, data: &[u8], transform: &T) -> Result<Vec<Feature>, DecodeError>
    where
        T: Transform + ?Sized,
    {
        let mut cursor = Cursor::new(data);
        let layers = read_layers(&mut cursor)?;
        let mut features = Vec::new();
        for layer in &layers {
            if let Some(allowed) = &self.options.layers {
                if !allowed.contains(layer.name.as_str()) {
                    continue;
                }
            }
            for &offset in &layer.features {
                if let Some(feature) =
                    feature::materialize(&mut cursor, layer, offset, &self.options, transform)?
                {
                    features.push(feature);
                }
            }
        }
        Ok(features)
    }
}
