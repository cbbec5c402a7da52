//! Decoder for the Mapbox Vector Tile (MVT) wire format.
//!
//! One encoded tile is a protobuf-derived, length-delimited byte buffer
//! holding named layers of features, with delta/zig-zag-encoded geometry
//! command streams and per-layer key/value dictionaries. [`TileReader`]
//! turns such a buffer into an ordered sequence of [`Feature`] values,
//! either as flat render-oriented coordinate buffers or as fully-typed
//! geometries, and tolerates arbitrary (including adversarial) input by
//! failing with a [`DecodeError`] rather than panicking.
//!
//! ```rust
//! use mvtile::{ReadOptions, TileReader};
//!
//! let reader = TileReader::new(ReadOptions::default());
//! // An empty buffer is a valid tile with no layers.
//! let features = reader.read_features(&[], &|point: [f64; 2], _extent: u32| point)?;
//! assert!(features.is_empty());
//! # Ok::<(), mvtile::DecodeError>(())
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod cursor;
mod error;
mod feature;
mod geometry;
mod layer;
mod options;
mod reader;
mod value;
mod walker;

#[cfg(any(test, feature = "fuzzing"))]
#[doc(hidden)]
pub mod support;

#[cfg(test)]
mod tests;

pub use error::{DecodeError, ErrorKind};
pub use feature::{Feature, FeatureGeometry, Geometry, GeometryType, Transform};
pub use options::{FeatureMode, ReadOptions};
pub use reader::{SUPPORTED_MEDIA_TYPES, TileReader};
pub use value::{Map, Value};
