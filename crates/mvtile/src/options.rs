//! Read-time configuration.

use alloc::collections::BTreeSet;
use alloc::string::String;

/// Which representation is materialized for each decoded feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeatureMode {
    /// Flat transformed coordinates plus subpath end offsets, with no
    /// nested geometry structure allocated. Intended for direct rendering.
    ///
    /// # Default
    ///
    /// This is the default mode.
    #[default]
    Render,
    /// Fully-typed geometry objects (point, line, polygon and their multi
    /// variants), at the cost of one allocation per ring.
    Full,
}

/// Configuration for [`TileReader`].
///
/// # Examples
///
/// ```rust
/// use mvtile::{FeatureMode, ReadOptions, TileReader};
///
/// let reader = TileReader::new(ReadOptions {
///     mode: FeatureMode::Full,
///     id_property: Some("fid".into()),
///     ..ReadOptions::default()
/// });
/// ```
///
/// [`TileReader`]: crate::TileReader
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Feature materialization mode.
    pub mode: FeatureMode,

    /// Layer allow-list. When set, features are read only from layers whose
    /// name is in the set; every other layer costs a few tag reads and no
    /// feature decoding.
    ///
    /// # Default
    ///
    /// `None`: features are read from all layers.
    pub layers: Option<BTreeSet<String>>,

    /// Property name the owning layer's name is injected under.
    ///
    /// # Default
    ///
    /// `"layer"`
    pub layer_key: String,

    /// Property drawn out of the property map and used as the feature id.
    ///
    /// When set, the named property is removed from every feature's map and
    /// its value becomes the id; a feature lacking the property gets no id,
    /// and the native wire id is ignored either way.
    ///
    /// # Default
    ///
    /// `None`: the native wire id is used when present.
    pub id_property: Option<String>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            mode: FeatureMode::default(),
            layers: None,
            layer_key: String::from("layer"),
            id_property: None,
        }
    }
}
