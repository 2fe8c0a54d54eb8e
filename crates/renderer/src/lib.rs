//! Geometry and visibility for the wind overlay.
//!
//! Implements:
//! - Spherical direct geodesic (destination point)
//! - Wind arrow glyphs (shaft + chevron head)
//! - Zoom-adaptive sampling with viewport culling
//! - Label visibility policies (zoom band and ground scale)
//! - Scale denominator readout

pub mod arrows;
pub mod geodesic;
pub mod labels;
pub mod sampling;
pub mod scale;

pub use arrows::{ArrowConfig, ArrowGlyph, ArrowGlyphBuilder, PolylineStyle};
pub use labels::{
    BoundLabel, GroundScalePolicy, LabelBoard, LabelId, LabelPolicy, LabelToggle, LabelVisibility,
    ZoomBandPolicy,
};
pub use sampling::{AdaptiveSampler, StrideTable};
pub use scale::{GroundScale, GroupingLocale};
