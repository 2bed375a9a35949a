//! Drawing-session model and geometry operations for the WebGIS digitizer.
//!
//! This crate owns everything the map editor does with user-drawn shapes:
//! GeoJSON conversion, geodesic measurement, and the overlay operations
//! (intersect, clip, dissolve). The heavy lifting is delegated to `geo`;
//! both `server` and `cli` build on the types exported here.

pub mod measure;
pub mod overlay;
pub mod session;
pub mod shape;

pub use measure::{Measurement, area_m2, format_area, format_length, length_m};
pub use overlay::{OverlayError, clip, dissolve, intersect};
pub use session::{Session, SessionError};
pub use shape::{Shape, ShapeError, ShapeKind, feature_collection, parse_shapes, shapes_from_geojson};
