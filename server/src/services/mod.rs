//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own persistence and external-tool concerns so route
//! handlers can stay focused on request parsing and status mapping.

pub mod feature;
pub mod ogr;
