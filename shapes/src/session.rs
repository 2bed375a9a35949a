//! Drawing session: the editor's transient list of drawn shapes and the
//! current selection.
//!
//! DESIGN
//! ======
//! Shapes get monotonically increasing ids, never reused within a session.
//! The selection is an ordered list of ids; order matters for `clip`, where
//! the first selected shape is the subject and the second is the mask.
//! Overlay results are drawn back into the session as new shapes so they can
//! be measured, combined again, or saved.

use geo::Geometry;
use geojson::FeatureCollection;

use crate::measure::Measurement;
use crate::overlay::{self, OverlayError};
use crate::shape::{Shape, ShapeError, feature_collection};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unknown shape: {0}")]
    UnknownShape(u64),
    #[error("operation needs exactly {expected} selected shapes, got {actual}")]
    SelectionSize { expected: usize, actual: usize },
    #[error("operation needs at least {minimum} selected shapes, got {actual}")]
    SelectionTooSmall { minimum: usize, actual: usize },
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Overlay(#[from] OverlayError),
}

#[derive(Debug, Clone)]
pub struct Session {
    shapes: Vec<Shape>,
    selection: Vec<u64>,
    next_id: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self { shapes: Vec::new(), selection: Vec::new(), next_id: 1 }
    }

    // =========================================================================
    // LAYERS
    // =========================================================================

    /// Add a drawn geometry and return its id.
    ///
    /// # Errors
    ///
    /// Returns `Shape(Unsupported)` for geometry collections.
    pub fn draw(&mut self, geometry: Geometry<f64>, name: Option<String>) -> Result<u64, SessionError> {
        let id = self.next_id;
        self.shapes.push(Shape::new(id, geometry, name)?);
        self.next_id += 1;
        Ok(id)
    }

    /// Add already-parsed shapes, assigning fresh ids. Returns the new ids.
    pub fn load(&mut self, shapes: impl IntoIterator<Item = Shape>) -> Vec<u64> {
        shapes
            .into_iter()
            .map(|shape| {
                let id = self.next_id;
                self.next_id += 1;
                self.shapes.push(shape.with_id(id));
                id
            })
            .collect()
    }

    /// Remove a shape, dropping it from the selection too.
    pub fn remove(&mut self, id: u64) -> Option<Shape> {
        let index = self.shapes.iter().position(|shape| shape.id == id)?;
        self.selection.retain(|selected| *selected != id);
        Some(self.shapes.remove(index))
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.selection.clear();
    }

    #[must_use]
    pub fn get(&self, id: u64) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.id == id)
    }

    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    // =========================================================================
    // SELECTION
    // =========================================================================

    /// Append a shape to the selection. Selecting twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `UnknownShape` if no shape has this id.
    pub fn select(&mut self, id: u64) -> Result<(), SessionError> {
        if self.get(id).is_none() {
            return Err(SessionError::UnknownShape(id));
        }
        if !self.selection.contains(&id) {
            self.selection.push(id);
        }
        Ok(())
    }

    /// Select every shape, in drawing order.
    pub fn select_all(&mut self) {
        self.selection = self.shapes.iter().map(|shape| shape.id).collect();
    }

    pub fn deselect(&mut self, id: u64) {
        self.selection.retain(|selected| *selected != id);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected ids in selection order.
    #[must_use]
    pub fn selected(&self) -> &[u64] {
        &self.selection
    }

    fn selected_shapes(&self) -> Vec<&Shape> {
        self.selection.iter().filter_map(|id| self.get(*id)).collect()
    }

    fn selected_pair(&self) -> Result<(&Shape, &Shape), SessionError> {
        match self.selected_shapes().as_slice() {
            [first, second] => Ok((*first, *second)),
            other => Err(SessionError::SelectionSize { expected: 2, actual: other.len() }),
        }
    }

    // =========================================================================
    // MEASURE
    // =========================================================================

    /// # Errors
    ///
    /// Returns `UnknownShape` if no shape has this id.
    pub fn measure(&self, id: u64) -> Result<Measurement, SessionError> {
        self.get(id)
            .map(Measurement::of)
            .ok_or(SessionError::UnknownShape(id))
    }

    #[must_use]
    pub fn measure_selected(&self) -> Vec<(u64, Measurement)> {
        self.selected_shapes()
            .into_iter()
            .map(|shape| (shape.id, Measurement::of(shape)))
            .collect()
    }

    // =========================================================================
    // OVERLAY
    // =========================================================================

    /// Intersect the two selected polygons. The result is drawn as a new
    /// shape; `None` means the polygons do not overlap and nothing was added.
    ///
    /// # Errors
    ///
    /// Returns `SelectionSize` unless exactly two shapes are selected, and
    /// `Overlay` if either is not a polygon.
    pub fn intersect_selected(&mut self) -> Result<Option<&Shape>, SessionError> {
        let (a, b) = self.selected_pair()?;
        let result = overlay::intersect(&a.geometry, &b.geometry)?;
        self.add_result(result, "intersect")
    }

    /// Clip the first selected shape by the second.
    ///
    /// # Errors
    ///
    /// Returns `SelectionSize` unless exactly two shapes are selected, and
    /// `Overlay` if the mask is not a polygon.
    pub fn clip_selected(&mut self) -> Result<Option<&Shape>, SessionError> {
        let (subject, mask) = self.selected_pair()?;
        let result = overlay::clip(&subject.geometry, &mask.geometry)?;
        self.add_result(result, "clip")
    }

    /// Dissolve all selected polygons into one shape.
    ///
    /// # Errors
    ///
    /// Returns `SelectionTooSmall` for fewer than two selected shapes, and
    /// `Overlay` if any of them is not a polygon.
    pub fn dissolve_selected(&mut self) -> Result<&Shape, SessionError> {
        let selected = self.selected_shapes();
        if selected.len() < 2 {
            return Err(SessionError::SelectionTooSmall { minimum: 2, actual: selected.len() });
        }
        let result = overlay::dissolve(selected.into_iter().map(|shape| &shape.geometry))?;
        let id = self.draw(result, Some("dissolve".to_owned()))?;
        self.get(id).ok_or(SessionError::UnknownShape(id))
    }

    fn add_result(&mut self, result: Option<Geometry<f64>>, name: &str) -> Result<Option<&Shape>, SessionError> {
        let Some(geometry) = result else {
            return Ok(None);
        };
        let id = self.draw(geometry, Some(name.to_owned()))?;
        Ok(self.get(id))
    }

    #[must_use]
    pub fn to_feature_collection(&self) -> FeatureCollection {
        feature_collection(&self.shapes)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
