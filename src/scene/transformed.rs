//! Resultaat van een transformatie toegepast op een ander element.

use nalgebra::{DMatrix, DVector, Point2};

use super::{Element, ElementId, ElementState, RED, RenderKind, RenderSink, draw_columns};
use crate::expr::Value;
use crate::geom::{AnyCoordinateSystem, apply_transform};

/// Afgeleide resultaten: rode punten met straal 3 of dunne lijnen.
pub(crate) fn draw_derived(
    sink: &mut dyn RenderSink,
    coords: &AnyCoordinateSystem,
    columns: &DMatrix<f64>,
    render_kind: RenderKind,
) {
    let size = match render_kind {
        RenderKind::Point => 3.0,
        RenderKind::Line => 1.0,
    };
    draw_columns(sink, coords, columns, render_kind, RED, size);
}

/// Afgeleid element `transform @ element`.
///
/// Houdt alleen de ids van de operanden vast; de buffer berekent het
/// resultaat iedere frame opnieuw via [`Transformed::recompute`].
#[derive(Debug, Clone)]
pub struct Transformed {
    state: ElementState,
    element: Option<ElementId>,
    transform: Option<ElementId>,
    result: Option<DMatrix<f64>>,
    source_is_vector: bool,
}

impl Transformed {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: ElementState::new(name, RenderKind::Line),
            element: None,
            transform: None,
            result: None,
            source_is_vector: false,
        }
    }

    #[must_use]
    pub fn element(&self) -> Option<ElementId> {
        self.element
    }

    #[must_use]
    pub fn transform(&self) -> Option<ElementId> {
        self.transform
    }

    pub fn set_element(&mut self, element: Option<ElementId>) {
        self.element = element;
    }

    pub fn set_transform(&mut self, transform: Option<ElementId>) {
        self.transform = transform;
    }

    #[must_use]
    pub fn result(&self) -> Option<&DMatrix<f64>> {
        self.result.as_ref()
    }

    /// Vergeet operanden die niet meer bestaan.
    pub fn forget(&mut self, removed: ElementId) {
        if self.element == Some(removed) {
            self.element = None;
        }
        if self.transform == Some(removed) {
            self.transform = None;
        }
    }

    /// Herberekent het resultaat uit de huidige operandwaarden.
    ///
    /// Bij ontbrekende operanden of onverenigbare vormen is het resultaat leeg.
    pub fn recompute(&mut self, matrix: Option<&DMatrix<f64>>, source: Option<&Value>) {
        self.source_is_vector = matches!(source, Some(Value::Vector(_)));
        let points = match source {
            Some(Value::Vector(vector)) => {
                Some(DMatrix::from_column_slice(vector.len(), 1, vector.as_slice()))
            }
            Some(Value::Matrix(matrix)) => Some(matrix.clone()),
            Some(Value::Number(_)) | None => None,
        };
        self.result = match (matrix, points) {
            (Some(matrix), Some(points)) => match apply_transform(matrix, &points, true) {
                Ok(result) => Some(result),
                Err(error) => {
                    log::debug!("{}: {error}", self.state.name);
                    None
                }
            },
            _ => None,
        };
    }
}

impl Element for Transformed {
    fn state(&self) -> &ElementState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ElementState {
        &mut self.state
    }

    fn array(&self) -> Option<DMatrix<f64>> {
        self.result.clone()
    }

    fn value(&self) -> Option<Value> {
        let result = self.result.as_ref()?;
        if self.source_is_vector && result.ncols() == 1 {
            return Some(Value::Vector(DVector::from_column_slice(result.as_slice())));
        }
        Some(Value::Matrix(result.clone()))
    }

    fn is_hovered(&self, _mouse: Point2<f64>, _coords: &AnyCoordinateSystem) -> bool {
        false
    }

    fn render(&self, sink: &mut dyn RenderSink, coords: &AnyCoordinateSystem) {
        if let Some(result) = &self.result {
            draw_derived(sink, coords, result, self.state.render_kind);
        }
    }
}
