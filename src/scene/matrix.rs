//! Bewerkbare transformatiematrices met versleepbare assen.

use nalgebra::{DMatrix, DVector, Point2};
use serde::{Deserialize, Serialize};

use super::{
    Element, ElementState, EventContext, InputEvent, MAGENTA, MouseButton, RenderKind, RenderSink,
    axis_color, handle_common_event,
};
use crate::geom::{AnyCoordinateSystem, CoordinateSystem, Dimension, snap, within_hover_distance};

/// Lineaire (`d×d`) of affiene (`(d+1)×(d+1)`) matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformKind {
    Linear,
    Affine,
}

/// Matrix-element. Iedere kolom is een versleepbare as; een affiene matrix
/// heeft daarnaast een handvat voor de translatie.
#[derive(Debug, Clone)]
pub struct Transform {
    state: ElementState,
    matrix: DMatrix<f64>,
    dimension: Dimension,
    kind: TransformKind,
    hovered_index: Option<usize>,
    dragged_index: Option<usize>,
}

impl Transform {
    #[must_use]
    pub fn linear(name: impl Into<String>, dimension: Dimension) -> Self {
        Self::identity(name, dimension, TransformKind::Linear)
    }

    #[must_use]
    pub fn affine(name: impl Into<String>, dimension: Dimension) -> Self {
        Self::identity(name, dimension, TransformKind::Affine)
    }

    fn identity(name: impl Into<String>, dimension: Dimension, kind: TransformKind) -> Self {
        let size = match kind {
            TransformKind::Linear => dimension.size(),
            TransformKind::Affine => dimension.size() + 1,
        };
        Self {
            state: ElementState::new(name, RenderKind::Line),
            matrix: DMatrix::identity(size, size),
            dimension,
            kind,
            hovered_index: None,
            dragged_index: None,
        }
    }

    /// De ruwe, niet gesnapte matrix.
    #[must_use]
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    #[must_use]
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    #[must_use]
    pub fn kind(&self) -> TransformKind {
        self.kind
    }

    #[must_use]
    pub fn hovered_index(&self) -> Option<usize> {
        self.hovered_index
    }

    #[must_use]
    pub fn dragged_index(&self) -> Option<usize> {
        self.dragged_index
    }

    /// Verschuift een cel met `delta`; `false` als de cel niet bestaat.
    pub fn add_to_cell(&mut self, row: usize, column: usize, delta: f64) -> bool {
        match self.matrix.get_mut((row, column)) {
            Some(cell) => {
                *cell += delta;
                true
            }
            None => false,
        }
    }

    /// Wereldposities van de handvatten als kolommen `[d, k]`, samen met het
    /// startpunt van de lijn naar ieder handvat (`None` is de oorsprong).
    ///
    /// Lineair: iedere kolom vanaf de oorsprong. Affien: de assen vanaf de
    /// translatie, gevolgd door de translatie zelf vanaf de oorsprong.
    #[must_use]
    pub fn handle_locations(&self) -> (DMatrix<f64>, Vec<Option<usize>>) {
        let snapped = snap(&self.matrix);
        let d = self.dimension.size();
        match self.kind {
            TransformKind::Linear => (snapped, vec![None; d]),
            TransformKind::Affine => {
                let offset = snapped.view((0, d), (d, 1)).into_owned();
                let mut locations = DMatrix::zeros(d, d + 1);
                for column in 0..d {
                    let axis = snapped.view((0, column), (d, 1)) + &offset;
                    locations.set_column(column, &axis.column(0));
                }
                locations.set_column(d, &offset.column(0));
                let mut origins = vec![Some(d); d];
                origins.push(None);
                (locations, origins)
            }
        }
    }

    /// Eerste handvat binnen de hover-afstand van `mouse`.
    #[must_use]
    pub fn hovered_index_at(&self, mouse: Point2<f64>, coords: &AnyCoordinateSystem) -> Option<usize> {
        if !self.state.visible {
            return None;
        }
        let (locations, _) = self.handle_locations();
        coords
            .project(&locations)
            .into_iter()
            .position(|point| point.is_some_and(|point| within_hover_distance(mouse, point)))
    }

    fn drag_handle(&mut self, index: usize, context: &EventContext<'_>) {
        let d = self.dimension.size();
        let (locations, _) = self.handle_locations();
        if index >= locations.ncols() {
            return;
        }
        let anchor: DVector<f64> = locations.column(index).into_owned();
        let Some(world) = context.coords.screen_to_world(context.mouse, &anchor) else {
            return;
        };

        let target = match self.kind {
            TransformKind::Affine if index < d => {
                let offset = locations.column(d).into_owned();
                world - offset
            }
            _ => world,
        };
        let target = snap(&DMatrix::from_column_slice(d, 1, target.as_slice()));
        self.matrix.view_mut((0, index), (d, 1)).copy_from(&target);
    }
}

impl Element for Transform {
    fn state(&self) -> &ElementState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ElementState {
        &mut self.state
    }

    fn array(&self) -> Option<DMatrix<f64>> {
        Some(snap(&self.matrix))
    }

    fn is_hovered(&self, mouse: Point2<f64>, coords: &AnyCoordinateSystem) -> bool {
        self.hovered_index_at(mouse, coords).is_some()
    }

    fn render(&self, sink: &mut dyn RenderSink, coords: &AnyCoordinateSystem) {
        let (locations, origins) = self.handle_locations();
        let points = coords.project(&locations);
        let zero = coords.zero_point();
        let d = self.dimension.size();

        for (index, point) in points.iter().enumerate() {
            let Some(point) = point else {
                continue;
            };
            let width = if self.hovered_index == Some(index) { 3.0 } else { 1.0 };
            let color = if index < d { axis_color(index) } else { MAGENTA };
            match self.state.render_kind {
                RenderKind::Point => sink.draw_circle(*point, width, color),
                RenderKind::Line => {
                    let from = match origins.get(index).copied().flatten() {
                        Some(origin) => points.get(origin).copied().flatten(),
                        None => Some(zero),
                    };
                    if let Some(from) = from {
                        sink.draw_line(from, *point, color, width);
                    }
                }
            }
        }
    }

    fn handle_event(&mut self, event: &InputEvent, context: &mut EventContext<'_>) {
        handle_common_event(self, event, context);
        match event {
            InputEvent::PointerDown {
                button: MouseButton::Primary,
            } => {
                let hovered = self.hovered_index_at(context.mouse, context.coords);
                if hovered.is_some() && context.claim_drag() {
                    self.dragged_index = hovered;
                }
            }
            InputEvent::PointerUp {
                button: MouseButton::Primary,
            } => self.dragged_index = None,
            InputEvent::PointerMove { .. } => {
                self.hovered_index = self.hovered_index_at(context.mouse, context.coords);
                if let Some(index) = self.dragged_index {
                    self.drag_handle(index, context);
                }
            }
            _ => {}
        }
    }
}
