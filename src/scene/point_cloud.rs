//! Puntenwolken: cirkels, het huisje en de kubus.

use std::f64::consts::TAU;

use nalgebra::{DMatrix, DVector, Point2, Vector3};

use super::{
    Element, ElementState, EventContext, GREEN, InputEvent, MouseButton, RenderKind, RenderSink,
    any_within_hover, handle_common_event,
};
use crate::geom::{AnyCoordinateSystem, CoordinateSystem, Dimension, snap_vector};

/// Regelmatige veelhoek op de eenheidscirkel, optioneel gevolgd door het
/// middelpunt.
#[must_use]
pub fn generate_unit_circle(num_points: usize, include_center: bool) -> DMatrix<f64> {
    let extra = usize::from(include_center);
    let mut coordinates = DMatrix::zeros(2, num_points + extra);
    for index in 0..num_points {
        let angle = TAU * index as f64 / num_points as f64;
        coordinates[(0, index)] = angle.cos();
        coordinates[(1, index)] = angle.sin();
    }
    coordinates
}

/// `num_points` lineair geïnterpoleerde punten van `a` naar `b`.
///
/// Zonder `endpoint` valt `b` zelf buiten de reeks, zodat opeenvolgende
/// segmenten geen dubbele punten opleveren.
#[must_use]
pub fn generate_line(a: [f64; 2], b: [f64; 2], num_points: usize, endpoint: bool) -> DMatrix<f64> {
    let divisor = if endpoint {
        num_points.saturating_sub(1).max(1)
    } else {
        num_points.max(1)
    } as f64;
    let mut coordinates = DMatrix::zeros(2, num_points);
    for index in 0..num_points {
        let t = index as f64 / divisor;
        coordinates[(0, index)] = a[0] * (1.0 - t) + b[0] * t;
        coordinates[(1, index)] = a[1] * (1.0 - t) + b[1] * t;
    }
    coordinates
}

/// Het vaste huisje: muren, dak, deur, raam en schoorsteen.
#[must_use]
pub fn generate_house() -> DMatrix<f64> {
    const SEGMENTS: [([f64; 2], [f64; 2], usize); 16] = [
        // muren
        ([-1.0, -1.0], [-1.0, 1.0], 10),
        ([-1.0, 1.0], [1.0, 1.0], 10),
        ([1.0, 1.0], [1.0, -1.0], 10),
        ([1.0, -1.0], [-1.0, -1.0], 10),
        // dak
        ([-1.0, 1.0], [0.0, 2.0], 8),
        ([0.0, 2.0], [1.0, 1.0], 8),
        // deur
        ([0.0, -1.0], [0.0, 0.0], 5),
        ([0.0, 0.0], [0.5, 0.0], 2),
        ([0.5, 0.0], [0.5, -1.0], 5),
        // raam
        ([-0.8, 0.2], [-0.8, 0.8], 4),
        ([-0.8, 0.8], [-0.2, 0.8], 4),
        ([-0.2, 0.8], [-0.2, 0.2], 4),
        ([-0.2, 0.2], [-0.8, 0.2], 4),
        // schoorsteen
        ([-0.75, 1.25], [-0.75, 2.0], 4),
        ([-0.75, 2.0], [-0.37, 2.0], 3),
        ([-0.37, 2.0], [-0.37, 1.62], 2),
    ];

    let total: usize = SEGMENTS.iter().map(|(_, _, count)| count).sum();
    let mut coordinates = DMatrix::zeros(2, total);
    let mut offset = 0;
    for (a, b, count) in SEGMENTS {
        let segment = generate_line(a, b, count, false);
        coordinates.columns_mut(offset, count).copy_from(&segment);
        offset += count;
    }
    coordinates
}

/// Hoekpunten en ribben van een as-uitgelijnde kubus.
#[must_use]
pub fn create_cube(min: Vector3<f64>, max: Vector3<f64>) -> (DMatrix<f64>, Vec<[usize; 2]>) {
    let corners = [
        [min.x, min.y, min.z],
        [max.x, min.y, min.z],
        [max.x, max.y, min.z],
        [min.x, max.y, min.z],
        [min.x, min.y, max.z],
        [max.x, min.y, max.z],
        [max.x, max.y, max.z],
        [min.x, max.y, max.z],
    ];
    let flat: Vec<f64> = corners.iter().flatten().copied().collect();
    let coordinates = DMatrix::from_column_slice(3, corners.len(), &flat);

    let edges = vec![
        // x verandert
        [0, 1],
        [2, 3],
        [4, 5],
        [6, 7],
        // y verandert
        [0, 3],
        [1, 2],
        [4, 7],
        [5, 6],
        // z verandert
        [0, 4],
        [1, 5],
        [2, 6],
        [3, 7],
    ];
    (coordinates, edges)
}

/// Voegt een rij nullen toe zodat vlakke figuren in 3D bruikbaar zijn.
#[must_use]
pub fn lift_to_3d(coordinates: &DMatrix<f64>) -> DMatrix<f64> {
    if coordinates.nrows() != 2 {
        return coordinates.clone();
    }
    coordinates.clone().insert_row(2, 0.0)
}

/// Groep punten die als geheel geschaald wordt bij het slepen.
#[derive(Debug, Clone)]
pub struct PointCloud {
    state: ElementState,
    coordinates: DMatrix<f64>,
    original_coordinates: DMatrix<f64>,
    line_indices: Vec<[usize; 2]>,
    scale: DVector<f64>,
    drag_anchor: Option<(DVector<f64>, DVector<f64>)>,
}

impl PointCloud {
    #[must_use]
    pub fn new(name: impl Into<String>, coordinates: DMatrix<f64>, render_kind: RenderKind) -> Self {
        let rows = coordinates.nrows();
        Self {
            state: ElementState::new(name, render_kind),
            original_coordinates: coordinates.clone(),
            coordinates,
            line_indices: Vec::new(),
            scale: DVector::from_element(rows, 1.0),
            drag_anchor: None,
        }
    }

    /// Puntenwolk waarvan de lijnweergave de gegeven ribben tekent.
    #[must_use]
    pub fn with_edges(
        name: impl Into<String>,
        coordinates: DMatrix<f64>,
        line_indices: Vec<[usize; 2]>,
        render_kind: RenderKind,
    ) -> Self {
        let mut cloud = Self::new(name, coordinates, render_kind);
        cloud.line_indices = line_indices;
        cloud
    }

    #[must_use]
    pub fn coordinates(&self) -> &DMatrix<f64> {
        &self.coordinates
    }

    #[must_use]
    pub fn line_indices(&self) -> &[[usize; 2]] {
        &self.line_indices
    }

    #[must_use]
    pub fn scale(&self) -> &DVector<f64> {
        &self.scale
    }

    #[must_use]
    pub fn is_dragged(&self) -> bool {
        self.drag_anchor.is_some()
    }

    #[must_use]
    pub fn dimension(&self) -> Option<Dimension> {
        u8::try_from(self.coordinates.nrows())
            .ok()
            .and_then(|size| Dimension::try_from(size).ok())
    }

    /// Schaalt de oorspronkelijke punten per as met de (gesnapte) factoren.
    pub fn move_to(&mut self, scale: &DVector<f64>) {
        if scale.len() != self.original_coordinates.nrows() {
            return;
        }
        self.scale = snap_vector(scale);
        let mut coordinates = self.original_coordinates.clone();
        for (mut row, factor) in coordinates.row_iter_mut().zip(self.scale.iter()) {
            row *= *factor;
        }
        self.coordinates = coordinates;
    }

    fn drag_to(&mut self, world: &DVector<f64>) {
        let Some((anchor, start_scale)) = self.drag_anchor.as_ref() else {
            return;
        };
        let scale = DVector::from_fn(start_scale.len(), |row, _| {
            if anchor[row].abs() < f64::EPSILON {
                start_scale[row]
            } else {
                start_scale[row] * world[row] / anchor[row]
            }
        });
        self.move_to(&scale);
    }

    fn nearest_point(&self, mouse: Point2<f64>, coords: &AnyCoordinateSystem) -> Option<usize> {
        coords
            .project(&self.coordinates)
            .into_iter()
            .enumerate()
            .filter_map(|(index, point)| point.map(|point| (index, (point - mouse).norm_squared())))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}

impl Element for PointCloud {
    fn state(&self) -> &ElementState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ElementState {
        &mut self.state
    }

    fn array(&self) -> Option<DMatrix<f64>> {
        Some(self.coordinates.clone())
    }

    fn is_hovered(&self, mouse: Point2<f64>, coords: &AnyCoordinateSystem) -> bool {
        self.state.visible && any_within_hover(mouse, &coords.project(&self.coordinates))
    }

    fn render(&self, sink: &mut dyn RenderSink, coords: &AnyCoordinateSystem) {
        let points = coords.project(&self.coordinates);
        match self.state.render_kind {
            RenderKind::Point => {
                let radius = if self.state.hovered { 4.0 } else { 3.0 };
                for point in points.iter().flatten() {
                    sink.draw_circle(*point, radius, GREEN);
                }
            }
            RenderKind::Line if self.line_indices.is_empty() => {
                let zero = coords.zero_point();
                for point in points.iter().flatten() {
                    sink.draw_line(zero, *point, GREEN, 1.0);
                }
            }
            RenderKind::Line => {
                let width = self.state.line_width();
                for [from, to] in &self.line_indices {
                    if let (Some(Some(a)), Some(Some(b))) = (points.get(*from), points.get(*to)) {
                        sink.draw_line(*a, *b, GREEN, width);
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
                if !self.is_hovered(context.mouse, context.coords) || !context.claim_drag() {
                    return;
                }
                let grabbed = self
                    .nearest_point(context.mouse, context.coords)
                    .map(|index| self.coordinates.column(index).into_owned());
                if let Some(grabbed) = grabbed {
                    self.drag_anchor = Some((grabbed, self.scale.clone()));
                }
            }
            InputEvent::PointerUp {
                button: MouseButton::Primary,
            } => self.drag_anchor = None,
            InputEvent::PointerMove { .. } => {
                let Some((anchor, _)) = self.drag_anchor.as_ref() else {
                    return;
                };
                if let Some(world) = context.coords.screen_to_world(context.mouse, anchor) {
                    self.drag_to(&world);
                }
            }
            _ => {}
        }
    }
}
