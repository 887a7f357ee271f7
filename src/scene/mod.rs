//! Elementmodel van de visualisatie.
//!
//! Alle elementen delen [`ElementState`] en de [`Element`]-trait; de
//! [`ElementKind`]-enum is de gesloten verzameling varianten waarover de
//! [`ElementBuffer`] verdeelt.

mod buffer;
mod controller;
mod custom;
mod event;
mod grid;
mod matrix;
mod point_cloud;
mod render;
mod transformed;
mod vector;

use std::fmt;

use nalgebra::{DMatrix, Point2};
use serde::{Deserialize, Serialize};

use crate::expr::Value;
use crate::geom::{AnyCoordinateSystem, CoordinateSystem, Dimension, within_hover_distance};

pub use buffer::{Collection, Command, ElementBuffer, ElementSummary, SceneError};
pub use controller::{CameraControl, Controller};
pub use custom::{CustomTransformed, DefinitionStatus, Diagnostic};
pub use event::{EventContext, InputEvent, MouseButton};
pub use grid::{Grid, adapt_quotient};
pub use matrix::{Transform, TransformKind};
pub use point_cloud::{
    PointCloud, create_cube, generate_house, generate_line, generate_unit_circle, lift_to_3d,
};
pub use render::{
    AXIS_COLORS, BLUE, CYAN, Color, DrawCommand, DrawList, GREEN, GRID, GRID_AXIS, LABEL, MAGENTA,
    RED, RenderSink, YELLOW, axis_color,
};
pub use transformed::Transformed;
pub use vector::Vector;

/// Verandering per gesleepte pixel bij het bewerken van een waarde via een label.
pub const VALUE_DRAG_SENSITIVITY: f64 = 0.01;

/// Stabiele identifier van een element binnen de buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub usize);

impl ElementId {
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Manier waarop de kolommen van een element getekend worden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderKind {
    /// Lijn vanaf de oorsprong (of langs de randen van een object).
    Line,
    /// Losse punten.
    Point,
}

impl RenderKind {
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Line => Self::Point,
            Self::Point => Self::Line,
        }
    }
}

/// Gedeelde toestand van ieder element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementState {
    pub id: ElementId,
    pub name: String,
    pub visible: bool,
    pub render_kind: RenderKind,
    pub hovered: bool,
    pub has_to_be_removed: bool,
}

impl ElementState {
    #[must_use]
    pub fn new(name: impl Into<String>, render_kind: RenderKind) -> Self {
        Self {
            id: ElementId::default(),
            name: name.into(),
            visible: true,
            render_kind,
            hovered: false,
            has_to_be_removed: false,
        }
    }

    #[must_use]
    pub fn line_width(&self) -> f64 {
        if self.hovered { 3.0 } else { 1.0 }
    }
}

/// Gemeenschappelijke capaciteiten van alle elementen.
pub trait Element {
    fn state(&self) -> &ElementState;

    fn state_mut(&mut self) -> &mut ElementState;

    /// Geometrie als kolommen `[d, N]`, of `None` als er niets te tonen is.
    fn array(&self) -> Option<DMatrix<f64>>;

    /// Waarde waaronder het element in een expressie bekend is.
    fn value(&self) -> Option<Value> {
        self.array().map(Value::Matrix)
    }

    fn is_hovered(&self, mouse: Point2<f64>, coords: &AnyCoordinateSystem) -> bool;

    fn render(&self, sink: &mut dyn RenderSink, coords: &AnyCoordinateSystem);

    /// Verwerkt ieder event, ook als het element niet geraakt wordt.
    fn handle_event(&mut self, event: &InputEvent, context: &mut EventContext<'_>) {
        handle_common_event(self, event, context);
    }
}

/// Hover-bijwerking en de sneltoetsen `v`, `r` en Delete/Backspace.
pub fn handle_common_event<E: Element + ?Sized>(
    element: &mut E,
    event: &InputEvent,
    context: &mut EventContext<'_>,
) {
    match event {
        InputEvent::PointerMove { .. } => {
            let hovered = element.is_hovered(context.mouse, context.coords);
            element.state_mut().hovered = hovered;
        }
        InputEvent::KeyDown { code, character } => {
            if !element.is_hovered(context.mouse, context.coords) {
                return;
            }
            let state = element.state_mut();
            match (code.as_str(), character) {
                (_, Some('v')) => state.visible = !state.visible,
                (_, Some('r')) => state.render_kind = state.render_kind.next(),
                ("Delete" | "Backspace", _) => {
                    log::debug!("element {} gemarkeerd voor verwijderen", state.name);
                    state.has_to_be_removed = true;
                }
                _ => {}
            }
        }
        _ => {}
    }
}

/// Of een van de geprojecteerde punten binnen de hover-afstand ligt.
pub(crate) fn any_within_hover(mouse: Point2<f64>, points: &[Option<Point2<f64>>]) -> bool {
    points
        .iter()
        .flatten()
        .any(|point| within_hover_distance(mouse, *point))
}

/// Tekent kolommen als punten of als lijnen vanaf de oorsprong.
pub(crate) fn draw_columns(
    sink: &mut dyn RenderSink,
    coords: &AnyCoordinateSystem,
    columns: &DMatrix<f64>,
    render_kind: RenderKind,
    color: Color,
    size: f64,
) {
    let zero = coords.zero_point();
    for point in coords.project(columns).into_iter().flatten() {
        match render_kind {
            RenderKind::Point => sink.draw_circle(point, size, color),
            RenderKind::Line => sink.draw_line(zero, point, color, size),
        }
    }
}

/// Gesloten verzameling van elementvarianten.
#[derive(Debug, Clone)]
pub enum ElementKind {
    Vector(Vector),
    PointCloud(PointCloud),
    Transform(Transform),
    Transformed(Transformed),
    Custom(CustomTransformed),
}

impl ElementKind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Vector(_) => "Vector",
            Self::PointCloud(_) => "PointCloud",
            Self::Transform(_) => "Transform",
            Self::Transformed(_) => "Transformed",
            Self::Custom(_) => "CustomTransformed",
        }
    }

    /// De collectie in de buffer waar deze variant thuishoort.
    #[must_use]
    pub fn collection(&self) -> Collection {
        match self {
            Self::Vector(_) | Self::PointCloud(_) => Collection::Elements,
            Self::Transform(_) => Collection::Transforms,
            Self::Transformed(_) | Self::Custom(_) => Collection::Transformed,
        }
    }

    #[must_use]
    pub fn id(&self) -> ElementId {
        self.state().id
    }

    #[must_use]
    pub fn element_name(&self) -> &str {
        &self.state().name
    }

    /// Dimensie van de geometrie, als die vastligt.
    #[must_use]
    pub fn dimension(&self) -> Option<Dimension> {
        match self {
            Self::Vector(vector) => vector.dimension(),
            Self::PointCloud(cloud) => cloud.dimension(),
            Self::Transform(transform) => Some(transform.dimension()),
            Self::Transformed(_) | Self::Custom(_) => None,
        }
    }

    fn inner(&self) -> &dyn Element {
        match self {
            Self::Vector(element) => element,
            Self::PointCloud(element) => element,
            Self::Transform(element) => element,
            Self::Transformed(element) => element,
            Self::Custom(element) => element,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Element {
        match self {
            Self::Vector(element) => element,
            Self::PointCloud(element) => element,
            Self::Transform(element) => element,
            Self::Transformed(element) => element,
            Self::Custom(element) => element,
        }
    }
}

impl Element for ElementKind {
    fn state(&self) -> &ElementState {
        self.inner().state()
    }

    fn state_mut(&mut self) -> &mut ElementState {
        self.inner_mut().state_mut()
    }

    fn array(&self) -> Option<DMatrix<f64>> {
        self.inner().array()
    }

    fn value(&self) -> Option<Value> {
        self.inner().value()
    }

    fn is_hovered(&self, mouse: Point2<f64>, coords: &AnyCoordinateSystem) -> bool {
        self.inner().is_hovered(mouse, coords)
    }

    fn render(&self, sink: &mut dyn RenderSink, coords: &AnyCoordinateSystem) {
        self.inner().render(sink, coords);
    }

    fn handle_event(&mut self, event: &InputEvent, context: &mut EventContext<'_>) {
        self.inner_mut().handle_event(event, context);
    }
}

impl From<Vector> for ElementKind {
    fn from(value: Vector) -> Self {
        Self::Vector(value)
    }
}

impl From<PointCloud> for ElementKind {
    fn from(value: PointCloud) -> Self {
        Self::PointCloud(value)
    }
}

impl From<Transform> for ElementKind {
    fn from(value: Transform) -> Self {
        Self::Transform(value)
    }
}

impl From<Transformed> for ElementKind {
    fn from(value: Transformed) -> Self {
        Self::Transformed(value)
    }
}

impl From<CustomTransformed> for ElementKind {
    fn from(value: CustomTransformed) -> Self {
        Self::Custom(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::CoordinateSystem2D;
    use nalgebra::{DVector, Vector2};

    fn coords() -> AnyCoordinateSystem {
        AnyCoordinateSystem::Planar(CoordinateSystem2D::new(Vector2::new(1280.0, 720.0), 100.0, 1.2))
    }

    fn hovered_vector() -> (ElementKind, AnyCoordinateSystem, Point2<f64>) {
        let vector = Vector::new("v1", DVector::from_vec(vec![1.0, 0.0]), RenderKind::Line);
        (ElementKind::from(vector), coords(), Point2::new(740.0, 360.0))
    }

    #[test]
    fn render_kind_cycles() {
        assert_eq!(RenderKind::Line.next(), RenderKind::Point);
        assert_eq!(RenderKind::Line.next().next(), RenderKind::Line);
    }

    #[test]
    fn pointer_move_updates_hover_flag() {
        let (mut element, coords, mouse) = hovered_vector();
        let mut context = EventContext::new(mouse, &coords);
        element.handle_event(&InputEvent::pointer_move(mouse.x, mouse.y, 0.0, 0.0), &mut context);
        assert!(element.state().hovered);

        let mut context = EventContext::new(Point2::new(0.0, 0.0), &coords);
        element.handle_event(&InputEvent::pointer_move(0.0, 0.0, 0.0, 0.0), &mut context);
        assert!(!element.state().hovered);
    }

    #[test]
    fn shortcuts_apply_to_hovered_element() {
        let (mut element, coords, mouse) = hovered_vector();
        let mut context = EventContext::new(mouse, &coords);

        element.handle_event(&InputEvent::key_down("KeyR", Some('r')), &mut context);
        assert_eq!(element.state().render_kind, RenderKind::Point);

        element.handle_event(&InputEvent::key_down("Backspace", None), &mut context);
        assert!(element.state().has_to_be_removed);

        element.handle_event(&InputEvent::key_down("KeyV", Some('v')), &mut context);
        assert!(!element.state().visible);
    }

    #[test]
    fn shortcuts_ignore_elements_away_from_cursor() {
        let (mut element, coords, _) = hovered_vector();
        let mut context = EventContext::new(Point2::new(10.0, 10.0), &coords);
        element.handle_event(&InputEvent::key_down("Delete", None), &mut context);
        assert!(!element.state().has_to_be_removed);
    }

    #[test]
    fn kinds_map_to_collections() {
        let (element, _, _) = hovered_vector();
        assert_eq!(element.collection(), Collection::Elements);
        assert_eq!(element.name(), "Vector");
        let transform = ElementKind::from(Transform::linear("T1", Dimension::Two));
        assert_eq!(transform.collection(), Collection::Transforms);
    }
}
