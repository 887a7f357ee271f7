//! Een enkele versleepbare vector.

use nalgebra::{DMatrix, DVector, Point2};

use super::{
    Element, ElementState, EventContext, GREEN, InputEvent, MouseButton, RenderKind, RenderSink,
    handle_common_event,
};
use crate::expr::Value;
use crate::geom::{
    AnyCoordinateSystem, CoordinateSystem, Dimension, snap_vector, within_hover_distance,
};

/// Vector met 2 of 3 componenten, getekend vanaf de oorsprong.
#[derive(Debug, Clone)]
pub struct Vector {
    state: ElementState,
    coordinates: DVector<f64>,
    dragged: bool,
}

impl Vector {
    #[must_use]
    pub fn new(name: impl Into<String>, coordinates: DVector<f64>, render_kind: RenderKind) -> Self {
        Self {
            state: ElementState::new(name, render_kind),
            coordinates,
            dragged: false,
        }
    }

    #[must_use]
    pub fn coordinates(&self) -> &DVector<f64> {
        &self.coordinates
    }

    /// Past één component aan; `false` als de index niet bestaat.
    pub fn set_component(&mut self, component: usize, value: f64) -> bool {
        match self.coordinates.get_mut(component) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_dragged(&self) -> bool {
        self.dragged
    }

    #[must_use]
    pub fn dimension(&self) -> Option<Dimension> {
        u8::try_from(self.coordinates.len())
            .ok()
            .and_then(|size| Dimension::try_from(size).ok())
    }

    fn column(&self) -> DMatrix<f64> {
        DMatrix::from_column_slice(self.coordinates.len(), 1, self.coordinates.as_slice())
    }

    fn screen_position(&self, coords: &AnyCoordinateSystem) -> Option<Point2<f64>> {
        coords.project(&self.column()).into_iter().next().flatten()
    }
}

impl Element for Vector {
    fn state(&self) -> &ElementState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ElementState {
        &mut self.state
    }

    fn array(&self) -> Option<DMatrix<f64>> {
        Some(self.column())
    }

    fn value(&self) -> Option<Value> {
        Some(Value::Vector(self.coordinates.clone()))
    }

    fn is_hovered(&self, mouse: Point2<f64>, coords: &AnyCoordinateSystem) -> bool {
        self.state.visible
            && self
                .screen_position(coords)
                .is_some_and(|position| within_hover_distance(mouse, position))
    }

    fn render(&self, sink: &mut dyn RenderSink, coords: &AnyCoordinateSystem) {
        let Some(position) = self.screen_position(coords) else {
            return;
        };
        let width = self.state.line_width();
        match self.state.render_kind {
            RenderKind::Point => sink.draw_circle(position, width, GREEN),
            RenderKind::Line => sink.draw_line(coords.zero_point(), position, GREEN, width),
        }
    }

    fn handle_event(&mut self, event: &InputEvent, context: &mut EventContext<'_>) {
        handle_common_event(self, event, context);
        match event {
            InputEvent::PointerDown {
                button: MouseButton::Primary,
            } => {
                if self.is_hovered(context.mouse, context.coords) && context.claim_drag() {
                    self.dragged = true;
                }
            }
            InputEvent::PointerUp {
                button: MouseButton::Primary,
            } => self.dragged = false,
            InputEvent::PointerMove { .. } if self.dragged => {
                if let Some(world) = context.coords.screen_to_world(context.mouse, &self.coordinates)
                {
                    self.coordinates = snap_vector(&world);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::CoordinateSystem2D;
    use crate::scene::DrawCommand;
    use crate::scene::DrawList;
    use nalgebra::Vector2;

    fn coords() -> AnyCoordinateSystem {
        AnyCoordinateSystem::Planar(CoordinateSystem2D::new(Vector2::new(1280.0, 720.0), 100.0, 1.2))
    }

    fn send(vector: &mut Vector, coords: &AnyCoordinateSystem, mouse: Point2<f64>, event: InputEvent) {
        let mut context = EventContext::new(mouse, coords);
        vector.handle_event(&event, &mut context);
    }

    #[test]
    fn drag_snaps_to_integer_coordinates() {
        let coords = coords();
        let mut vector = Vector::new("v1", DVector::from_vec(vec![1.0, 0.0]), RenderKind::Line);
        let press = Point2::new(740.0, 360.0);
        send(&mut vector, &coords, press, InputEvent::pointer_move(press.x, press.y, 0.0, 0.0));
        send(
            &mut vector,
            &coords,
            press,
            InputEvent::PointerDown {
                button: MouseButton::Primary,
            },
        );
        assert!(vector.is_dragged());

        // Wereldpositie (0.96, 0.02).
        let target = Point2::new(736.0, 358.0);
        send(&mut vector, &coords, target, InputEvent::pointer_move(target.x, target.y, -4.0, -2.0));
        assert_eq!(vector.coordinates(), &DVector::from_vec(vec![1.0, 0.0]));

        send(
            &mut vector,
            &coords,
            target,
            InputEvent::PointerUp {
                button: MouseButton::Primary,
            },
        );
        assert!(!vector.is_dragged());
    }

    #[test]
    fn drag_keeps_off_grid_positions() {
        let coords = coords();
        let mut vector = Vector::new("v1", DVector::from_vec(vec![1.0, 0.0]), RenderKind::Line);
        let press = Point2::new(740.0, 360.0);
        send(
            &mut vector,
            &coords,
            press,
            InputEvent::PointerDown {
                button: MouseButton::Primary,
            },
        );
        let target = Point2::new(790.0, 335.0);
        send(&mut vector, &coords, target, InputEvent::pointer_move(target.x, target.y, 50.0, -25.0));
        let coordinates = vector.coordinates();
        assert!((coordinates[0] - 1.5).abs() < 1e-9);
        assert!((coordinates[1] - 0.25).abs() < 1e-9);
    }

    #[test]
    fn claimed_drag_is_not_started_twice() {
        let coords = coords();
        let mut first = Vector::new("v1", DVector::from_vec(vec![1.0, 0.0]), RenderKind::Line);
        let mut second = Vector::new("v2", DVector::from_vec(vec![1.0, 0.0]), RenderKind::Line);
        let mut context = EventContext::new(Point2::new(740.0, 360.0), &coords);
        let press = InputEvent::PointerDown {
            button: MouseButton::Primary,
        };
        first.handle_event(&press, &mut context);
        second.handle_event(&press, &mut context);
        assert!(first.is_dragged());
        assert!(!second.is_dragged());
    }

    #[test]
    fn renders_line_from_origin() {
        let coords = coords();
        let vector = Vector::new("v1", DVector::from_vec(vec![1.0, 1.0]), RenderKind::Line);
        let mut list = DrawList::new(Vector2::new(1280.0, 720.0));
        vector.render(&mut list, &coords);
        assert_eq!(
            list.commands(),
            &[DrawCommand::Line {
                from: [640.0, 360.0],
                to: [740.0, 260.0],
                color: GREEN,
                width: 1.0,
            }]
        );
    }

    #[test]
    fn hidden_vectors_are_not_hovered() {
        let coords = coords();
        let mut vector = Vector::new("v1", DVector::from_vec(vec![1.0, 0.0]), RenderKind::Point);
        vector.state_mut().visible = false;
        assert!(!vector.is_hovered(Point2::new(740.0, 360.0), &coords));
    }
}
