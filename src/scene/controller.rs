//! Verdeelt invoer over de elementen en het coördinatensysteem.

use std::collections::BTreeSet;

use nalgebra::{Point2, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use super::{ElementBuffer, EventContext, InputEvent, MouseButton};
use crate::geom::AnyCoordinateSystem;

const CAMERA_TOGGLE_KEY: &str = "CapsLock";

/// Snelheden van de 3D-camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraControl {
    /// Radialen per pixel muisbeweging.
    pub rotation_speed: f64,
    /// Wereldeenheden per tick per ingedrukte bewegingstoets.
    pub move_speed: f64,
    /// Wereldeenheden per scrollstap.
    pub wheel_speed: f64,
}

impl Default for CameraControl {
    fn default() -> Self {
        Self {
            rotation_speed: 0.003,
            move_speed: 0.02,
            wheel_speed: 0.2,
        }
    }
}

/// Toestand van muis en toetsenbord tussen events.
#[derive(Debug, Clone)]
pub struct Controller {
    mouse: Point2<f64>,
    panning: bool,
    controlling_camera: bool,
    pressed_keys: BTreeSet<String>,
    camera: CameraControl,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(CameraControl::default())
    }
}

impl Controller {
    #[must_use]
    pub fn new(camera: CameraControl) -> Self {
        Self {
            mouse: Point2::origin(),
            panning: false,
            controlling_camera: false,
            pressed_keys: BTreeSet::new(),
            camera,
        }
    }

    #[must_use]
    pub fn mouse(&self) -> Point2<f64> {
        self.mouse
    }

    #[must_use]
    pub fn is_panning(&self) -> bool {
        self.panning
    }

    #[must_use]
    pub fn is_controlling_camera(&self) -> bool {
        self.controlling_camera
    }

    /// Verwerkt één event: eerst de elementen, daarna pan, zoom en camera.
    pub fn handle_event(
        &mut self,
        event: &InputEvent,
        coords: &mut AnyCoordinateSystem,
        buffer: &mut ElementBuffer,
    ) {
        if let InputEvent::PointerMove { position, .. } = event {
            self.mouse = Point2::new(position[0], position[1]);
        }

        let mut context = EventContext::new(self.mouse, coords);
        buffer.handle_event(event, &mut context);
        let drag_claimed = context.drag_claimed;

        match event {
            InputEvent::PointerDown {
                button: MouseButton::Primary,
            } => {
                self.panning = !drag_claimed && !buffer.any_hovered(self.mouse, coords);
            }
            InputEvent::PointerUp {
                button: MouseButton::Primary,
            } => self.panning = false,
            InputEvent::PointerMove { delta, .. } => {
                let delta = Vector2::new(delta[0], delta[1]);
                self.handle_motion(delta, coords);
            }
            InputEvent::Wheel { delta } => self.handle_wheel(*delta, coords),
            InputEvent::KeyDown { code, .. } => {
                self.pressed_keys.insert(code.clone());
            }
            InputEvent::KeyUp { code, .. } => {
                self.pressed_keys.remove(code);
                if code == CAMERA_TOGGLE_KEY && matches!(coords, AnyCoordinateSystem::Camera(_)) {
                    self.controlling_camera = !self.controlling_camera;
                    log::debug!("cameracontrole {}", if self.controlling_camera { "aan" } else { "uit" });
                }
            }
            InputEvent::PointerDown { .. } | InputEvent::PointerUp { .. } => {}
        }
    }

    fn handle_motion(&self, delta: Vector2<f64>, coords: &mut AnyCoordinateSystem) {
        match coords {
            AnyCoordinateSystem::Camera(camera) if self.controlling_camera => {
                camera.rotate(delta * -self.camera.rotation_speed);
            }
            AnyCoordinateSystem::Planar(planar) if self.panning => planar.translate(delta),
            _ => {}
        }
    }

    fn handle_wheel(&self, delta: f64, coords: &mut AnyCoordinateSystem) {
        if delta == 0.0 {
            return;
        }
        match coords {
            AnyCoordinateSystem::Planar(planar) => {
                if delta > 0.0 {
                    planar.zoom_in(Some(self.mouse));
                } else {
                    planar.zoom_out(Some(self.mouse));
                }
            }
            AnyCoordinateSystem::Camera(camera) => {
                let step = self.camera.wheel_speed * delta.signum();
                camera.move_by(Vector3::new(0.0, 0.0, -step), false);
            }
        }
    }

    /// Beweegt de camera voor iedere ingedrukte bewegingstoets.
    pub fn tick(&self, coords: &mut AnyCoordinateSystem) {
        let AnyCoordinateSystem::Camera(camera) = coords else {
            return;
        };
        let speed = self.camera.move_speed;
        let direction: Vector3<f64> = self
            .pressed_keys
            .iter()
            .filter_map(|code| match code.as_str() {
                "KeyW" => Some(Vector3::new(0.0, 0.0, -speed)),
                "KeyA" => Some(Vector3::new(-speed, 0.0, 0.0)),
                "KeyS" => Some(Vector3::new(0.0, 0.0, speed)),
                "KeyD" => Some(Vector3::new(speed, 0.0, 0.0)),
                "Space" => Some(Vector3::new(0.0, speed, 0.0)),
                "ControlLeft" => Some(Vector3::new(0.0, -speed, 0.0)),
                _ => None,
            })
            .sum();
        if direction != Vector3::zeros() {
            camera.move_by(direction, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{CoordinateSystem, CoordinateSystem2D, CoordinateSystem3D};
    use crate::scene::{Command, Element};
    use nalgebra::DVector;

    fn planar() -> AnyCoordinateSystem {
        AnyCoordinateSystem::Planar(CoordinateSystem2D::new(Vector2::new(1280.0, 720.0), 100.0, 1.2))
    }

    fn camera() -> AnyCoordinateSystem {
        AnyCoordinateSystem::Camera(CoordinateSystem3D::new(
            Vector3::new(0.0, 0.0, 2.0),
            60_f64.to_radians(),
            0.1,
            100.0,
            Vector2::new(1280.0, 720.0),
        ))
    }

    fn press() -> InputEvent {
        InputEvent::PointerDown {
            button: MouseButton::Primary,
        }
    }

    #[test]
    fn dragging_empty_space_pans() {
        let mut controller = Controller::default();
        let mut coords = planar();
        let mut buffer = ElementBuffer::new(crate::geom::Dimension::Two);

        controller.handle_event(&InputEvent::pointer_move(100.0, 100.0, 0.0, 0.0), &mut coords, &mut buffer);
        controller.handle_event(&press(), &mut coords, &mut buffer);
        assert!(controller.is_panning());
        controller.handle_event(&InputEvent::pointer_move(150.0, 80.0, 50.0, -20.0), &mut coords, &mut buffer);

        let zero = coords.zero_point();
        assert!((zero.x - 690.0).abs() < 1e-9 && (zero.y - 340.0).abs() < 1e-9);
    }

    #[test]
    fn dragging_an_element_does_not_pan() {
        let mut controller = Controller::default();
        let mut coords = planar();
        let mut buffer = ElementBuffer::new(crate::geom::Dimension::Two);
        let v1 = buffer.apply(Command::AddVector { coordinates: None }).unwrap().unwrap();

        controller.handle_event(&InputEvent::pointer_move(740.0, 360.0, 0.0, 0.0), &mut coords, &mut buffer);
        controller.handle_event(&press(), &mut coords, &mut buffer);
        assert!(!controller.is_panning());
        controller.handle_event(&InputEvent::pointer_move(740.0, 260.0, 0.0, -100.0), &mut coords, &mut buffer);

        assert_eq!(coords.zero_point(), Point2::new(640.0, 360.0));
        assert_eq!(
            buffer.get(v1).unwrap().value(),
            Some(crate::expr::Value::Vector(DVector::from_vec(vec![1.0, 1.0])))
        );
    }

    #[test]
    fn wheel_zooms_around_cursor() {
        let mut controller = Controller::default();
        let mut coords = planar();
        let mut buffer = ElementBuffer::new(crate::geom::Dimension::Two);
        controller.handle_event(&InputEvent::pointer_move(640.0, 360.0, 0.0, 0.0), &mut coords, &mut buffer);
        controller.handle_event(&InputEvent::Wheel { delta: 1.0 }, &mut coords, &mut buffer);

        let AnyCoordinateSystem::Planar(planar) = &coords else {
            panic!("verwacht een vlak coördinatensysteem");
        };
        assert!((planar.scale() - 120.0).abs() < 1e-9);
        let zero = coords.zero_point();
        assert!((zero.x - 640.0).abs() < 1e-9 && (zero.y - 360.0).abs() < 1e-9);
    }

    #[test]
    fn caps_lock_toggles_camera_rotation() {
        let mut controller = Controller::default();
        let mut coords = camera();
        let mut buffer = ElementBuffer::new(crate::geom::Dimension::Three);

        controller.handle_event(&InputEvent::key_up("CapsLock", None), &mut coords, &mut buffer);
        assert!(controller.is_controlling_camera());
        controller.handle_event(&InputEvent::pointer_move(700.0, 360.0, 60.0, 0.0), &mut coords, &mut buffer);

        let AnyCoordinateSystem::Camera(camera) = &coords else {
            panic!("verwacht een camera");
        };
        assert!(camera.rotation().angle() > 0.1);

        controller.handle_event(&InputEvent::key_up("CapsLock", None), &mut coords, &mut buffer);
        assert!(!controller.is_controlling_camera());
    }

    #[test]
    fn held_keys_move_camera_each_tick() {
        let mut controller = Controller::default();
        let mut coords = camera();
        let mut buffer = ElementBuffer::new(crate::geom::Dimension::Three);

        controller.handle_event(&InputEvent::key_down("KeyW", Some('w')), &mut coords, &mut buffer);
        controller.tick(&mut coords);
        controller.tick(&mut coords);
        controller.handle_event(&InputEvent::key_up("KeyW", Some('w')), &mut coords, &mut buffer);
        controller.tick(&mut coords);

        let AnyCoordinateSystem::Camera(camera) = &coords else {
            panic!("verwacht een camera");
        };
        assert!((camera.position().z - 1.96).abs() < 1e-9);
    }
}
