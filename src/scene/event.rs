//! Invoergebeurtenissen zoals ze van het venster of de browser binnenkomen.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::geom::AnyCoordinateSystem;

/// Muisknop van een pointer-event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Primary,
    Secondary,
    Middle,
}

/// Gebeurtenis uit de event loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputEvent {
    /// Nieuwe cursorpositie in pixels; `delta` is de verplaatsing sinds de vorige.
    PointerMove {
        position: [f64; 2],
        #[serde(default)]
        delta: [f64; 2],
    },
    PointerDown {
        button: MouseButton,
    },
    PointerUp {
        button: MouseButton,
    },
    /// Scrollwiel; positief zoomt in.
    Wheel {
        delta: f64,
    },
    KeyDown {
        code: String,
        #[serde(default)]
        character: Option<char>,
    },
    KeyUp {
        code: String,
        #[serde(default)]
        character: Option<char>,
    },
}

impl InputEvent {
    #[must_use]
    pub fn pointer_move(x: f64, y: f64, dx: f64, dy: f64) -> Self {
        Self::PointerMove {
            position: [x, y],
            delta: [dx, dy],
        }
    }

    #[must_use]
    pub fn key_down(code: &str, character: Option<char>) -> Self {
        Self::KeyDown {
            code: code.to_owned(),
            character,
        }
    }

    #[must_use]
    pub fn key_up(code: &str, character: Option<char>) -> Self {
        Self::KeyUp {
            code: code.to_owned(),
            character,
        }
    }

    /// Of dit een indrukken of loslaten van de primaire knop is.
    #[must_use]
    pub fn is_primary_button(&self) -> bool {
        matches!(
            self,
            Self::PointerDown {
                button: MouseButton::Primary
            } | Self::PointerUp {
                button: MouseButton::Primary
            }
        )
    }
}

/// Context die bij het verdelen van één event over alle elementen hoort.
///
/// `drag_claimed` wordt gezet door het eerste element dat een sleepactie
/// begint; latere elementen starten dan geen eigen sleepactie meer.
#[derive(Debug)]
pub struct EventContext<'a> {
    pub mouse: Point2<f64>,
    pub coords: &'a AnyCoordinateSystem,
    pub drag_claimed: bool,
}

impl<'a> EventContext<'a> {
    #[must_use]
    pub fn new(mouse: Point2<f64>, coords: &'a AnyCoordinateSystem) -> Self {
        Self {
            mouse,
            coords,
            drag_claimed: false,
        }
    }

    /// Probeert de sleepactie te claimen; `false` als iemand anders al sleept.
    pub fn claim_drag(&mut self) -> bool {
        if self.drag_claimed {
            return false;
        }
        self.drag_claimed = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_button_detection() {
        assert!(
            InputEvent::PointerDown {
                button: MouseButton::Primary
            }
            .is_primary_button()
        );
        assert!(
            !InputEvent::PointerUp {
                button: MouseButton::Secondary
            }
            .is_primary_button()
        );
        assert!(!InputEvent::Wheel { delta: 1.0 }.is_primary_button());
    }

    #[test]
    fn only_the_first_claim_wins() {
        let coords = crate::geom::AnyCoordinateSystem::Planar(crate::geom::CoordinateSystem2D::new(
            nalgebra::Vector2::new(800.0, 600.0),
            100.0,
            1.2,
        ));
        let mut context = EventContext::new(Point2::new(0.0, 0.0), &coords);
        assert!(context.claim_drag());
        assert!(!context.claim_drag());
        assert!(context.drag_claimed);
    }
}
