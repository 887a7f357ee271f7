//! Tekenoppervlak waar de scène naartoe rendert.
//!
//! De scène roept alleen [`RenderSink`] aan; het canvas aan de JavaScript-kant
//! speelt de opgenomen [`DrawCommand`]s af.

use nalgebra::{Point2, Vector2};
use serde::Serialize;

/// RGB-kleur met 8 bits per kanaal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

pub const RED: Color = Color::rgb(255, 80, 80);
pub const GREEN: Color = Color::rgb(100, 220, 100);
pub const BLUE: Color = Color::rgb(80, 80, 240);
pub const CYAN: Color = Color::rgb(0, 220, 220);
pub const YELLOW: Color = Color::rgb(220, 220, 0);
pub const MAGENTA: Color = Color::rgb(220, 0, 220);
pub const GRID: Color = Color::rgb(50, 50, 50);
pub const GRID_AXIS: Color = Color::rgb(130, 130, 130);
pub const LABEL: Color = Color::rgb(180, 180, 180);

/// Kleur per kolom van een transformatiematrix.
pub const AXIS_COLORS: [Color; 4] = [CYAN, YELLOW, MAGENTA, BLUE];

/// Kleur van de as met index `index`; valt terug op de laatste kleur.
#[must_use]
pub fn axis_color(index: usize) -> Color {
    AXIS_COLORS[index.min(AXIS_COLORS.len() - 1)]
}

/// Abstract 2D-tekenoppervlak.
pub trait RenderSink {
    fn screen_size(&self) -> Vector2<f64>;
    fn draw_line(&mut self, from: Point2<f64>, to: Point2<f64>, color: Color, width: f64);
    fn draw_circle(&mut self, center: Point2<f64>, radius: f64, color: Color);
    fn blit_text(&mut self, text: &str, position: Point2<f64>, color: Color);
}

/// Eén opgenomen tekenopdracht.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum DrawCommand {
    Line {
        from: [f64; 2],
        to: [f64; 2],
        color: Color,
        width: f64,
    },
    Circle {
        center: [f64; 2],
        radius: f64,
        color: Color,
    },
    Text {
        text: String,
        position: [f64; 2],
        color: Color,
    },
}

/// [`RenderSink`] die alle opdrachten in volgorde opslaat.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DrawList {
    screen_size: [f64; 2],
    commands: Vec<DrawCommand>,
}

impl DrawList {
    #[must_use]
    pub fn new(screen_size: Vector2<f64>) -> Self {
        Self {
            screen_size: [screen_size.x, screen_size.y],
            commands: Vec::new(),
        }
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Aantal lijnen en cirkels in een bepaalde kleur.
    #[must_use]
    pub fn count_with_color(&self, color: Color) -> usize {
        self.commands
            .iter()
            .filter(|command| match command {
                DrawCommand::Line { color: c, .. }
                | DrawCommand::Circle { color: c, .. }
                | DrawCommand::Text { color: c, .. } => *c == color,
            })
            .count()
    }
}

impl RenderSink for DrawList {
    fn screen_size(&self) -> Vector2<f64> {
        Vector2::new(self.screen_size[0], self.screen_size[1])
    }

    fn draw_line(&mut self, from: Point2<f64>, to: Point2<f64>, color: Color, width: f64) {
        self.commands.push(DrawCommand::Line {
            from: [from.x, from.y],
            to: [to.x, to.y],
            color,
            width,
        });
    }

    fn draw_circle(&mut self, center: Point2<f64>, radius: f64, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center: [center.x, center.y],
            radius,
            color,
        });
    }

    fn blit_text(&mut self, text: &str, position: Point2<f64>, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            position: [position.x, position.y],
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_list_records_in_order() {
        let mut list = DrawList::new(Vector2::new(800.0, 600.0));
        list.draw_line(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), RED, 1.0);
        list.draw_circle(Point2::new(5.0, 5.0), 3.0, GREEN);
        list.blit_text("1.00", Point2::new(2.0, 2.0), LABEL);

        assert_eq!(list.len(), 3);
        assert!(matches!(list.commands()[0], DrawCommand::Line { .. }));
        assert!(matches!(list.commands()[2], DrawCommand::Text { .. }));
        assert_eq!(list.count_with_color(GREEN), 1);
        assert_eq!(list.screen_size(), Vector2::new(800.0, 600.0));
    }

    #[test]
    fn axis_colors_saturate() {
        assert_eq!(axis_color(0), CYAN);
        assert_eq!(axis_color(3), BLUE);
        assert_eq!(axis_color(9), BLUE);
    }
}
