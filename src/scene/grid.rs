//! Achtergrondraster met assen en getallen.

use nalgebra::{DMatrix, Point2, Vector2};

use super::{GRID, GRID_AXIS, LABEL, RenderSink, axis_color};
use crate::geom::{AnyCoordinateSystem, CoordinateSystem, CoordinateSystem2D};

/// Gewenst aantal rasterlijnen over de breedte van een referentiescherm.
const TARGET_NUM_POINTS: f64 = 12.0;
const REFERENCE_SCREEN_WIDTH: f64 = 1280.0;
const TARGET_DIVIDENDS: [f64; 4] = [1.0, 2.5, 5.0, 10.0];
const LABEL_OFFSET: f64 = 10.0;
/// Bovengrens op het aantal lijnen per richting, voor extreme zoomniveaus.
const MAX_LINES: i64 = 1000;

/// Rondt een gewenste rasterafstand af op `{1, 2.5, 5, 10} × 10^k`.
///
/// Geeft `None` voor een niet-positieve of niet-eindige afstand.
#[must_use]
pub fn adapt_quotient(quotient: f64) -> Option<f64> {
    if !quotient.is_finite() || quotient <= 0.0 {
        return None;
    }
    let mut normalized = quotient;
    let mut exponent = 0_i32;
    while normalized > 10.0 {
        normalized *= 0.1;
        exponent += 1;
    }
    while normalized < 1.0 {
        normalized *= 10.0;
        exponent -= 1;
    }
    let best = TARGET_DIVIDENDS
        .iter()
        .copied()
        .min_by(|a, b| (normalized - a).abs().total_cmp(&(normalized - b).abs()))?;
    Some(best * 10_f64.powi(exponent))
}

/// Tekent het raster onder de elementen.
#[derive(Debug, Clone, Copy, Default)]
pub struct Grid;

impl Grid {
    pub fn render(&self, sink: &mut dyn RenderSink, coords: &AnyCoordinateSystem) {
        match coords {
            AnyCoordinateSystem::Planar(planar) => render_planar(sink, planar),
            AnyCoordinateSystem::Camera(_) => render_axes(sink, coords),
        }
    }
}

fn render_planar(sink: &mut dyn RenderSink, coords: &CoordinateSystem2D) {
    let screen = sink.screen_size();
    let top_left = coords.transform_inverse_point(Point2::origin());
    let bottom_right = coords.transform_inverse_point(Point2::new(screen.x, screen.y));

    let target_points = (TARGET_NUM_POINTS * screen.x / REFERENCE_SCREEN_WIDTH).floor().max(1.0);
    let Some(spacing) = adapt_quotient((bottom_right.x - top_left.x) / target_points) else {
        return;
    };

    let columns = steps(top_left.x, bottom_right.x, spacing);
    let rows = steps(bottom_right.y, top_left.y, spacing);

    for &step in &columns {
        let x = coords.transform_point(Point2::new(step_value(step, spacing), 0.0)).x;
        let color = if step == 0 { GRID_AXIS } else { GRID };
        sink.draw_line(Point2::new(x, 0.0), Point2::new(x, screen.y), color, 1.0);
    }
    for &step in &rows {
        let y = coords.transform_point(Point2::new(0.0, step_value(step, spacing))).y;
        let color = if step == 0 { GRID_AXIS } else { GRID };
        sink.draw_line(Point2::new(0.0, y), Point2::new(screen.x, y), color, 1.0);
    }

    let zero = coords.transform_point(Point2::origin());
    let offset = Vector2::new(LABEL_OFFSET, LABEL_OFFSET);
    if 0.0 < zero.y && zero.y < screen.y {
        for &step in columns.iter().filter(|step| **step != 0) {
            let x = step_value(step, spacing);
            let position = coords.transform_point(Point2::new(x, 0.0)) + offset;
            sink.blit_text(&format!("{x:.2}"), position, LABEL);
        }
    }
    if 0.0 < zero.x && zero.x < screen.x {
        for &step in rows.iter().filter(|step| **step != 0) {
            let y = step_value(step, spacing);
            let position = coords.transform_point(Point2::new(0.0, y)) + offset;
            sink.blit_text(&format!("{y:.2}"), position, LABEL);
        }
    }
}

/// Gehele rasterindices tussen `min` en `max`, beide afgerond.
#[allow(clippy::cast_possible_truncation)]
fn steps(min: f64, max: f64, spacing: f64) -> Vec<i64> {
    let first = (min / spacing).round() as i64;
    let last = (max / spacing).round() as i64;
    if last < first || last - first > MAX_LINES {
        return Vec::new();
    }
    (first..=last).collect()
}

#[allow(clippy::cast_precision_loss)]
fn step_value(step: i64, spacing: f64) -> f64 {
    step as f64 * spacing
}

fn render_axes(sink: &mut dyn RenderSink, coords: &AnyCoordinateSystem) {
    let d = coords.dimension().size();
    let origin = coords.project(&DMatrix::zeros(d, 1)).into_iter().next().flatten();
    let Some(origin) = origin else {
        return;
    };
    let tips = coords.project(&DMatrix::identity(d, d));
    for (index, tip) in tips.into_iter().enumerate() {
        if let Some(tip) = tip {
            sink.draw_line(origin, tip, axis_color(index), 1.0);
        }
    }
}
