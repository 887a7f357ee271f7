//! Coordinate mapping between world space and screen space.
//!
//! Elements store their geometry as column matrices of shape `[d, N]` where
//! `d` is the scene [`Dimension`]. A [`CoordinateSystem`] maps those columns to
//! screen pixels; the planar variant is a pure affine map, the camera variant a
//! perspective projection with optional frustum clipping.

mod affine;
mod camera;
mod planar;
mod snap;
mod transform;

use std::fmt;

use nalgebra::{DMatrix, DVector, Point2, Vector2};
use serde::{Deserialize, Serialize};

pub use affine::{create_affine_transformation, scale_matrix, translation_matrix};
pub use camera::{CoordinateSystem3D, perspective_matrix};
pub use planar::CoordinateSystem2D;
pub use snap::{DRAG_SNAP_DISTANCE, snap, snap_scalar, snap_vector};
pub use transform::{TransformError, apply_transform, apply_transform_vector};

/// Squared screen distance (px²) below which a point counts as hovered.
pub const HOVER_THRESHOLD_SQUARED: f64 = 100.0;

/// Number of spatial components of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum Dimension {
    #[default]
    Two,
    Three,
}

impl Dimension {
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

impl TryFrom<u8> for Dimension {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(format!("unsupported dimension {other}, expected 2 or 3")),
        }
    }
}

impl From<Dimension> for u8 {
    fn from(value: Dimension) -> Self {
        match value {
            Dimension::Two => 2,
            Dimension::Three => 3,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}D", self.size())
    }
}

/// Shared contract of the planar and the camera coordinate system.
///
/// World input is always a column matrix `[d, N]`. Projection keeps the column
/// order so callers can map a screen hit back to the column it came from.
pub trait CoordinateSystem {
    fn dimension(&self) -> Dimension;

    /// Screen size in pixels.
    fn screen_size(&self) -> Vector2<f64>;

    /// Projects every column; `None` marks a clipped column.
    fn project(&self, world: &DMatrix<f64>) -> Vec<Option<Point2<f64>>>;

    /// Projects every column without frustum clipping.
    fn project_unclipped(&self, world: &DMatrix<f64>) -> Vec<Point2<f64>>;

    /// Screen position of the world origin.
    fn zero_point(&self) -> Point2<f64>;

    /// Maps a screen position back to world space.
    ///
    /// `anchor` is the current world position of whatever is being dragged. The
    /// planar system ignores it, the camera uses its depth to pick the plane
    /// the cursor is unprojected onto.
    fn screen_to_world(&self, screen: Point2<f64>, anchor: &DVector<f64>) -> Option<DVector<f64>>;
}

/// The coordinate system owned by a scene.
#[derive(Debug, Clone)]
pub enum AnyCoordinateSystem {
    Planar(CoordinateSystem2D),
    Camera(CoordinateSystem3D),
}

impl AnyCoordinateSystem {
    fn inner(&self) -> &dyn CoordinateSystem {
        match self {
            Self::Planar(system) => system,
            Self::Camera(system) => system,
        }
    }

    /// Updates the viewport size of both variants.
    pub fn set_screen_size(&mut self, size: Vector2<f64>) {
        match self {
            Self::Planar(system) => system.set_screen_size(size),
            Self::Camera(system) => system.set_screen_size(size),
        }
    }
}

impl CoordinateSystem for AnyCoordinateSystem {
    fn dimension(&self) -> Dimension {
        self.inner().dimension()
    }

    fn screen_size(&self) -> Vector2<f64> {
        self.inner().screen_size()
    }

    fn project(&self, world: &DMatrix<f64>) -> Vec<Option<Point2<f64>>> {
        self.inner().project(world)
    }

    fn project_unclipped(&self, world: &DMatrix<f64>) -> Vec<Point2<f64>> {
        self.inner().project_unclipped(world)
    }

    fn zero_point(&self) -> Point2<f64> {
        self.inner().zero_point()
    }

    fn screen_to_world(&self, screen: Point2<f64>, anchor: &DVector<f64>) -> Option<DVector<f64>> {
        self.inner().screen_to_world(screen, anchor)
    }
}

/// Returns true when `point` lies within the hover radius around `target`.
#[must_use]
pub fn within_hover_distance(point: Point2<f64>, target: Point2<f64>) -> bool {
    (point - target).norm_squared() < HOVER_THRESHOLD_SQUARED
}
