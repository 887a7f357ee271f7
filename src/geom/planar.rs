use nalgebra::{DMatrix, DVector, Matrix3, Point2, Vector2};

use super::affine::create_affine_transformation;
use super::transform::apply_transform;
use super::{CoordinateSystem, Dimension};

const PSEUDO_INVERSE_EPSILON: f64 = 1e-12;

/// Pan/zoom mapping from the world plane to screen pixels.
///
/// `coord` is always a product of translation and scale matrices and therefore
/// invertible. World y grows upward, screen y downward; the default scale has a
/// negative y component to account for that.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSystem2D {
    coord: Matrix3<f64>,
    screen_size: Vector2<f64>,
    zoom_factor: f64,
}

impl CoordinateSystem2D {
    /// Places the world origin in the middle of the screen with
    /// `pixels_per_unit` pixels per world unit.
    #[must_use]
    pub fn new(screen_size: Vector2<f64>, pixels_per_unit: f64, zoom_factor: f64) -> Self {
        let coord = create_affine_transformation(
            screen_size / 2.0,
            Vector2::new(pixels_per_unit, -pixels_per_unit),
        );
        Self {
            coord,
            screen_size,
            zoom_factor,
        }
    }

    /// Wraps an existing matrix; used by tests and restored views.
    #[must_use]
    pub fn from_matrix(coord: Matrix3<f64>, screen_size: Vector2<f64>, zoom_factor: f64) -> Self {
        Self {
            coord,
            screen_size,
            zoom_factor,
        }
    }

    #[must_use]
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.coord
    }

    pub fn set_screen_size(&mut self, size: Vector2<f64>) {
        self.screen_size = size;
    }

    /// Pixels per world unit along x.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.coord[(0, 0)]
    }

    pub fn zoom_in(&mut self, focus: Option<Point2<f64>>) {
        self.zoom(self.zoom_factor, focus);
    }

    pub fn zoom_out(&mut self, focus: Option<Point2<f64>>) {
        self.zoom(1.0 / self.zoom_factor, focus);
    }

    fn zoom(&mut self, scale: f64, focus: Option<Point2<f64>>) {
        let scale_mat = create_affine_transformation(Vector2::zeros(), Vector2::new(scale, scale));
        self.coord *= scale_mat;

        // Scaling happens around the world origin; shift so the focus stays put.
        if let Some(focus) = focus {
            let shift = (focus - self.zero_point()) * (1.0 - scale);
            self.translate(shift);
        }
    }

    /// Pans by a screen-space delta in pixels.
    pub fn translate(&mut self, screen_delta: Vector2<f64>) {
        let flipped = Vector2::new(screen_delta.x, -screen_delta.y);
        let world_delta = flipped / self.scale();
        self.coord *= create_affine_transformation(world_delta, Vector2::new(1.0, 1.0));
    }

    /// World columns `[2, N]` to screen columns `[2, N]`.
    #[must_use]
    pub fn transform(&self, world: &DMatrix<f64>) -> DMatrix<f64> {
        let coord = dynamic(&self.coord);
        apply_transform(&coord, world, false).unwrap_or_else(|_| DMatrix::zeros(2, world.ncols()))
    }

    /// Single-point form of [`Self::transform`].
    #[must_use]
    pub fn transform_point(&self, world: Point2<f64>) -> Point2<f64> {
        let homogeneous = self.coord * world.to_homogeneous();
        Point2::new(homogeneous.x, homogeneous.y)
    }

    /// Screen columns `[2, N]` back to world columns through the pseudo-inverse.
    #[must_use]
    pub fn transform_inverse(&self, screen: &DMatrix<f64>) -> DMatrix<f64> {
        let inverse = dynamic(&self.inverse_matrix());
        apply_transform(&inverse, screen, false).unwrap_or_else(|_| DMatrix::zeros(2, screen.ncols()))
    }

    /// Single-point form of [`Self::transform_inverse`].
    #[must_use]
    pub fn transform_inverse_point(&self, screen: Point2<f64>) -> Point2<f64> {
        let homogeneous = self.inverse_matrix() * screen.to_homogeneous();
        Point2::new(homogeneous.x, homogeneous.y)
    }

    fn inverse_matrix(&self) -> Matrix3<f64> {
        self.coord
            .pseudo_inverse(PSEUDO_INVERSE_EPSILON)
            .unwrap_or_else(|_| Matrix3::identity())
    }
}

impl CoordinateSystem for CoordinateSystem2D {
    fn dimension(&self) -> Dimension {
        Dimension::Two
    }

    fn screen_size(&self) -> Vector2<f64> {
        self.screen_size
    }

    fn project(&self, world: &DMatrix<f64>) -> Vec<Option<Point2<f64>>> {
        self.project_unclipped(world).into_iter().map(Some).collect()
    }

    fn project_unclipped(&self, world: &DMatrix<f64>) -> Vec<Point2<f64>> {
        let screen = self.transform(world);
        screen
            .column_iter()
            .map(|column| Point2::new(column[0], column[1]))
            .collect()
    }

    fn zero_point(&self) -> Point2<f64> {
        self.transform_point(Point2::origin())
    }

    fn screen_to_world(&self, screen: Point2<f64>, _anchor: &DVector<f64>) -> Option<DVector<f64>> {
        let world = self.transform_inverse_point(screen);
        Some(DVector::from_vec(vec![world.x, world.y]))
    }
}

fn dynamic(matrix: &Matrix3<f64>) -> DMatrix<f64> {
    DMatrix::from_column_slice(3, 3, matrix.as_slice())
}
