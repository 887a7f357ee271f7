use nalgebra::{
    DMatrix, DVector, Matrix4, Point2, Translation3, UnitQuaternion, Vector2, Vector3, Vector4,
};

use super::{CoordinateSystem, Dimension};

const W_EPSILON: f64 = 1e-12;

/// OpenGL style right-handed perspective projection.
///
/// Maps the view frustum (camera looking down -z) onto the cube `[-1, 1]³`
/// after the perspective divide.
#[must_use]
pub fn perspective_matrix(field_of_view: f64, aspect: f64, near: f64, far: f64) -> Matrix4<f64> {
    let focal = 1.0 / (field_of_view / 2.0).tan();
    Matrix4::new(
        focal / aspect, 0.0, 0.0, 0.0, //
        0.0, focal, 0.0, 0.0, //
        0.0, 0.0, (far + near) / (near - far), 2.0 * far * near / (near - far), //
        0.0, 0.0, -1.0, 0.0,
    )
}

/// Result of projecting a single world point.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Projected {
    screen: Point2<f64>,
    depth: f64,
    visible: bool,
}

/// Perspective camera that maps world points onto the screen.
///
/// Yaw and pitch are tracked separately and composed as `yaw * pitch`, which
/// keeps the horizon level. Every mutation recomputes the cached
/// `projection * view` matrix, so readers never see a stale transform.
#[derive(Debug, Clone)]
pub struct CoordinateSystem3D {
    position: Vector3<f64>,
    yaw_rotation: UnitQuaternion<f64>,
    pitch_rotation: UnitQuaternion<f64>,
    rotation: UnitQuaternion<f64>,
    field_of_view: f64,
    near: f64,
    far: f64,
    screen_size: Vector2<f64>,
    view_matrix: Matrix4<f64>,
    projection_matrix: Matrix4<f64>,
    transformation_matrix: Matrix4<f64>,
    inverse_transformation: Option<Matrix4<f64>>,
}

impl CoordinateSystem3D {
    /// `field_of_view` is the vertical opening angle in radians.
    #[must_use]
    pub fn new(
        position: Vector3<f64>,
        field_of_view: f64,
        near: f64,
        far: f64,
        screen_size: Vector2<f64>,
    ) -> Self {
        let mut system = Self {
            position,
            yaw_rotation: UnitQuaternion::identity(),
            pitch_rotation: UnitQuaternion::identity(),
            rotation: UnitQuaternion::identity(),
            field_of_view,
            near,
            far,
            screen_size,
            view_matrix: Matrix4::identity(),
            projection_matrix: Matrix4::identity(),
            transformation_matrix: Matrix4::identity(),
            inverse_transformation: None,
        };
        system.refresh();
        system
    }

    #[must_use]
    pub fn position(&self) -> &Vector3<f64> {
        &self.position
    }

    #[must_use]
    pub fn rotation(&self) -> &UnitQuaternion<f64> {
        &self.rotation
    }

    #[must_use]
    pub fn near(&self) -> f64 {
        self.near
    }

    #[must_use]
    pub fn far(&self) -> f64 {
        self.far
    }

    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        if self.screen_size.y > 0.0 {
            self.screen_size.x / self.screen_size.y
        } else {
            1.0
        }
    }

    #[must_use]
    pub fn view_matrix(&self) -> &Matrix4<f64> {
        &self.view_matrix
    }

    #[must_use]
    pub fn projection_matrix(&self) -> &Matrix4<f64> {
        &self.projection_matrix
    }

    /// `projection * view`, always in sync with position and rotation.
    #[must_use]
    pub fn transformation_matrix(&self) -> &Matrix4<f64> {
        &self.transformation_matrix
    }

    pub fn set_screen_size(&mut self, size: Vector2<f64>) {
        self.screen_size = size;
        self.refresh();
    }

    /// Horizontal delta turns around the world y axis, vertical delta around
    /// the camera x axis. Roll is never introduced.
    pub fn rotate(&mut self, delta: Vector2<f64>) {
        self.yaw_rotation *= UnitQuaternion::from_axis_angle(&Vector3::y_axis(), delta.x);
        self.pitch_rotation *= UnitQuaternion::from_axis_angle(&Vector3::x_axis(), delta.y);
        self.rotation = self.yaw_rotation * self.pitch_rotation;
        self.refresh();
    }

    /// Moves the camera. Relative directions are given in camera space, so
    /// `-z` is always "forward".
    pub fn move_by(&mut self, direction: Vector3<f64>, absolute: bool) {
        let direction = if absolute {
            direction
        } else {
            self.rotation * direction
        };
        self.position += direction;
        self.refresh();
    }

    fn refresh(&mut self) {
        let translation = Translation3::from(-self.position).to_homogeneous();
        self.view_matrix = self.rotation.inverse().to_homogeneous() * translation;
        self.projection_matrix =
            perspective_matrix(self.field_of_view, self.aspect_ratio(), self.near, self.far);
        self.transformation_matrix = self.projection_matrix * self.view_matrix;
        self.inverse_transformation = self.transformation_matrix.try_inverse();
    }

    fn project_point(&self, world: Vector3<f64>) -> Projected {
        let clip = self.transformation_matrix * world.push(1.0);
        let w = clip.w;
        if w.abs() < W_EPSILON {
            return Projected {
                screen: Point2::new(f64::NAN, f64::NAN),
                depth: f64::NAN,
                visible: false,
            };
        }
        let ndc = clip.xyz() / w;
        let inside = w > 0.0 && ndc.iter().all(|value| (-1.0..=1.0).contains(value));
        let screen = Point2::new(
            (ndc.x + 1.0) / 2.0 * self.screen_size.x,
            (1.0 - ndc.y) / 2.0 * self.screen_size.y,
        );
        Projected {
            screen,
            depth: ndc.z,
            visible: inside,
        }
    }

    /// Projects world columns `[3, N]` to `[3, M]` rows of screen x, screen y
    /// and normalised depth. With `clip`, columns outside the frustum are
    /// dropped, so `M <= N`.
    #[must_use]
    pub fn transform(&self, world: &DMatrix<f64>, clip: bool) -> DMatrix<f64> {
        let mut kept = Vec::with_capacity(world.ncols() * 3);
        for column in world.column_iter() {
            let projected = self.project_point(column_vector(column.as_slice()));
            if clip && !projected.visible {
                continue;
            }
            kept.extend_from_slice(&[projected.screen.x, projected.screen.y, projected.depth]);
        }
        DMatrix::from_column_slice(3, kept.len() / 3, &kept)
    }

    /// Whether a single world point survives frustum clipping.
    #[must_use]
    pub fn is_visible(&self, world: Vector3<f64>) -> bool {
        self.project_point(world).visible
    }
}

impl CoordinateSystem for CoordinateSystem3D {
    fn dimension(&self) -> Dimension {
        Dimension::Three
    }

    fn screen_size(&self) -> Vector2<f64> {
        self.screen_size
    }

    fn project(&self, world: &DMatrix<f64>) -> Vec<Option<Point2<f64>>> {
        world
            .column_iter()
            .map(|column| {
                let projected = self.project_point(column_vector(column.as_slice()));
                projected.visible.then_some(projected.screen)
            })
            .collect()
    }

    fn project_unclipped(&self, world: &DMatrix<f64>) -> Vec<Point2<f64>> {
        world
            .column_iter()
            .map(|column| self.project_point(column_vector(column.as_slice())).screen)
            .collect()
    }

    fn zero_point(&self) -> Point2<f64> {
        self.project_point(Vector3::zeros()).screen
    }

    fn screen_to_world(&self, screen: Point2<f64>, anchor: &DVector<f64>) -> Option<DVector<f64>> {
        if anchor.len() != 3 || self.screen_size.x <= 0.0 || self.screen_size.y <= 0.0 {
            return None;
        }
        let inverse = self.inverse_transformation.as_ref()?;
        let depth = self.project_point(column_vector(anchor.as_slice())).depth;
        if !depth.is_finite() {
            return None;
        }
        let ndc = Vector4::new(
            screen.x / self.screen_size.x * 2.0 - 1.0,
            1.0 - screen.y / self.screen_size.y * 2.0,
            depth,
            1.0,
        );
        let world = inverse * ndc;
        if world.w.abs() < W_EPSILON {
            return None;
        }
        let world = world.xyz() / world.w;
        Some(DVector::from_column_slice(world.as_slice()))
    }
}

fn column_vector(values: &[f64]) -> Vector3<f64> {
    let component = |index: usize| values.get(index).copied().unwrap_or(0.0);
    Vector3::new(component(0), component(1), component(2))
}
