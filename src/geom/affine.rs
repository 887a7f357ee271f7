use nalgebra::{Matrix3, Vector2};

/// Homogeneous 2D scale matrix.
#[must_use]
pub fn scale_matrix(scale: Vector2<f64>) -> Matrix3<f64> {
    Matrix3::new(
        scale.x, 0.0, 0.0, //
        0.0, scale.y, 0.0, //
        0.0, 0.0, 1.0,
    )
}

/// Homogeneous 2D translation matrix.
#[must_use]
pub fn translation_matrix(translation: Vector2<f64>) -> Matrix3<f64> {
    Matrix3::new(
        1.0, 0.0, translation.x, //
        0.0, 1.0, translation.y, //
        0.0, 0.0, 1.0,
    )
}

/// Builds `translate @ scale`: points are scaled first, then moved.
#[must_use]
pub fn create_affine_transformation(translation: Vector2<f64>, scale: Vector2<f64>) -> Matrix3<f64> {
    translation_matrix(translation) * scale_matrix(scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn scales_before_translating() {
        let mat = create_affine_transformation(Vector2::new(10.0, 20.0), Vector2::new(2.0, -3.0));
        let point = mat * Vector3::new(1.0, 1.0, 1.0);
        assert_eq!(point, Vector3::new(12.0, 17.0, 1.0));
    }

    #[test]
    fn identity_for_neutral_arguments() {
        let mat = create_affine_transformation(Vector2::zeros(), Vector2::new(1.0, 1.0));
        assert_eq!(mat, Matrix3::identity());
    }
}
