use nalgebra::{DMatrix, DVector};

/// Values closer than this to an integer are pulled onto it while dragging.
pub const DRAG_SNAP_DISTANCE: f64 = 0.07;

/// Snaps a single value onto the nearest integer when it is close enough.
///
/// Negative zero is normalised to zero so snapped values print as `0`.
#[must_use]
pub fn snap_scalar(value: f64) -> f64 {
    let rounded = value.round();
    let snapped = if (rounded - value).abs() < DRAG_SNAP_DISTANCE {
        rounded
    } else {
        value
    };
    if snapped == 0.0 { 0.0 } else { snapped }
}

/// Component-wise [`snap_scalar`] over a matrix.
#[must_use]
pub fn snap(values: &DMatrix<f64>) -> DMatrix<f64> {
    values.map(snap_scalar)
}

/// Component-wise [`snap_scalar`] over a vector.
#[must_use]
pub fn snap_vector(values: &DVector<f64>) -> DVector<f64> {
    values.map(snap_scalar)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulls_near_integers_onto_the_grid() {
        assert_eq!(snap_scalar(0.96), 1.0);
        assert_eq!(snap_scalar(2.05), 2.0);
        assert_eq!(snap_scalar(-3.93), -4.0);
    }

    #[test]
    fn keeps_values_outside_the_snap_distance() {
        assert_eq!(snap_scalar(0.9), 0.9);
        assert_eq!(snap_scalar(1.5), 1.5);
        assert_eq!(snap_scalar(-0.25), -0.25);
    }

    #[test]
    fn normalises_negative_zero() {
        let snapped = snap_scalar(-0.03);
        assert_eq!(snapped, 0.0);
        assert!(snapped.is_sign_positive());
        assert!(snap_scalar(-0.0).is_sign_positive());
    }

    #[test]
    fn snapping_is_idempotent() {
        let values = DMatrix::from_row_slice(
            2,
            4,
            &[0.96, 0.02, -0.069, 1.5, -2.931, 7.07, 0.5, -0.0],
        );
        let once = snap(&values);
        let twice = snap(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn snaps_vectors_component_wise() {
        let snapped = snap_vector(&DVector::from_vec(vec![0.96, 0.02]));
        assert_eq!(snapped, DVector::from_vec(vec![1.0, 0.0]));
    }
}
