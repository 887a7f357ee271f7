use nalgebra::{DMatrix, DVector};
use thiserror::Error;

/// Raised when a matrix cannot act on the given columns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("cannot apply a {matrix_rows}x{matrix_columns} matrix to {input_rows} rows")]
    ShapeMismatch {
        matrix_rows: usize,
        matrix_columns: usize,
        input_rows: usize,
    },
}

/// Applies `matrix` to the columns of `points`.
///
/// A square matrix one dimension larger than the points is treated as a
/// homogeneous map: the columns are padded with a row of ones, multiplied and
/// un-padded again. With `perspective` the leading rows are divided by the
/// homogeneous row instead of dropping it. A matrix whose column count equals
/// the row count of `points` is applied as a plain linear map.
pub fn apply_transform(
    matrix: &DMatrix<f64>,
    points: &DMatrix<f64>,
    perspective: bool,
) -> Result<DMatrix<f64>, TransformError> {
    let rows = points.nrows();
    if matrix.is_square() && matrix.nrows() == rows + 1 {
        let padded = points.clone().insert_row(rows, 1.0);
        let result = matrix * padded;
        let leading = result.rows(0, rows).into_owned();
        if !perspective {
            return Ok(leading);
        }
        let mut divided = leading;
        for (column, mut values) in divided.column_iter_mut().enumerate() {
            let w = result[(rows, column)];
            values /= w;
        }
        return Ok(divided);
    }

    if matrix.ncols() == rows {
        return Ok(matrix * points);
    }

    Err(TransformError::ShapeMismatch {
        matrix_rows: matrix.nrows(),
        matrix_columns: matrix.ncols(),
        input_rows: rows,
    })
}

/// Single-point form of [`apply_transform`]: the vector is treated as one
/// column and the result is squeezed back to a vector.
pub fn apply_transform_vector(
    matrix: &DMatrix<f64>,
    point: &DVector<f64>,
    perspective: bool,
) -> Result<DVector<f64>, TransformError> {
    let column = DMatrix::from_column_slice(point.len(), 1, point.as_slice());
    let result = apply_transform(matrix, &column, perspective)?;
    Ok(result.column(0).into_owned())
}
