//! Numerieke waarden waarmee expressies rekenen: scalars, 1D- en 2D-arrays.

use core::fmt;

use nalgebra::{DMatrix, DVector};

use super::ExpressionError;

/// Een waarde op de evaluatiestack.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Een enkele numerieke waarde.
    Number(f64),
    /// Een één-dimensionale array met vorm `[n]`.
    Vector(DVector<f64>),
    /// Een twee-dimensionale array met vorm `[rijen, kolommen]`.
    Matrix(DMatrix<f64>),
}

impl Value {
    /// Vorm van de waarde zoals numpy die zou rapporteren.
    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Self::Number(_) => Vec::new(),
            Self::Vector(vector) => vec![vector.len()],
            Self::Matrix(matrix) => vec![matrix.nrows(), matrix.ncols()],
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Number(_) => "Number",
            Self::Vector(_) => "Vector",
            Self::Matrix(_) => "Matrix",
        }
    }

    /// Verwacht een scalar.
    pub fn expect_number(&self) -> Result<f64, ExpressionError> {
        match self {
            Self::Number(value) => Ok(*value),
            other => Err(ExpressionError::Type(format!(
                "verwachtte een getal maar kreeg `{}`",
                other.kind()
            ))),
        }
    }

    /// Past `op` toe op ieder element.
    #[must_use]
    pub fn map(&self, op: impl Fn(f64) -> f64) -> Self {
        match self {
            Self::Number(value) => Self::Number(op(*value)),
            Self::Vector(vector) => Self::Vector(vector.map(op)),
            Self::Matrix(matrix) => Self::Matrix(matrix.map(op)),
        }
    }

    /// Som van de kwadraten van alle elementen, gevolgd door de wortel.
    #[must_use]
    pub fn norm(&self) -> f64 {
        match self {
            Self::Number(value) => value.abs(),
            Self::Vector(vector) => vector.norm(),
            Self::Matrix(matrix) => matrix.norm(),
        }
    }

    /// Combineert twee waarden element-gewijs met numpy-broadcasting.
    ///
    /// Een vector `[n]` gedraagt zich tegenover een matrix als kolom `[n, 1]`,
    /// net als de array van een vectorelement; dimensies van lengte 1 worden
    /// uitgerekt. Twee vectoren geven weer een vector.
    pub fn broadcast(
        &self,
        other: &Self,
        op: impl Fn(f64, f64) -> Result<f64, ExpressionError>,
    ) -> Result<Self, ExpressionError> {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => Ok(Self::Number(op(*a, *b)?)),
            (Self::Vector(a), Self::Number(b)) => {
                let values: Result<Vec<f64>, _> = a.iter().map(|a| op(*a, *b)).collect();
                Ok(Self::Vector(DVector::from_vec(values?)))
            }
            (Self::Number(a), Self::Vector(b)) => {
                let values: Result<Vec<f64>, _> = b.iter().map(|b| op(*a, *b)).collect();
                Ok(Self::Vector(DVector::from_vec(values?)))
            }
            (Self::Vector(a), Self::Vector(b)) => {
                let len = broadcast_dim(a.len(), b.len())
                    .ok_or_else(|| incompatible_shapes(self, other))?;
                let mut values = Vec::with_capacity(len);
                for index in 0..len {
                    values.push(op(a[index % a.len()], b[index % b.len()])?);
                }
                Ok(Self::Vector(DVector::from_vec(values)))
            }
            _ => {
                let (left_rows, left_columns) = grid_shape(self);
                let (right_rows, right_columns) = grid_shape(other);
                let rows = broadcast_dim(left_rows, right_rows)
                    .ok_or_else(|| incompatible_shapes(self, other))?;
                let columns = broadcast_dim(left_columns, right_columns)
                    .ok_or_else(|| incompatible_shapes(self, other))?;

                let mut result = DMatrix::zeros(rows, columns);
                for column in 0..columns {
                    for row in 0..rows {
                        let a = grid_at(self, row, column);
                        let b = grid_at(other, row, column);
                        result[(row, column)] = op(a, b)?;
                    }
                }
                Ok(Self::Matrix(result))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Vector(vector) => {
                let items: Vec<String> = vector.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Self::Matrix(matrix) => {
                let rows: Vec<String> = matrix
                    .row_iter()
                    .map(|row| {
                        let items: Vec<String> = row.iter().map(ToString::to_string).collect();
                        format!("[{}]", items.join(", "))
                    })
                    .collect();
                write!(f, "[{}]", rows.join(", "))
            }
        }
    }
}

/// Schrijft een vorm als `(2, 3)`, zoals de gebruiker die van numpy kent.
#[must_use]
pub fn format_shape(shape: &[usize]) -> String {
    match shape {
        [single] => format!("({single},)"),
        _ => {
            let items: Vec<String> = shape.iter().map(ToString::to_string).collect();
            format!("({})", items.join(", "))
        }
    }
}

fn broadcast_dim(a: usize, b: usize) -> Option<usize> {
    if a == b {
        Some(a)
    } else if a == 1 {
        Some(b)
    } else if b == 1 {
        Some(a)
    } else {
        None
    }
}

fn grid_shape(value: &Value) -> (usize, usize) {
    match value {
        Value::Number(_) => (1, 1),
        Value::Vector(vector) => (vector.len(), 1),
        Value::Matrix(matrix) => matrix.shape(),
    }
}

fn grid_at(value: &Value, row: usize, column: usize) -> f64 {
    match value {
        Value::Number(number) => *number,
        Value::Vector(vector) => vector[row % vector.len()],
        Value::Matrix(matrix) => {
            matrix[(row % matrix.nrows(), column % matrix.ncols())]
        }
    }
}

fn incompatible_shapes(a: &Value, b: &Value) -> ExpressionError {
    ExpressionError::Broadcast {
        left: format_shape(&a.shape()),
        right: format_shape(&b.shape()),
    }
}
