//! Vaste lijst van functies en constanten die een expressie mag gebruiken.

use nalgebra::{DMatrix, DVector};

use super::{ExpressionError, Value, format_shape};
use crate::geom::{apply_transform, apply_transform_vector};

/// Kleine term die deling door nul in `norm` voorkomt.
const NORM_EPSILON: f64 = 1e-9;
/// Maximale lengte van een `linspace`-reeks.
const MAX_LINSPACE_POINTS: f64 = 1_000_000.0;

/// Namen van alle beschikbare functies.
pub const FUNCTIONS: &[&str] = &[
    "array", "columns", "mm", "matmul", "norm", "transpose", "linspace", "sin", "cos", "tan",
    "sqrt", "abs", "exp", "ln",
];

/// Namen van alle beschikbare constanten.
pub const CONSTANTS: &[&str] = &["pi", "e"];

pub(super) fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(std::f64::consts::PI),
        "e" => Some(std::f64::consts::E),
        _ => None,
    }
}

pub(super) fn call(name: &str, arguments: Vec<Value>) -> Result<Value, ExpressionError> {
    match name {
        "array" => array(arguments),
        "columns" => columns(arguments),
        "mm" => {
            let [matrix, points] = exact::<2>(name, arguments)?;
            transform(&matrix, &points)
        }
        "matmul" => {
            let [left, right] = exact::<2>(name, arguments)?;
            matmul(&left, &right)
        }
        "norm" => {
            let [value] = exact::<1>(name, arguments)?;
            let length = value.norm();
            Ok(value.map(|component| component / (length + NORM_EPSILON)))
        }
        "transpose" => {
            let [value] = exact::<1>(name, arguments)?;
            Ok(match value {
                Value::Matrix(matrix) => Value::Matrix(matrix.transpose()),
                other => other,
            })
        }
        "linspace" => {
            let [start, end, count] = exact::<3>(name, arguments)?;
            linspace(
                start.expect_number()?,
                end.expect_number()?,
                count.expect_number()?,
            )
        }
        "sin" => elementwise(name, arguments, f64::sin),
        "cos" => elementwise(name, arguments, f64::cos),
        "tan" => elementwise(name, arguments, f64::tan),
        "sqrt" => elementwise(name, arguments, f64::sqrt),
        "abs" => elementwise(name, arguments, f64::abs),
        "exp" => elementwise(name, arguments, f64::exp),
        "ln" => elementwise(name, arguments, f64::ln),
        other => Err(ExpressionError::UnknownFunction(other.to_owned())),
    }
}

fn exact<const N: usize>(name: &str, arguments: Vec<Value>) -> Result<[Value; N], ExpressionError> {
    let found = arguments.len();
    arguments.try_into().map_err(|_| ExpressionError::Arity {
        name: name.to_owned(),
        expected: match N {
            1 => "1",
            2 => "2",
            _ => "3",
        },
        found,
    })
}

fn elementwise(
    name: &str,
    arguments: Vec<Value>,
    op: fn(f64) -> f64,
) -> Result<Value, ExpressionError> {
    let [value] = exact::<1>(name, arguments)?;
    Ok(value.map(op))
}

/// `array(1, 2)` geeft een vector; `array(array(1, 2), array(3, 4))` een
/// matrix met de vectoren als rijen.
fn array(arguments: Vec<Value>) -> Result<Value, ExpressionError> {
    if arguments.len() == 1 && !matches!(arguments[0], Value::Number(_)) {
        return Ok(arguments.into_iter().next().unwrap_or(Value::Vector(DVector::zeros(0))));
    }

    if arguments.iter().all(|value| matches!(value, Value::Number(_))) {
        let values = arguments
            .iter()
            .map(Value::expect_number)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Value::Vector(DVector::from_vec(values)));
    }

    let rows = vectors(&arguments, "array")?;
    let width = rows[0].len();
    let mut matrix = DMatrix::zeros(rows.len(), width);
    for (index, row) in rows.iter().enumerate() {
        matrix.set_row(index, &row.transpose());
    }
    Ok(Value::Matrix(matrix))
}

/// `columns(v1, v2, ...)` zet vectoren naast elkaar als kolommen `[d, N]`.
fn columns(arguments: Vec<Value>) -> Result<Value, ExpressionError> {
    if arguments.is_empty() {
        return Err(ExpressionError::Arity {
            name: "columns".to_owned(),
            expected: "minstens 1",
            found: 0,
        });
    }
    let items = vectors(&arguments, "columns")?;
    Ok(Value::Matrix(DMatrix::from_columns(&items)))
}

fn vectors(arguments: &[Value], name: &str) -> Result<Vec<DVector<f64>>, ExpressionError> {
    let mut items = Vec::with_capacity(arguments.len());
    for argument in arguments {
        match argument {
            Value::Vector(vector) => items.push(vector.clone()),
            other => {
                return Err(ExpressionError::Type(format!(
                    "`{name}` verwacht vectoren maar kreeg `{}`",
                    other.kind()
                )));
            }
        }
    }
    let width = items.first().map_or(0, DVector::len);
    if items.iter().any(|item| item.len() != width) {
        return Err(ExpressionError::Type(format!(
            "`{name}` verwacht vectoren van gelijke lengte"
        )));
    }
    Ok(items)
}

/// Generieke transformatie met perspectiefdeling, zoals `Transformed` die
/// toepast.
fn transform(matrix: &Value, points: &Value) -> Result<Value, ExpressionError> {
    let Value::Matrix(matrix) = matrix else {
        return Err(ExpressionError::Type(format!(
            "`mm` verwacht een matrix als eerste argument maar kreeg `{}`",
            matrix.kind()
        )));
    };
    match points {
        Value::Vector(vector) => Ok(Value::Vector(apply_transform_vector(matrix, vector, true)?)),
        Value::Matrix(columns) => Ok(Value::Matrix(apply_transform(matrix, columns, true)?)),
        Value::Number(_) => Err(ExpressionError::Type(
            "`mm` verwacht punten als tweede argument maar kreeg `Number`".to_owned(),
        )),
    }
}

/// Matrixproduct met de numpy-regels voor 1D-operanden.
fn matmul(left: &Value, right: &Value) -> Result<Value, ExpressionError> {
    let mismatch = || ExpressionError::Broadcast {
        left: format_shape(&left.shape()),
        right: format_shape(&right.shape()),
    };
    match (left, right) {
        (Value::Matrix(a), Value::Matrix(b)) if a.ncols() == b.nrows() => {
            Ok(Value::Matrix(a * b))
        }
        (Value::Matrix(a), Value::Vector(b)) if a.ncols() == b.len() => Ok(Value::Vector(a * b)),
        (Value::Vector(a), Value::Matrix(b)) if a.len() == b.nrows() => {
            Ok(Value::Vector((a.transpose() * b).transpose()))
        }
        (Value::Vector(a), Value::Vector(b)) if a.len() == b.len() => Ok(Value::Number(a.dot(b))),
        (Value::Number(_), _) | (_, Value::Number(_)) => Err(ExpressionError::Type(
            "`matmul` accepteert geen scalars".to_owned(),
        )),
        _ => Err(mismatch()),
    }
}

fn linspace(start: f64, end: f64, count: f64) -> Result<Value, ExpressionError> {
    if count < 0.0 || count.fract() != 0.0 {
        return Err(ExpressionError::Type(format!(
            "`linspace` verwacht een niet-negatief geheel aantal maar kreeg {count}"
        )));
    }
    if count > MAX_LINSPACE_POINTS {
        return Err(ExpressionError::Arithmetic(format!(
            "`linspace` ondersteunt hoogstens {MAX_LINSPACE_POINTS} punten, kreeg {count}"
        )));
    }
    let count = count as usize;
    let values = match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count).map(|index| start + step * index as f64).collect()
        }
    };
    Ok(Value::Vector(DVector::from_vec(values)))
}
