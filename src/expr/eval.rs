//! RPN-interpreter over [`Value`]s.

use std::collections::HashMap;

use meval::tokenizer::{Operation, Token};

use super::functions;
use super::{ExpressionError, Value};

/// Benoemde waarden die een expressie mag lezen.
///
/// Namen in de namespace gaan voor op de ingebouwde constanten.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    values: HashMap<String, Value>,
}

impl Namespace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn resolve(&self, name: &str) -> Result<Value, ExpressionError> {
        if let Some(value) = self.values.get(name) {
            return Ok(value.clone());
        }
        functions::constant(name)
            .map(Value::Number)
            .ok_or_else(|| ExpressionError::UnknownName(name.to_owned()))
    }
}

pub(super) fn evaluate(rpn: &[Token], namespace: &Namespace) -> Result<Value, ExpressionError> {
    let mut stack: Vec<Value> = Vec::with_capacity(rpn.len());

    for token in rpn {
        match token {
            Token::Number(number) => stack.push(Value::Number(*number)),
            Token::Var(name) => stack.push(namespace.resolve(name)?),
            Token::Unary(operation) => {
                let operand = pop(&mut stack)?;
                stack.push(unary(operation, &operand)?);
            }
            Token::Binary(operation) => {
                let right = pop(&mut stack)?;
                let left = pop(&mut stack)?;
                stack.push(binary(operation, &left, &right)?);
            }
            Token::Func(name, arity) => {
                let count = arity.unwrap_or(0);
                if count > stack.len() {
                    return Err(missing_operand());
                }
                let arguments = stack.split_off(stack.len() - count);
                stack.push(functions::call(name, arguments)?);
            }
            other => {
                return Err(ExpressionError::Parse(format!(
                    "onverwacht token {other:?} in gecompileerde expressie"
                )));
            }
        }
    }

    let result = pop(&mut stack)?;
    if !stack.is_empty() {
        return Err(ExpressionError::Parse(
            "expressie laat meer dan één waarde achter".to_owned(),
        ));
    }
    Ok(result)
}

fn pop(stack: &mut Vec<Value>) -> Result<Value, ExpressionError> {
    stack.pop().ok_or_else(missing_operand)
}

fn missing_operand() -> ExpressionError {
    ExpressionError::Parse("te weinig operanden".to_owned())
}

fn unary(operation: &Operation, operand: &Value) -> Result<Value, ExpressionError> {
    match operation {
        Operation::Plus => Ok(operand.clone()),
        Operation::Minus => Ok(operand.map(|value| -value)),
        Operation::Fact => {
            // Eerst alle elementen controleren; `map` kan niet falen.
            let invalid = match operand {
                Value::Number(value) => !is_factorial_argument(*value),
                Value::Vector(vector) => !vector.iter().all(|value| is_factorial_argument(*value)),
                Value::Matrix(matrix) => !matrix.iter().all(|value| is_factorial_argument(*value)),
            };
            if invalid {
                return Err(ExpressionError::Arithmetic(
                    "faculteit is alleen gedefinieerd voor niet-negatieve gehele getallen"
                        .to_owned(),
                ));
            }
            Ok(operand.map(factorial))
        }
        other => Err(ExpressionError::Parse(format!(
            "`{other:?}` is geen unaire operator"
        ))),
    }
}

fn binary(operation: &Operation, left: &Value, right: &Value) -> Result<Value, ExpressionError> {
    match operation {
        Operation::Plus => left.broadcast(right, |a, b| Ok(a + b)),
        Operation::Minus => left.broadcast(right, |a, b| Ok(a - b)),
        Operation::Times => left.broadcast(right, |a, b| Ok(a * b)),
        Operation::Div => left.broadcast(right, |a, b| {
            if b == 0.0 {
                Err(ExpressionError::DivisionByZero)
            } else {
                Ok(a / b)
            }
        }),
        Operation::Rem => left.broadcast(right, |a, b| {
            if b == 0.0 {
                Err(ExpressionError::DivisionByZero)
            } else {
                // Teken volgt de deler.
                Ok(a - b * (a / b).floor())
            }
        }),
        Operation::Pow => left.broadcast(right, |a, b| Ok(a.powf(b))),
        other => Err(ExpressionError::Parse(format!(
            "`{other:?}` is geen binaire operator"
        ))),
    }
}

fn is_factorial_argument(value: f64) -> bool {
    value >= 0.0 && value.fract() == 0.0 && value <= 170.0
}

fn factorial(value: f64) -> f64 {
    (1..=value as u32).map(f64::from).product()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::CompiledExpression;
    use nalgebra::{DMatrix, DVector};

    fn eval(text: &str, namespace: &Namespace) -> Result<Value, ExpressionError> {
        CompiledExpression::compile(text).unwrap().evaluate(namespace)
    }

    fn scalar(text: &str) -> f64 {
        eval(text, &Namespace::new()).unwrap().expect_number().unwrap()
    }

    #[test]
    fn follows_operator_precedence() {
        assert_eq!(scalar("1 + 2 * 3"), 7.0);
        assert_eq!(scalar("(1 + 2) * 3"), 9.0);
        assert_eq!(scalar("2 ^ 3 ^ 2"), 512.0);
        assert_eq!(scalar("4!"), 24.0);
    }

    #[test]
    fn remainder_takes_sign_of_divisor() {
        let mut namespace = Namespace::new();
        namespace.insert("a", Value::Number(-7.0));
        assert_eq!(scalar("7 % 3"), 1.0);
        assert_eq!(eval("a % 3", &namespace).unwrap(), Value::Number(2.0));
        assert_eq!(
            eval("5 % 0", &Namespace::new()).unwrap_err(),
            ExpressionError::DivisionByZero
        );
    }

    #[test]
    fn constants_are_available() {
        assert!((scalar("pi") - std::f64::consts::PI).abs() < 1e-12);
        assert!((scalar("e") - std::f64::consts::E).abs() < 1e-12);
    }

    #[test]
    fn namespace_shadows_constants() {
        let mut namespace = Namespace::new();
        namespace.insert("e", Value::Number(2.0));
        assert_eq!(eval("e * 2", &namespace).unwrap(), Value::Number(4.0));
    }

    #[test]
    fn arrays_broadcast_with_scalars() {
        let mut namespace = Namespace::new();
        namespace.insert(
            "h1",
            Value::Matrix(DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0])),
        );
        namespace.insert("v1", Value::Vector(DVector::from_vec(vec![1.0, -1.0])));

        assert_eq!(
            eval("h1 * 2 - 1", &namespace).unwrap(),
            Value::Matrix(DMatrix::from_row_slice(2, 2, &[1.0, 3.0, 5.0, 7.0]))
        );
        assert_eq!(
            eval("-v1 / 2", &namespace).unwrap(),
            Value::Vector(DVector::from_vec(vec![-0.5, 0.5]))
        );
    }

    #[test]
    fn factorial_rejects_fractions() {
        let error = eval("2.5!", &Namespace::new()).unwrap_err();
        assert!(matches!(error, ExpressionError::Arithmetic(_)));
    }

    #[test]
    fn evaluation_has_no_side_effects_on_namespace() {
        let mut namespace = Namespace::new();
        namespace.insert("v1", Value::Vector(DVector::from_vec(vec![1.0, 0.0])));
        let before = namespace.get("v1").cloned();
        eval("v1 * 10", &namespace).unwrap();
        assert_eq!(namespace.get("v1").cloned(), before);
        assert_eq!(namespace.len(), 1);
    }
}
