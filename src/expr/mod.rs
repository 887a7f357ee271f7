//! Ingebedde expressietaal voor afgeleide elementen.
//!
//! Een definitie wordt één keer gecompileerd naar een RPN-reeks (met de
//! tokenizer en shunting-yard parser van `meval`) en daarna iedere frame
//! geëvalueerd tegen een [`Namespace`] met de arrays van de huidige elementen.
//! Alleen de functies uit [`functions`] en de namen in de namespace zijn
//! bereikbaar; er is geen toegang tot andere toestand.

mod eval;
mod functions;
mod value;

use meval::shunting_yard::to_rpn;
use meval::tokenizer::{Token, tokenize};
use nalgebra::DMatrix;
use thiserror::Error;

use crate::geom::{Dimension, TransformError};

pub use eval::Namespace;
pub use functions::{CONSTANTS, FUNCTIONS};
pub use value::{Value, format_shape};

/// Grove indeling van expressiefouten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ExpressionErrorKind {
    /// De tekst is geen geldige expressie.
    Compile,
    /// De evaluatie zelf faalde.
    Evaluation,
    /// De evaluatie slaagde maar het resultaat heeft een onbruikbare vorm.
    Shape,
}

/// Fouttype voor het compileren en evalueren van expressies.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("expressie is leeg")]
    Empty,
    #[error("expressie kon niet geparst worden: {0}")]
    Parse(String),
    #[error("onbekende naam `{0}`")]
    UnknownName(String),
    #[error("onbekende functie `{0}`")]
    UnknownFunction(String),
    #[error("functie `{name}` verwacht {expected} argument(en) maar kreeg er {found}")]
    Arity {
        name: String,
        expected: &'static str,
        found: usize,
    },
    #[error("{0}")]
    Type(String),
    #[error("vormen {left} en {right} kunnen niet gecombineerd worden")]
    Broadcast { left: String, right: String },
    #[error("deling door nul")]
    DivisionByZero,
    #[error("rekenfout: {0}")]
    Arithmetic(String),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("Invalid result shape {0}")]
    InvalidResultShape(String),
}

impl ExpressionError {
    #[must_use]
    pub fn kind(&self) -> ExpressionErrorKind {
        match self {
            Self::Empty | Self::Parse(_) => ExpressionErrorKind::Compile,
            Self::InvalidResultShape(_) => ExpressionErrorKind::Shape,
            _ => ExpressionErrorKind::Evaluation,
        }
    }
}

/// Een gecompileerde definitie, klaar om herhaaldelijk geëvalueerd te worden.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    source: String,
    rpn: Vec<Token>,
}

impl CompiledExpression {
    /// Compileert één enkele expressie. Toewijzingen of meerdere statements
    /// worden door de tokenizer geweigerd.
    pub fn compile(text: &str) -> Result<Self, ExpressionError> {
        let normalized = normalize_expression(text);
        if normalized.is_empty() {
            return Err(ExpressionError::Empty);
        }

        let tokens =
            tokenize(&normalized).map_err(|error| ExpressionError::Parse(error.to_string()))?;
        let rpn = to_rpn(&tokens).map_err(|error| ExpressionError::Parse(error.to_string()))?;

        Ok(Self {
            source: normalized,
            rpn,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evalueert de expressie tegen `namespace`.
    pub fn evaluate(&self, namespace: &Namespace) -> Result<Value, ExpressionError> {
        eval::evaluate(&self.rpn, namespace)
    }

    /// Evalueert en zet het resultaat om naar kolommen `[d, N]`.
    ///
    /// `Ok(None)` betekent een leeg resultaat: er valt niets te tekenen.
    pub fn evaluate_columns(
        &self,
        namespace: &Namespace,
        dimension: Dimension,
    ) -> Result<Option<DMatrix<f64>>, ExpressionError> {
        let value = self.evaluate(namespace)?;
        classify_result(&value, dimension)
    }
}

/// Zet een evaluatieresultaat om naar kolommen van de gevraagde dimensie.
///
/// Een vector `[d]` wordt één kolom `[d, 1]`; een matrix `[d, N]` blijft
/// ongewijzigd. Lege arrays leveren `None`.
pub fn classify_result(
    value: &Value,
    dimension: Dimension,
) -> Result<Option<DMatrix<f64>>, ExpressionError> {
    let rows = dimension.size();
    match value {
        Value::Vector(vector) if vector.is_empty() => Ok(None),
        Value::Matrix(matrix) if matrix.is_empty() => Ok(None),
        Value::Vector(vector) if vector.len() == rows => Ok(Some(DMatrix::from_column_slice(
            rows,
            1,
            vector.as_slice(),
        ))),
        Value::Matrix(matrix) if matrix.nrows() == rows => Ok(Some(matrix.clone())),
        other => Err(ExpressionError::InvalidResultShape(format_shape(
            &other.shape(),
        ))),
    }
}

fn normalize_expression(text: &str) -> String {
    text.trim().trim_end_matches(';').trim().to_owned()
}
