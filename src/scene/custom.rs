//! Element waarvan de geometrie uit een vrije expressie komt.

use nalgebra::{DMatrix, Point2};
use serde::Serialize;

use super::transformed::draw_derived;
use super::{Element, ElementId, ElementState, RenderKind, RenderSink};
use crate::expr::{CompiledExpression, ExpressionError, ExpressionErrorKind, Namespace, Value};
use crate::geom::{AnyCoordinateSystem, Dimension};

/// Compilatietoestand van de definitie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DefinitionStatus {
    Uncompiled,
    Compiled,
    CompileError,
}

/// Een fout die voor het eerst (of na een wijziging) zichtbaar wordt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub element: ElementId,
    pub name: String,
    pub kind: ExpressionErrorKind,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct CustomTransformed {
    state: ElementState,
    definition: String,
    compiled: Option<CompiledExpression>,
    status: DefinitionStatus,
    error: Option<ExpressionError>,
    last_error: Option<String>,
    last_result: Option<Value>,
    current: Option<DMatrix<f64>>,
}

impl CustomTransformed {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: ElementState::new(name, RenderKind::Line),
            definition: String::new(),
            compiled: None,
            status: DefinitionStatus::Uncompiled,
            error: None,
            last_error: None,
            last_result: None,
            current: None,
        }
    }

    #[must_use]
    pub fn definition(&self) -> &str {
        &self.definition
    }

    #[must_use]
    pub fn status(&self) -> DefinitionStatus {
        self.status
    }

    /// Huidige fout, als de laatste compilatie of evaluatie faalde.
    #[must_use]
    pub fn error(&self) -> Option<&ExpressionError> {
        self.error.as_ref()
    }

    /// Laatste geslaagde evaluatie, ook als de huidige frame faalde.
    #[must_use]
    pub fn last_result(&self) -> Option<&Value> {
        self.last_result.as_ref()
    }

    /// Vervangt de definitie en zet de toestand terug naar `Uncompiled`.
    pub fn set_definition(&mut self, text: impl Into<String>) {
        self.definition = text.into();
        self.compiled = None;
        self.status = DefinitionStatus::Uncompiled;
        self.error = None;
        self.last_error = None;
        self.current = None;
    }

    pub fn compile_definition(&mut self) {
        match CompiledExpression::compile(&self.definition) {
            Ok(compiled) => {
                log::debug!("{}: definitie `{}` gecompileerd", self.state.name, compiled.source());
                self.compiled = Some(compiled);
                self.status = DefinitionStatus::Compiled;
                self.error = None;
            }
            Err(error) => {
                self.compiled = None;
                self.status = DefinitionStatus::CompileError;
                self.error = Some(error);
                // De fout wordt bij de volgende evaluatie één keer gemeld.
                self.last_error = None;
            }
        }
    }

    /// Evalueert de definitie voor deze frame.
    ///
    /// Geeft een [`Diagnostic`] terug wanneer een fout nieuw is ten opzichte van
    /// de vorige frame; een onveranderde fout wordt niet opnieuw gemeld.
    pub fn evaluate(&mut self, namespace: &Namespace, dimension: Dimension) -> Option<Diagnostic> {
        if self.status == DefinitionStatus::Uncompiled {
            if self.definition.trim().is_empty() {
                return None;
            }
            self.compile_definition();
        }

        let outcome = match (&self.compiled, &self.error) {
            (Some(compiled), _) => compiled.evaluate(namespace).and_then(|value| {
                let columns = crate::expr::classify_result(&value, dimension)?;
                Ok((value, columns))
            }),
            (None, Some(error)) => Err(error.clone()),
            (None, None) => return None,
        };

        match outcome {
            Ok((value, columns)) => {
                self.last_result = Some(value);
                self.current = columns;
                self.error = None;
                self.last_error = None;
                None
            }
            Err(error) => {
                self.current = None;
                let diagnostic = self.surface(&error);
                self.error = Some(error);
                diagnostic
            }
        }
    }

    fn surface(&mut self, error: &ExpressionError) -> Option<Diagnostic> {
        let message = error.to_string();
        if self.last_error.as_deref() == Some(message.as_str()) {
            return None;
        }
        log::warn!("{}: {message}", self.state.name);
        self.last_error = Some(message.clone());
        Some(Diagnostic {
            element: self.state.id,
            name: self.state.name.clone(),
            kind: error.kind(),
            message,
        })
    }
}

impl Element for CustomTransformed {
    fn state(&self) -> &ElementState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ElementState {
        &mut self.state
    }

    fn array(&self) -> Option<DMatrix<f64>> {
        self.current.clone()
    }

    fn value(&self) -> Option<Value> {
        self.current.as_ref()?;
        self.last_result.clone()
    }

    fn is_hovered(&self, _mouse: Point2<f64>, _coords: &AnyCoordinateSystem) -> bool {
        false
    }

    fn render(&self, sink: &mut dyn RenderSink, coords: &AnyCoordinateSystem) {
        if let Some(current) = &self.current {
            draw_derived(sink, coords, current, self.state.render_kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    fn namespace() -> Namespace {
        let mut namespace = Namespace::new();
        namespace.insert("v1", Value::Vector(DVector::from_vec(vec![1.0, 0.0])));
        namespace
    }

    fn custom(text: &str) -> CustomTransformed {
        let mut custom = CustomTransformed::new("t1");
        custom.set_definition(text);
        custom.compile_definition();
        custom
    }

    #[test]
    fn vector_sum_renders_one_column() {
        let mut custom = custom("v1 + v1");
        assert_eq!(custom.status(), DefinitionStatus::Compiled);
        assert!(custom.evaluate(&namespace(), Dimension::Two).is_none());
        assert_eq!(custom.array(), Some(DMatrix::from_column_slice(2, 1, &[2.0, 0.0])));
        assert!(custom.error().is_none());
    }

    #[test]
    fn unchanged_error_is_reported_once() {
        let mut custom = custom("1/0");
        assert_eq!(custom.status(), DefinitionStatus::Compiled);

        let first = custom.evaluate(&namespace(), Dimension::Two).unwrap();
        assert_eq!(first.kind, ExpressionErrorKind::Evaluation);
        assert_eq!(custom.error(), Some(&ExpressionError::DivisionByZero));

        assert!(custom.evaluate(&namespace(), Dimension::Two).is_none());
        assert_eq!(custom.error(), Some(&ExpressionError::DivisionByZero));
        assert!(custom.array().is_none());
    }

    #[test]
    fn compile_error_is_surfaced_once() {
        let mut custom = custom("v1 +");
        assert_eq!(custom.status(), DefinitionStatus::CompileError);
        let diagnostic = custom.evaluate(&namespace(), Dimension::Two).unwrap();
        assert_eq!(diagnostic.kind, ExpressionErrorKind::Compile);
        assert!(custom.evaluate(&namespace(), Dimension::Two).is_none());
    }

    #[test]
    fn invalid_shape_is_a_shape_error() {
        let mut custom = custom("array(1, 2, 3)");
        let diagnostic = custom.evaluate(&namespace(), Dimension::Two).unwrap();
        assert_eq!(diagnostic.kind, ExpressionErrorKind::Shape);
        assert_eq!(diagnostic.message, "Invalid result shape (3,)");
    }

    #[test]
    fn failed_frame_keeps_last_result_but_draws_nothing() {
        let mut custom = custom("v1 * 2");
        custom.evaluate(&namespace(), Dimension::Two);
        assert!(custom.value().is_some());

        let diagnostic = custom.evaluate(&Namespace::new(), Dimension::Two);
        assert!(diagnostic.is_some());
        assert!(custom.value().is_none());
        assert_eq!(
            custom.last_result(),
            Some(&Value::Vector(DVector::from_vec(vec![2.0, 0.0])))
        );
    }

    #[test]
    fn new_definition_resets_state() {
        let mut custom = custom("1/0");
        custom.evaluate(&namespace(), Dimension::Two);
        custom.set_definition("v1");
        assert_eq!(custom.status(), DefinitionStatus::Uncompiled);
        assert!(custom.error().is_none());
        assert!(custom.evaluate(&namespace(), Dimension::Two).is_none());
        assert_eq!(custom.status(), DefinitionStatus::Compiled);
    }

    #[test]
    fn empty_definition_stays_silent() {
        let mut custom = CustomTransformed::new("t1");
        assert!(custom.evaluate(&namespace(), Dimension::Two).is_none());
        assert_eq!(custom.status(), DefinitionStatus::Uncompiled);
    }
}
