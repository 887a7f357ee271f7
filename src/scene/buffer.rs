//! Eigenaar van alle elementen in een scène en de dispatcher van commando's.

use nalgebra::{DVector, Point2, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    CustomTransformed, Diagnostic, Element, ElementId, ElementKind, EventContext, InputEvent,
    PointCloud, RenderKind, RenderSink, Transform, Transformed, VALUE_DRAG_SENSITIVITY, Vector,
    create_cube, generate_house, generate_unit_circle, lift_to_3d,
};
use crate::expr::Namespace;
use crate::geom::{AnyCoordinateSystem, Dimension};

const DEFAULT_POLYGON_POINTS: usize = 40;
/// Bovengrens op het aantal hoekpunten van een veelhoek.
const MAX_POLYGON_POINTS: usize = 10_000;

/// De drie geordende collecties van de buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collection {
    Elements,
    Transforms,
    Transformed,
}

/// Fouttype voor het toepassen van commando's op de buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("element {0} bestaat niet")]
    UnknownElement(ElementId),
    #[error("element {id} is een {found}, verwacht {expected}")]
    WrongKind {
        id: ElementId,
        expected: &'static str,
        found: &'static str,
    },
    #[error("{what} wordt niet ondersteund in {dimension}")]
    UnsupportedDimension {
        what: &'static str,
        dimension: Dimension,
    },
    #[error("cel ({row}, {column}) valt buiten de matrix")]
    CellOutOfRange { row: usize, column: usize },
    #[error("component {0} valt buiten de vector")]
    ComponentOutOfRange(usize),
    #[error("verwacht {expected} coördinaten maar kreeg er {found}")]
    InvalidCoordinates { expected: usize, found: usize },
    #[error("een veelhoek heeft 1 tot {max} punten, kreeg {found}")]
    InvalidPointCount { found: usize, max: usize },
}

/// Expliciete opdrachten van de gebruikersinterface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    AddVector {
        #[serde(default)]
        coordinates: Option<Vec<f64>>,
    },
    AddPolygon {
        #[serde(default = "default_polygon_points")]
        points: usize,
    },
    AddHouse,
    AddCube,
    AddLinearTransform,
    AddAffineTransform,
    AddTransformed,
    AddCustomTransformed {
        #[serde(default)]
        definition: String,
    },
    PickElementForTransformed {
        target: ElementId,
        candidate: ElementId,
    },
    PickTransformForTransformed {
        target: ElementId,
        candidate: ElementId,
    },
    SetDefinition {
        target: ElementId,
        text: String,
    },
    /// Label-slepen over een matrixcel: de waarde daalt met `delta_pixels * 0.01`.
    EditMatrixCell {
        target: ElementId,
        row: usize,
        column: usize,
        delta_pixels: f64,
    },
    EditVectorComponent {
        target: ElementId,
        component: usize,
        delta_pixels: f64,
    },
    ToggleVisibility {
        target: ElementId,
    },
    CycleRenderKind {
        target: ElementId,
    },
    Remove {
        target: ElementId,
    },
}

fn default_polygon_points() -> usize {
    DEFAULT_POLYGON_POINTS
}

/// Serialiseerbare samenvatting van één element voor de externe UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementSummary {
    pub id: ElementId,
    pub name: String,
    pub collection: Collection,
    pub kind: &'static str,
    /// Rijen van de huidige array.
    pub values: Vec<Vec<f64>>,
    pub visible: bool,
    pub render_kind: RenderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub label: String,
}

/// Drie collecties met elementen, in vaste volgorde getekend en bijgewerkt.
#[derive(Debug, Clone)]
pub struct ElementBuffer {
    dimension: Dimension,
    elements: Vec<ElementKind>,
    transforms: Vec<ElementKind>,
    transformed: Vec<ElementKind>,
    next_id: usize,
}

impl ElementBuffer {
    #[must_use]
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            elements: Vec::new(),
            transforms: Vec::new(),
            transformed: Vec::new(),
            next_id: 1,
        }
    }

    #[must_use]
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    #[must_use]
    pub fn elements(&self) -> &[ElementKind] {
        &self.elements
    }

    #[must_use]
    pub fn transforms(&self) -> &[ElementKind] {
        &self.transforms
    }

    #[must_use]
    pub fn transformed(&self) -> &[ElementKind] {
        &self.transformed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len() + self.transforms.len() + self.transformed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Alle elementen in dispatch- en tekenvolgorde.
    pub fn iter(&self) -> impl Iterator<Item = &ElementKind> {
        self.elements
            .iter()
            .chain(&self.transforms)
            .chain(&self.transformed)
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut ElementKind> {
        self.elements
            .iter_mut()
            .chain(&mut self.transforms)
            .chain(&mut self.transformed)
    }

    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&ElementKind> {
        self.iter().find(|element| element.id() == id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut ElementKind> {
        self.iter_mut().find(|element| element.id() == id)
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&ElementKind> {
        self.iter().find(|element| element.element_name() == name)
    }

    fn collection(&self, collection: Collection) -> &[ElementKind] {
        match collection {
            Collection::Elements => &self.elements,
            Collection::Transforms => &self.transforms,
            Collection::Transformed => &self.transformed,
        }
    }

    /// Voegt een element toe aan zijn collectie en kent een nieuw id toe.
    pub fn add(&mut self, element: impl Into<ElementKind>) -> ElementId {
        let mut element = element.into();
        let id = ElementId::new(self.next_id);
        self.next_id += 1;
        element.state_mut().id = id;
        log::debug!("{} {} toegevoegd als {id}", element.name(), element.element_name());

        match element.collection() {
            Collection::Elements => self.elements.push(element),
            Collection::Transforms => self.transforms.push(element),
            Collection::Transformed => self.transformed.push(element),
        }
        id
    }

    /// Naam `prefix{n}` met `n` = aantal in de collectie + 1, opgehoogd tot
    /// de naam nog niet bestaat.
    #[must_use]
    pub fn next_name(&self, prefix: &str, collection: Collection) -> String {
        let mut counter = self.collection(collection).len() + 1;
        loop {
            let name = format!("{prefix}{counter}");
            if self.find_by_name(&name).is_none() {
                return name;
            }
            counter += 1;
        }
    }

    /// Verwijdert alle elementen met `has_to_be_removed` en geeft het aantal
    /// verwijderde elementen terug.
    pub fn remove_elements(&mut self) -> usize {
        let removed: Vec<ElementId> = self
            .iter()
            .filter(|element| element.state().has_to_be_removed)
            .map(ElementKind::id)
            .collect();
        if removed.is_empty() {
            return 0;
        }

        for collection in [&mut self.elements, &mut self.transforms, &mut self.transformed] {
            collection.retain(|element| !element.state().has_to_be_removed);
        }
        for element in &mut self.transformed {
            if let ElementKind::Transformed(transformed) = element {
                for id in &removed {
                    transformed.forget(*id);
                }
            }
        }
        log::debug!("{} element(en) verwijderd", removed.len());
        removed.len()
    }

    /// Geeft het event aan ieder element; elk element doet zijn eigen hit-test.
    pub fn handle_event(&mut self, event: &InputEvent, context: &mut EventContext<'_>) {
        for element in self.iter_mut() {
            element.handle_event(event, context);
        }
    }

    /// Of een zichtbaar element onder de cursor ligt.
    #[must_use]
    pub fn any_hovered(&self, mouse: Point2<f64>, coords: &AnyCoordinateSystem) -> bool {
        self.iter()
            .any(|element| element.state().visible && element.is_hovered(mouse, coords))
    }

    /// Herberekent alle afgeleide elementen voor deze frame.
    ///
    /// Eerst de `Transformed`-resultaten, daarna de expressies in volgorde;
    /// iedere geslaagde expressie is zichtbaar voor de expressies na haar.
    pub fn refresh(&mut self) -> Vec<Diagnostic> {
        let elements = &self.elements;
        let transforms = &self.transforms;
        for element in &mut self.transformed {
            if let ElementKind::Transformed(transformed) = element {
                let matrix = transformed
                    .transform()
                    .and_then(|id| find(transforms, id))
                    .and_then(|element| element.array());
                let source = transformed
                    .element()
                    .and_then(|id| find(elements, id))
                    .and_then(|element| element.value());
                transformed.recompute(matrix.as_ref(), source.as_ref());
            }
        }

        let mut namespace = self.collect_namespace(false);
        let dimension = self.dimension;
        let mut diagnostics = Vec::new();
        for element in &mut self.transformed {
            if let ElementKind::Custom(custom) = element {
                diagnostics.extend(custom.evaluate(&namespace, dimension));
                if let Some(value) = custom.value() {
                    namespace.insert(custom.state().name.clone(), value);
                }
            }
        }
        diagnostics
    }

    /// Namespace met de huidige waarde van ieder element, op naam.
    #[must_use]
    pub fn namespace(&self) -> Namespace {
        self.collect_namespace(true)
    }

    fn collect_namespace(&self, include_custom: bool) -> Namespace {
        let mut namespace = Namespace::new();
        for element in self.iter() {
            if !include_custom && matches!(element, ElementKind::Custom(_)) {
                continue;
            }
            if let Some(value) = element.value() {
                namespace.insert(element.element_name(), value);
            }
        }
        namespace
    }

    /// Tekent elementen, matrices en afgeleide elementen in die volgorde.
    pub fn render(&self, sink: &mut dyn RenderSink, coords: &AnyCoordinateSystem) {
        for element in self.iter().filter(|element| element.state().visible) {
            element.render(sink, coords);
        }
    }

    /// Past een commando toe. Toevoegcommando's geven het nieuwe id terug.
    pub fn apply(&mut self, command: Command) -> Result<Option<ElementId>, SceneError> {
        match command {
            Command::AddVector { coordinates } => self.add_vector(coordinates).map(Some),
            Command::AddPolygon { points } => {
                if !(1..=MAX_POLYGON_POINTS).contains(&points) {
                    return Err(SceneError::InvalidPointCount {
                        found: points,
                        max: MAX_POLYGON_POINTS,
                    });
                }
                let mut circle = generate_unit_circle(points, true);
                if self.dimension == Dimension::Three {
                    circle = lift_to_3d(&circle);
                }
                let name = self.next_name("u", Collection::Elements);
                Ok(Some(self.add(PointCloud::new(name, circle, RenderKind::Point))))
            }
            Command::AddHouse => {
                self.require(Dimension::Two, "huis")?;
                let name = self.next_name("h", Collection::Elements);
                Ok(Some(self.add(PointCloud::new(name, generate_house(), RenderKind::Point))))
            }
            Command::AddCube => {
                self.require(Dimension::Three, "kubus")?;
                let (corners, edges) =
                    create_cube(Vector3::from_element(-0.5), Vector3::from_element(0.5));
                let name = self.next_name("c", Collection::Elements);
                Ok(Some(self.add(PointCloud::with_edges(name, corners, edges, RenderKind::Line))))
            }
            Command::AddLinearTransform => {
                let name = self.next_name("T", Collection::Transforms);
                Ok(Some(self.add(Transform::linear(name, self.dimension))))
            }
            Command::AddAffineTransform => {
                let name = self.next_name("T", Collection::Transforms);
                Ok(Some(self.add(Transform::affine(name, self.dimension))))
            }
            Command::AddTransformed => {
                let name = self.next_name("t", Collection::Transformed);
                Ok(Some(self.add(Transformed::new(name))))
            }
            Command::AddCustomTransformed { definition } => {
                let name = self.next_name("t", Collection::Transformed);
                let mut custom = CustomTransformed::new(name);
                if !definition.trim().is_empty() {
                    custom.set_definition(definition);
                    custom.compile_definition();
                }
                Ok(Some(self.add(custom)))
            }
            Command::PickElementForTransformed { target, candidate } => {
                self.expect_collection(candidate, Collection::Elements, "Vector of PointCloud")?;
                self.transformed_mut(target)?.set_element(Some(candidate));
                Ok(None)
            }
            Command::PickTransformForTransformed { target, candidate } => {
                self.expect_collection(candidate, Collection::Transforms, "Transform")?;
                self.transformed_mut(target)?.set_transform(Some(candidate));
                Ok(None)
            }
            Command::SetDefinition { target, text } => {
                let custom = match self.lookup_mut(target)? {
                    ElementKind::Custom(custom) => custom,
                    other => return Err(wrong_kind(target, "CustomTransformed", other)),
                };
                custom.set_definition(text);
                custom.compile_definition();
                Ok(None)
            }
            Command::EditMatrixCell {
                target,
                row,
                column,
                delta_pixels,
            } => {
                let transform = match self.lookup_mut(target)? {
                    ElementKind::Transform(transform) => transform,
                    other => return Err(wrong_kind(target, "Transform", other)),
                };
                if !transform.add_to_cell(row, column, -delta_pixels * VALUE_DRAG_SENSITIVITY) {
                    return Err(SceneError::CellOutOfRange { row, column });
                }
                Ok(None)
            }
            Command::EditVectorComponent {
                target,
                component,
                delta_pixels,
            } => {
                let vector = match self.lookup_mut(target)? {
                    ElementKind::Vector(vector) => vector,
                    other => return Err(wrong_kind(target, "Vector", other)),
                };
                let current = vector
                    .coordinates()
                    .get(component)
                    .copied()
                    .ok_or(SceneError::ComponentOutOfRange(component))?;
                vector.set_component(component, current - delta_pixels * VALUE_DRAG_SENSITIVITY);
                Ok(None)
            }
            Command::ToggleVisibility { target } => {
                let state = self.lookup_mut(target)?.state_mut();
                state.visible = !state.visible;
                Ok(None)
            }
            Command::CycleRenderKind { target } => {
                let state = self.lookup_mut(target)?.state_mut();
                state.render_kind = state.render_kind.next();
                Ok(None)
            }
            Command::Remove { target } => {
                self.lookup_mut(target)?.state_mut().has_to_be_removed = true;
                Ok(None)
            }
        }
    }

    fn add_vector(&mut self, coordinates: Option<Vec<f64>>) -> Result<ElementId, SceneError> {
        let expected = self.dimension.size();
        let (coordinates, render_kind) = match (coordinates, self.dimension) {
            (Some(values), _) if values.len() != expected => {
                return Err(SceneError::InvalidCoordinates {
                    expected,
                    found: values.len(),
                });
            }
            (Some(values), Dimension::Two) => (values, RenderKind::Line),
            (Some(values), Dimension::Three) => (values, RenderKind::Point),
            (None, Dimension::Two) => (vec![1.0, 0.0], RenderKind::Line),
            (None, Dimension::Three) => (vec![1.0, 1.0, 1.0], RenderKind::Point),
        };
        let name = self.next_name("v", Collection::Elements);
        Ok(self.add(Vector::new(name, DVector::from_vec(coordinates), render_kind)))
    }

    fn require(&self, dimension: Dimension, what: &'static str) -> Result<(), SceneError> {
        if self.dimension == dimension {
            Ok(())
        } else {
            Err(SceneError::UnsupportedDimension {
                what,
                dimension: self.dimension,
            })
        }
    }

    fn lookup_mut(&mut self, id: ElementId) -> Result<&mut ElementKind, SceneError> {
        self.get_mut(id).ok_or(SceneError::UnknownElement(id))
    }

    fn expect_collection(
        &self,
        id: ElementId,
        collection: Collection,
        expected: &'static str,
    ) -> Result<(), SceneError> {
        let element = self.get(id).ok_or(SceneError::UnknownElement(id))?;
        if element.collection() == collection {
            Ok(())
        } else {
            Err(wrong_kind(id, expected, element))
        }
    }

    fn transformed_mut(&mut self, id: ElementId) -> Result<&mut Transformed, SceneError> {
        match self.lookup_mut(id)? {
            ElementKind::Transformed(transformed) => Ok(transformed),
            other => Err(wrong_kind(id, "Transformed", other)),
        }
    }

    /// Samenvattingen van alle elementen in dispatch-volgorde.
    #[must_use]
    pub fn summaries(&self) -> Vec<ElementSummary> {
        self.iter().map(|element| self.summarize(element)).collect()
    }

    fn summarize(&self, element: &ElementKind) -> ElementSummary {
        let state = element.state();
        let values = element
            .array()
            .map(|array| {
                array
                    .row_iter()
                    .map(|row| row.iter().copied().collect())
                    .collect()
            })
            .unwrap_or_default();

        let (definition, error) = match element {
            ElementKind::Custom(custom) => (
                Some(custom.definition().to_owned()),
                custom.error().map(ToString::to_string),
            ),
            _ => (None, None),
        };

        let label = match element {
            ElementKind::Transformed(transformed) => format!(
                "{} = {} @ {}",
                state.name,
                self.name_or_placeholder(transformed.transform()),
                self.name_or_placeholder(transformed.element()),
            ),
            ElementKind::Custom(custom) => format!("{} = {}", state.name, custom.definition()),
            _ => state.name.clone(),
        };

        ElementSummary {
            id: state.id,
            name: state.name.clone(),
            collection: element.collection(),
            kind: element.name(),
            values,
            visible: state.visible,
            render_kind: state.render_kind,
            definition,
            error,
            label,
        }
    }

    fn name_or_placeholder(&self, id: Option<ElementId>) -> String {
        id.and_then(|id| self.get(id))
            .map_or_else(|| "?".to_owned(), |element| element.element_name().to_owned())
    }
}

fn find(collection: &[ElementKind], id: ElementId) -> Option<&ElementKind> {
    collection.iter().find(|element| element.id() == id)
}

fn wrong_kind(id: ElementId, expected: &'static str, found: &ElementKind) -> SceneError {
    SceneError::WrongKind {
        id,
        expected,
        found: found.name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Value;
    use crate::geom::CoordinateSystem2D;
    use crate::scene::{DrawList, GREEN, RED};
    use nalgebra::{DMatrix, Vector2};

    fn coords() -> AnyCoordinateSystem {
        AnyCoordinateSystem::Planar(CoordinateSystem2D::new(Vector2::new(1280.0, 720.0), 100.0, 1.2))
    }

    fn added(buffer: &mut ElementBuffer, command: Command) -> ElementId {
        buffer.apply(command).unwrap().unwrap()
    }

    #[test]
    fn names_follow_collection_counts() {
        let mut buffer = ElementBuffer::new(Dimension::Two);
        let v1 = added(&mut buffer, Command::AddVector { coordinates: None });
        added(&mut buffer, Command::AddPolygon { points: 40 });
        added(&mut buffer, Command::AddLinearTransform);
        added(&mut buffer, Command::AddTransformed);
        added(&mut buffer, Command::AddCustomTransformed {
            definition: String::new(),
        });

        let names: Vec<&str> = buffer.iter().map(ElementKind::element_name).collect();
        assert_eq!(names, ["v1", "u2", "T1", "t1", "t2"]);
        assert_eq!(buffer.get(v1).unwrap().element_name(), "v1");
    }

    #[test]
    fn names_skip_existing_after_removal() {
        let mut buffer = ElementBuffer::new(Dimension::Two);
        let first = added(&mut buffer, Command::AddVector { coordinates: None });
        added(&mut buffer, Command::AddVector { coordinates: None });
        buffer.apply(Command::Remove { target: first }).unwrap();
        assert_eq!(buffer.remove_elements(), 1);

        let id = added(&mut buffer, Command::AddVector { coordinates: None });
        assert_eq!(buffer.get(id).unwrap().element_name(), "v3");
    }

    #[test]
    fn removal_compacts_once_and_skips_render() {
        let mut buffer = ElementBuffer::new(Dimension::Two);
        let v1 = added(&mut buffer, Command::AddVector { coordinates: None });
        added(&mut buffer, Command::AddVector {
            coordinates: Some(vec![0.0, 1.0]),
        });
        buffer.get_mut(v1).unwrap().state_mut().has_to_be_removed = true;

        assert_eq!(buffer.remove_elements(), 1);
        assert_eq!(buffer.elements().len(), 1);
        assert_eq!(buffer.remove_elements(), 0);

        let mut list = DrawList::new(Vector2::new(1280.0, 720.0));
        buffer.render(&mut list, &coords());
        assert_eq!(list.count_with_color(GREEN), 1);
    }

    #[test]
    fn transformed_applies_picked_operands() {
        let mut buffer = ElementBuffer::new(Dimension::Two);
        let v1 = added(&mut buffer, Command::AddVector { coordinates: None });
        let t_matrix = added(&mut buffer, Command::AddLinearTransform);
        let t1 = added(&mut buffer, Command::AddTransformed);
        buffer
            .apply(Command::EditMatrixCell {
                target: t_matrix,
                row: 1,
                column: 0,
                delta_pixels: -100.0,
            })
            .unwrap();
        buffer
            .apply(Command::PickElementForTransformed {
                target: t1,
                candidate: v1,
            })
            .unwrap();
        buffer
            .apply(Command::PickTransformForTransformed {
                target: t1,
                candidate: t_matrix,
            })
            .unwrap();

        assert!(buffer.refresh().is_empty());
        assert_eq!(
            buffer.get(t1).unwrap().value(),
            Some(Value::Vector(DVector::from_vec(vec![1.0, 1.0])))
        );
        let summary = buffer
            .summaries()
            .into_iter()
            .find(|summary| summary.id == t1)
            .unwrap();
        assert_eq!(summary.label, "t1 = T1 @ v1");
    }

    #[test]
    fn picking_checks_collections() {
        let mut buffer = ElementBuffer::new(Dimension::Two);
        let v1 = added(&mut buffer, Command::AddVector { coordinates: None });
        let t1 = added(&mut buffer, Command::AddTransformed);
        let error = buffer
            .apply(Command::PickTransformForTransformed {
                target: t1,
                candidate: v1,
            })
            .unwrap_err();
        assert!(matches!(error, SceneError::WrongKind { .. }));

        let error = buffer
            .apply(Command::PickElementForTransformed {
                target: v1,
                candidate: v1,
            })
            .unwrap_err();
        assert!(matches!(error, SceneError::WrongKind { expected: "Transformed", .. }));

        let error = buffer.apply(Command::Remove { target: ElementId(99) }).unwrap_err();
        assert_eq!(error, SceneError::UnknownElement(ElementId(99)));
    }

    #[test]
    fn removed_operands_are_forgotten() {
        let mut buffer = ElementBuffer::new(Dimension::Two);
        let v1 = added(&mut buffer, Command::AddVector { coordinates: None });
        let t_matrix = added(&mut buffer, Command::AddLinearTransform);
        let t1 = added(&mut buffer, Command::AddTransformed);
        buffer
            .apply(Command::PickElementForTransformed {
                target: t1,
                candidate: v1,
            })
            .unwrap();
        buffer
            .apply(Command::PickTransformForTransformed {
                target: t1,
                candidate: t_matrix,
            })
            .unwrap();
        buffer.apply(Command::Remove { target: v1 }).unwrap();
        buffer.remove_elements();
        buffer.refresh();

        let ElementKind::Transformed(transformed) = buffer.get(t1).unwrap() else {
            panic!("t1 is geen Transformed");
        };
        assert_eq!(transformed.element(), None);
        assert!(transformed.result().is_none());
    }

    #[test]
    fn custom_expressions_see_earlier_customs() {
        let mut buffer = ElementBuffer::new(Dimension::Two);
        added(&mut buffer, Command::AddVector { coordinates: None });
        added(&mut buffer, Command::AddCustomTransformed {
            definition: "v1 + v1".to_owned(),
        });
        let t2 = added(&mut buffer, Command::AddCustomTransformed {
            definition: "t1 * 2".to_owned(),
        });

        assert!(buffer.refresh().is_empty());
        assert_eq!(
            buffer.get(t2).unwrap().array(),
            Some(DMatrix::from_column_slice(2, 1, &[4.0, 0.0]))
        );

        let mut list = DrawList::new(Vector2::new(1280.0, 720.0));
        buffer.render(&mut list, &coords());
        assert_eq!(list.count_with_color(RED), 2);
    }

    #[test]
    fn vectors_offset_every_column() {
        let mut buffer = ElementBuffer::new(Dimension::Two);
        added(&mut buffer, Command::AddVector {
            coordinates: Some(vec![1.0, 2.0]),
        });
        let house = added(&mut buffer, Command::AddHouse);
        added(&mut buffer, Command::AddLinearTransform);
        let shifted = added(&mut buffer, Command::AddCustomTransformed {
            definition: "h2 + v1".to_owned(),
        });
        let offset_matrix = added(&mut buffer, Command::AddCustomTransformed {
            definition: "T1 + v1".to_owned(),
        });

        assert!(buffer.refresh().is_empty());

        let Some(Value::Matrix(mut expected)) = buffer.get(house).unwrap().value() else {
            panic!("huisje heeft een matrix als waarde");
        };
        for mut column in expected.column_iter_mut() {
            column[0] += 1.0;
            column[1] += 2.0;
        }
        assert_eq!(buffer.get(shifted).unwrap().array(), Some(expected));
        assert_eq!(
            buffer.get(offset_matrix).unwrap().array(),
            Some(DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 2.0, 3.0]))
        );
    }

    #[test]
    fn customs_only_see_customs_evaluated_before_them() {
        let mut buffer = ElementBuffer::new(Dimension::Two);
        added(&mut buffer, Command::AddVector { coordinates: None });
        let early = added(&mut buffer, Command::AddCustomTransformed {
            definition: "t2 * 2".to_owned(),
        });
        added(&mut buffer, Command::AddCustomTransformed {
            definition: "v1 * 3".to_owned(),
        });

        for _ in 0..2 {
            buffer.refresh();
            assert_eq!(buffer.get(early).unwrap().array(), None);
        }
        let summary = &buffer.summaries()[1];
        assert_eq!(summary.id, early);
        assert_eq!(summary.error.as_deref(), Some("onbekende naam `t2`"));
    }

    #[test]
    fn polygon_size_is_bounded() {
        let mut buffer = ElementBuffer::new(Dimension::Two);
        for points in [0, MAX_POLYGON_POINTS + 1, usize::MAX] {
            assert_eq!(
                buffer.apply(Command::AddPolygon { points }),
                Err(SceneError::InvalidPointCount {
                    found: points,
                    max: MAX_POLYGON_POINTS,
                })
            );
        }
        assert!(buffer.is_empty());
        let polygon = added(&mut buffer, Command::AddPolygon { points: 3 });
        assert_eq!(buffer.get(polygon).unwrap().array().map(|array| array.ncols()), Some(4));
    }

    #[test]
    fn broken_definition_reports_once() {
        let mut buffer = ElementBuffer::new(Dimension::Two);
        let t1 = added(&mut buffer, Command::AddCustomTransformed {
            definition: "1/0".to_owned(),
        });
        let diagnostics = buffer.refresh();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].element, t1);
        assert!(buffer.refresh().is_empty());

        buffer
            .apply(Command::SetDefinition {
                target: t1,
                text: "array(1, 2)".to_owned(),
            })
            .unwrap();
        assert!(buffer.refresh().is_empty());
        let summary = &buffer.summaries()[0];
        assert_eq!(summary.values, vec![vec![1.0], vec![2.0]]);
        assert!(summary.error.is_none());
    }

    #[test]
    fn dimension_specific_commands() {
        let mut planar = ElementBuffer::new(Dimension::Two);
        assert!(matches!(
            planar.apply(Command::AddCube),
            Err(SceneError::UnsupportedDimension { .. })
        ));
        assert!(planar.apply(Command::AddHouse).is_ok());

        let mut spatial = ElementBuffer::new(Dimension::Three);
        let cube = added(&mut spatial, Command::AddCube);
        assert_eq!(spatial.get(cube).unwrap().element_name(), "c1");
        let vector = added(&mut spatial, Command::AddVector { coordinates: None });
        assert_eq!(spatial.get(vector).unwrap().state().render_kind, RenderKind::Point);
        assert_eq!(
            spatial.apply(Command::AddVector {
                coordinates: Some(vec![1.0, 2.0])
            }),
            Err(SceneError::InvalidCoordinates {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn label_drag_edits_values() {
        let mut buffer = ElementBuffer::new(Dimension::Two);
        let v1 = added(&mut buffer, Command::AddVector { coordinates: None });
        buffer
            .apply(Command::EditVectorComponent {
                target: v1,
                component: 1,
                delta_pixels: -50.0,
            })
            .unwrap();
        assert_eq!(
            buffer.get(v1).unwrap().value(),
            Some(Value::Vector(DVector::from_vec(vec![1.0, 0.5])))
        );
        assert_eq!(
            buffer.apply(Command::EditVectorComponent {
                target: v1,
                component: 2,
                delta_pixels: 1.0,
            }),
            Err(SceneError::ComponentOutOfRange(2))
        );
    }
}
