//! Eén scène: coördinatensysteem, elementen en invoertoestand samen.

use nalgebra::Vector2;
use serde::Serialize;

use crate::config::{ConfigError, SceneConfig};
use crate::geom::{AnyCoordinateSystem, Dimension};
use crate::scene::{
    Command, Controller, Diagnostic, ElementBuffer, ElementId, ElementSummary, Grid, InputEvent,
    RenderSink, SceneError,
};

/// Resultaat van één frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameReport {
    /// Expressiefouten die deze frame voor het eerst zichtbaar werden.
    pub diagnostics: Vec<Diagnostic>,
    /// Aantal elementen dat deze frame verwijderd is.
    pub removed: usize,
}

/// Eigenaar van alle toestand van een scène.
#[derive(Debug, Clone)]
pub struct Session {
    config: SceneConfig,
    coords: AnyCoordinateSystem,
    buffer: ElementBuffer,
    controller: Controller,
    grid: Grid,
}

impl Session {
    pub fn new(config: SceneConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            coords: config.coordinate_system(),
            buffer: ElementBuffer::new(config.dimension),
            controller: Controller::new(config.camera.control()),
            grid: Grid,
            config,
        })
    }

    /// Sessie met standaardinstellingen voor de gegeven dimensie.
    #[must_use]
    pub fn with_dimension(dimension: Dimension) -> Self {
        let config = SceneConfig::with_dimension(dimension);
        Self {
            coords: config.coordinate_system(),
            buffer: ElementBuffer::new(dimension),
            controller: Controller::new(config.camera.control()),
            grid: Grid,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    #[must_use]
    pub fn dimension(&self) -> Dimension {
        self.config.dimension
    }

    #[must_use]
    pub fn coordinate_system(&self) -> &AnyCoordinateSystem {
        &self.coords
    }

    #[must_use]
    pub fn buffer(&self) -> &ElementBuffer {
        &self.buffer
    }

    #[must_use]
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn handle_event(&mut self, event: &InputEvent) {
        self.controller
            .handle_event(event, &mut self.coords, &mut self.buffer);
    }

    pub fn apply(&mut self, command: Command) -> Result<Option<ElementId>, SceneError> {
        self.buffer.apply(command)
    }

    /// Beweegt de camera voor ingedrukte toetsen.
    pub fn tick(&mut self) {
        self.controller.tick(&mut self.coords);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.config.screen_size = [width, height];
        self.coords.set_screen_size(Vector2::new(width, height));
    }

    /// Een volledige frame: events, tick, opruimen, herberekenen en tekenen.
    pub fn frame(&mut self, events: &[InputEvent], sink: &mut dyn RenderSink) -> FrameReport {
        for event in events {
            self.handle_event(event);
        }
        self.tick();
        self.render(sink)
    }

    /// Ruimt verwijderde elementen op, herberekent afgeleide elementen en tekent.
    pub fn render(&mut self, sink: &mut dyn RenderSink) -> FrameReport {
        let removed = self.buffer.remove_elements();
        let diagnostics = self.buffer.refresh();

        self.grid.render(sink, &self.coords);
        self.buffer.render(sink, &self.coords);

        FrameReport {
            diagnostics,
            removed,
        }
    }

    #[must_use]
    pub fn summaries(&self) -> Vec<ElementSummary> {
        self.buffer.summaries()
    }
}
