#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod expr;
pub mod geom;
pub mod scene;
pub mod session;

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

use config::SceneConfig;
use geom::Dimension;
use scene::{Command, Diagnostic, DrawList, InputEvent};
use session::Session;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    // Een tweede aanroep vindt de logger al geregistreerd.
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {}

/// Resultaat van [`Engine::render`].
#[derive(Debug, Serialize)]
struct RenderOutput<'a> {
    draw: &'a DrawList,
    diagnostics: &'a [Diagnostic],
    removed: usize,
}

/// Publiek aanspreekpunt voor de browser.
#[wasm_bindgen]
pub struct Engine {
    session: Session,
}

#[wasm_bindgen]
impl Engine {
    /// Nieuwe scène met standaardinstellingen; `dimension` is 2 of 3.
    #[wasm_bindgen(constructor)]
    pub fn new(dimension: u8) -> Result<Engine, JsValue> {
        let dimension = Dimension::try_from(dimension).map_err(|err| js_error(&err))?;
        Ok(Engine {
            session: Session::with_dimension(dimension),
        })
    }

    /// Nieuwe scène uit een (gedeeltelijk) configuratieobject.
    #[wasm_bindgen]
    pub fn with_config(config: JsValue) -> Result<Engine, JsValue> {
        let config: SceneConfig = from_js(config)?;
        let session = Session::new(config).map_err(to_js_error)?;
        Ok(Engine { session })
    }

    #[wasm_bindgen]
    pub fn dimension(&self) -> u8 {
        self.session.dimension().into()
    }

    /// Verwerk één invoerevent, bijvoorbeeld `{ type: "Wheel", delta: 1 }`.
    #[wasm_bindgen]
    pub fn handle_event(&mut self, event: JsValue) -> Result<(), JsValue> {
        let event: InputEvent = from_js(event)?;
        self.session.handle_event(&event);
        Ok(())
    }

    /// Voer een commando uit; geeft het id van een nieuw element of `undefined`.
    #[wasm_bindgen]
    pub fn apply_command(&mut self, command: JsValue) -> Result<JsValue, JsValue> {
        let command: Command = from_js(command)?;
        let id = self.session.apply(command).map_err(to_js_error)?;
        to_js(&id)
    }

    #[wasm_bindgen]
    pub fn tick(&mut self) {
        self.session.tick();
    }

    /// Tekent de huidige frame en geeft de tekenopdrachten en nieuwe fouten terug.
    #[wasm_bindgen]
    pub fn render(&mut self) -> Result<JsValue, JsValue> {
        let mut list = DrawList::new(self.session.config().screen_size());
        let report = self.session.render(&mut list);
        to_js(&RenderOutput {
            draw: &list,
            diagnostics: &report.diagnostics,
            removed: report.removed,
        })
    }

    /// Samenvattingen van alle elementen voor de zijbalk.
    #[wasm_bindgen]
    pub fn elements(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.summaries())
    }

    #[wasm_bindgen]
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), JsValue> {
        if !(width > 0.0 && height > 0.0) {
            return Err(js_error("schermgrootte moet positief zijn"));
        }
        self.session.resize(width, height);
        Ok(())
    }
}

impl Engine {
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|err| JsError::new(&err.to_string()).into())
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|err| JsError::new(&err.to_string()).into())
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
