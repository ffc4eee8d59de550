use wasm_bindgen::prelude::*;

use crate::catalog;
use crate::command::Command;
use crate::config::SessionConfig;
use crate::error::ScriptError;
use crate::scene_graph::SceneGraph;
use crate::script_diagnostics::{from_script_error, ScriptDiagnostic};
use crate::serializer::serialize;
use crate::session::Session;
use crate::tokenizer::tokenize;

/// Diagnostic JSON for `err`, as a JS error value.
fn diagnostic_error(err: &ScriptError, script: Option<&str>) -> JsValue {
    let diagnostic: ScriptDiagnostic = from_script_error(err, script);
    match serde_json::to_string(&diagnostic) {
        Ok(json) => JsValue::from_str(&json),
        Err(_) => JsValue::from_str(&err.to_string()),
    }
}

fn json_error(err: serde_json::Error) -> JsValue {
    JsValue::from_str(&format!("JSON error: {}", err))
}

#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Decode a script into a JSON array of commands.
#[wasm_bindgen]
pub fn tokenize_script(script: &str) -> Result<String, JsValue> {
    let commands = tokenize(script).map_err(|e| diagnostic_error(&e, Some(script)))?;
    serde_json::to_string(&commands).map_err(json_error)
}

/// Encode one JSON command into a `|c1:c2:f:params` fragment.
#[wasm_bindgen]
pub fn serialize_command(command_json: &str) -> Result<String, JsValue> {
    let command: Command = serde_json::from_str(command_json).map_err(json_error)?;
    serialize(&command).map_err(|e| diagnostic_error(&e, None))
}

/// The operation catalog, for building editor menus.
#[wasm_bindgen]
pub fn catalog_json() -> String {
    serde_json::to_string(&catalog::entries()).unwrap_or_else(|_| "[]".to_string())
}

#[wasm_bindgen]
pub struct WasmSession {
    inner: Session<SceneGraph>,
}

#[wasm_bindgen]
impl WasmSession {
    /// Create a session from optional config JSON.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmSession, JsValue> {
        init_panic_hook();
        let config = match config_json {
            Some(json) => SessionConfig::from_json(&json).map_err(|e| JsValue::from_str(&e))?,
            None => SessionConfig::default(),
        };
        let inner = Session::with_config(SceneGraph::new(), &config)
            .map_err(|e| diagnostic_error(&e, Some(&config.initial_script)))?;
        Ok(WasmSession { inner })
    }

    /// Submit one builder form. Returns the updated script text.
    pub fn submit_form(
        &mut self,
        category: u32,
        subcategory: u32,
        function: u32,
        fields: Vec<String>,
    ) -> Result<String, JsValue> {
        let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
        self.inner
            .submit_form(category, subcategory, function, &fields)
            .map_err(|e| diagnostic_error(&e, None))?;
        Ok(self.script())
    }

    pub fn script(&self) -> String {
        self.inner.script().to_string()
    }

    /// Rebuild the scene from the current script; returns the replay summary.
    pub fn rebuild(&mut self) -> Result<String, JsValue> {
        let summary = self
            .inner
            .rebuild()
            .map_err(|e| diagnostic_error(&e, Some(self.inner.script().as_str())))?;
        serde_json::to_string(&summary).map_err(json_error)
    }

    pub fn summary_json(&self) -> String {
        serde_json::to_string(&self.inner.scene().summary()).unwrap_or_else(|_| "{}".to_string())
    }
}
