//! Structured script diagnostics.
//!
//! Wraps [`ScriptError`] into a stable, JSON-serializable format that an
//! editor UI can surface without access to Rust logs.

use serde::Serialize;

use crate::error::ScriptError;
use crate::tokenizer::{normalize, raw_commands};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScriptDiagnosticKind {
    MalformedCommand,
    UnrecognizedCommand,
    DecodeError,
    ParameterArity,
    ParameterType,
    EncodeError,
    /// The scene refused a valid call (e.g. removing a missing element).
    SceneError,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScriptPhase {
    /// Splitting and decoding script text.
    Tokenize,
    /// Resolving commands and calling the scene.
    Dispatch,
    /// Turning values back into script text.
    Encode,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScriptLocation {
    /// 0-based position of the command within the script.
    pub command: usize,
    /// The raw text of that command, when the script is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScriptDiagnostic {
    pub kind: ScriptDiagnosticKind,
    pub phase: ScriptPhase,
    pub message: String,
    pub location: Option<ScriptLocation>,
}

fn classify(err: &ScriptError) -> (ScriptDiagnosticKind, ScriptPhase) {
    match err {
        ScriptError::MalformedCommand { .. } => {
            (ScriptDiagnosticKind::MalformedCommand, ScriptPhase::Tokenize)
        }
        ScriptError::Decode { .. } => (ScriptDiagnosticKind::DecodeError, ScriptPhase::Tokenize),
        ScriptError::UnrecognizedCommand { .. } => {
            (ScriptDiagnosticKind::UnrecognizedCommand, ScriptPhase::Dispatch)
        }
        ScriptError::ParameterArity { .. } => {
            (ScriptDiagnosticKind::ParameterArity, ScriptPhase::Dispatch)
        }
        ScriptError::ParameterType { .. } => {
            (ScriptDiagnosticKind::ParameterType, ScriptPhase::Dispatch)
        }
        ScriptError::Scene { .. } => (ScriptDiagnosticKind::SceneError, ScriptPhase::Dispatch),
        ScriptError::Encode { .. } => (ScriptDiagnosticKind::EncodeError, ScriptPhase::Encode),
    }
}

/// Raw text of the `position`-th command of `script`.
fn fragment_at(script: &str, position: usize) -> Option<String> {
    raw_commands(&normalize(script))
        .nth(position)
        .map(|(_, raw)| raw.to_string())
}

/// Diagnostic for an error raised while processing `script`.
pub fn from_script_error(err: &ScriptError, script: Option<&str>) -> ScriptDiagnostic {
    let (kind, phase) = classify(err);
    let location = err.command().map(|command| ScriptLocation {
        command,
        fragment: script.and_then(|s| fragment_at(s, command)),
    });

    ScriptDiagnostic {
        kind,
        phase,
        message: err.to_string(),
        location,
    }
}

impl From<&ScriptError> for ScriptDiagnostic {
    fn from(err: &ScriptError) -> Self {
        from_script_error(err, None)
    }
}
