//! Error types for script tokenizing, encoding and dispatch.

use crate::scene::SceneError;

/// Failure raised while turning a script into scene calls, or back.
///
/// `command` fields are 0-based positions of the offending command within
/// the script being processed. Errors raised outside a script context (a
/// single fragment encoded on its own) use position 0.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    /// Wrong field count, non-integer category path, or a parameter blob
    /// that does not start with a tag character.
    #[error("command {command}: malformed command: {reason}")]
    MalformedCommand { command: usize, reason: String },

    /// The `(category, subcategory, function)` path has no catalog entry.
    #[error("command {command}: unrecognized command {category}:{subcategory}:{function}")]
    UnrecognizedCommand {
        command: usize,
        category: u32,
        subcategory: u32,
        function: u32,
    },

    /// A tagged value body cannot be parsed per its tag's grammar.
    #[error("command {command}: cannot decode '{tag}{body}': {reason}")]
    Decode {
        command: usize,
        tag: char,
        body: String,
        reason: String,
    },

    /// Parameter count outside the range accepted by the operation.
    #[error("command {command}: {operation} expects {expected} parameters, got {found}")]
    ParameterArity {
        command: usize,
        operation: &'static str,
        expected: String,
        found: usize,
    },

    /// A parameter decoded fine but has the wrong kind or shape for its slot.
    #[error("command {command}: parameter {index} ({name}) of {operation}: expected {expected}, got {found}")]
    ParameterType {
        command: usize,
        operation: &'static str,
        index: usize,
        name: &'static str,
        expected: String,
        found: String,
    },

    /// A value that has no representation in the script grammar.
    #[error("cannot encode {value}: {reason}")]
    Encode { value: String, reason: String },

    /// The scene rejected an otherwise valid call.
    #[error("command {command}: {source}")]
    Scene {
        command: usize,
        #[source]
        source: SceneError,
    },
}

impl ScriptError {
    /// Position of the command this error belongs to, when there is one.
    pub fn command(&self) -> Option<usize> {
        match self {
            ScriptError::MalformedCommand { command, .. }
            | ScriptError::UnrecognizedCommand { command, .. }
            | ScriptError::Decode { command, .. }
            | ScriptError::ParameterArity { command, .. }
            | ScriptError::ParameterType { command, .. }
            | ScriptError::Scene { command, .. } => Some(*command),
            ScriptError::Encode { .. } => None,
        }
    }

    /// Rebase the error onto a different command position.
    ///
    /// Codec functions report position 0; the tokenizer moves their errors
    /// onto the command they were scanned from.
    pub fn at_command(mut self, position: usize) -> Self {
        match &mut self {
            ScriptError::MalformedCommand { command, .. }
            | ScriptError::UnrecognizedCommand { command, .. }
            | ScriptError::Decode { command, .. }
            | ScriptError::ParameterArity { command, .. }
            | ScriptError::ParameterType { command, .. }
            | ScriptError::Scene { command, .. } => *command = position,
            ScriptError::Encode { .. } => {}
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_command_rebases_position() {
        let err = ScriptError::MalformedCommand {
            command: 0,
            reason: "x".to_string(),
        };
        assert_eq!(err.at_command(4).command(), Some(4));
    }

    #[test]
    fn test_encode_error_has_no_position() {
        let err = ScriptError::Encode {
            value: "[]".to_string(),
            reason: "empty row".to_string(),
        };
        assert_eq!(err.clone().at_command(3), err);
        assert_eq!(err.command(), None);
    }

    #[test]
    fn test_display_mentions_path() {
        let err = ScriptError::UnrecognizedCommand {
            command: 2,
            category: 9,
            subcategory: 0,
            function: 0,
        };
        assert_eq!(err.to_string(), "command 2: unrecognized command 9:0:0");
    }
}
