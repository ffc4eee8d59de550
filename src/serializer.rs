//! Script serializer: the inverse of [`crate::tokenizer`].
//!
//! A serialized command always starts with the command separator, so
//! appending a fragment to any script (empty or not) is plain string
//! concatenation. The tokenizer trims the single leading separator this
//! leaves on a script that started out empty.

use std::fmt;

use crate::command::Command;
use crate::error::ScriptError;
use crate::tokenizer::{normalize, tokenize, COMMAND_SEPARATOR, FIELD_SEPARATOR};

/// Render `|c1:c2:f:<tokens>` for one command.
pub fn serialize(command: &Command) -> Result<String, ScriptError> {
    let mut out = format!(
        "{sep}{}{field}{}{field}{}{field}",
        command.category,
        command.subcategory,
        command.function,
        sep = COMMAND_SEPARATOR,
        field = FIELD_SEPARATOR,
    );
    for param in &command.params {
        out.push_str(&param.encode()?);
    }
    Ok(out)
}

/// Render a whole script, without the leading separator.
pub fn serialize_script(commands: &[Command]) -> Result<String, ScriptError> {
    let mut out = String::new();
    for command in commands {
        out.push_str(&serialize(command)?);
    }
    Ok(normalize(&out))
}

/// The running script: the single source of truth for a scene.
///
/// Commands are only ever appended. Replaying means tokenizing the whole
/// text again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    text: String,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing script text. The text is not validated until it is
    /// tokenized.
    pub fn from_literal(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Append one command. On failure the script is left unchanged.
    pub fn append(&mut self, command: &Command) -> Result<(), ScriptError> {
        let fragment = serialize(command)?;
        if self.is_empty() {
            // Keep stored text free of the leading separator.
            self.text.push_str(&fragment[COMMAND_SEPARATOR.len_utf8()..]);
        } else {
            self.text.push_str(&fragment);
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        normalize(&self.text).is_empty()
    }

    pub fn commands(&self) -> Result<Vec<Command>, ScriptError> {
        tokenize(&self.text)
    }

    /// Number of commands in the script, if it tokenizes.
    pub fn len(&self) -> Result<usize, ScriptError> {
        self.commands().map(|c| c.len())
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
