//! Builder session: the running script plus the scene built from it.
//!
//! Every accepted submission appends one command to the script and rebuilds
//! the scene from the full text, so the scene always mirrors the script.

use crate::catalog::Operation;
use crate::command::Command;
use crate::config::SessionConfig;
use crate::dispatcher::{prepare, replay, run, ReplaySummary};
use crate::error::ScriptError;
use crate::param::Param;
use crate::scene::Scene;
use crate::serializer::Script;

pub struct Session<S: Scene> {
    script: Script,
    scene: S,
    auto_start: bool,
}

impl<S: Scene> Session<S> {
    /// An empty session that starts the scene after every rebuild.
    pub fn new(scene: S) -> Self {
        Self {
            script: Script::new(),
            scene,
            auto_start: true,
        }
    }

    /// A session seeded with the configured script, already built.
    pub fn with_config(scene: S, config: &SessionConfig) -> Result<Self, ScriptError> {
        let mut session = Self {
            script: Script::from_literal(config.initial_script.clone()),
            scene,
            auto_start: config.auto_start,
        };
        session.rebuild()?;
        Ok(session)
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Rebuild the scene from the current script.
    pub fn rebuild(&mut self) -> Result<ReplaySummary, ScriptError> {
        if self.auto_start {
            run(&mut self.scene, self.script.as_str())
        } else {
            replay(&mut self.scene, self.script.as_str())
        }
    }

    /// Validate `command`, append it and rebuild.
    ///
    /// A rejected command leaves the script unchanged and the scene rebuilt
    /// from it.
    pub fn submit(&mut self, command: Command) -> Result<ReplaySummary, ScriptError> {
        let position = self.script.len()?;
        if let Err(err) = prepare(position, &command) {
            log::warn!("rejected command: {}", err);
            return Err(err);
        }

        let previous = self.script.clone();
        self.script.append(&command)?;
        match self.rebuild() {
            Ok(summary) => Ok(summary),
            Err(err) => {
                log::warn!("rejected command: {}", err);
                self.script = previous;
                if let Err(rollback) = self.rebuild() {
                    log::error!("rebuilding the previous script failed: {}", rollback);
                }
                Err(err)
            }
        }
    }

    /// Build a command from raw form-field text and submit it.
    ///
    /// Each field is parsed per the declared kind of its parameter. An empty
    /// field for an optional parameter means "use the default".
    pub fn submit_form(
        &mut self,
        category: u32,
        subcategory: u32,
        function: u32,
        fields: &[&str],
    ) -> Result<ReplaySummary, ScriptError> {
        let position = self.script.len()?;
        let command = form_command(position, category, subcategory, function, fields)?;
        self.submit(command)
    }
}

/// Parse form fields into a command addressed at `position`.
pub fn form_command(
    position: usize,
    category: u32,
    subcategory: u32,
    function: u32,
    fields: &[&str],
) -> Result<Command, ScriptError> {
    let op = Operation::lookup(category, subcategory, function).ok_or(
        ScriptError::UnrecognizedCommand {
            command: position,
            category,
            subcategory,
            function,
        },
    )?;
    let specs = op.params();
    if fields.len() > specs.len() {
        return Err(ScriptError::ParameterArity {
            command: position,
            operation: op.name(),
            expected: format!("at most {}", specs.len()),
            found: fields.len(),
        });
    }

    let mut params = Vec::with_capacity(fields.len());
    for (index, (spec, text)) in specs.iter().zip(fields).enumerate() {
        if spec.optional && text.trim().is_empty() {
            params.push(Param::Null);
            continue;
        }
        let param = spec
            .kind
            .parse_input(text)
            .map_err(|reason| ScriptError::ParameterType {
                command: position,
                operation: op.name(),
                index,
                name: spec.name,
                expected: spec.kind.describe().to_string(),
                found: format!("'{}' ({})", text, reason),
            })?;
        params.push(param);
    }

    // Blank trailing optionals are simply omitted.
    while params.last() == Some(&Param::Null) {
        params.pop();
    }
    Ok(Command::for_operation(op, params))
}
