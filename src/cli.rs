use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::catalog;
use crate::command::Command;
use crate::config::SessionConfig;
use crate::dispatcher::{self, CallLog, ReplaySummary};
use crate::scene_graph::{SceneGraph, SceneSummary};
use crate::script_diagnostics::from_script_error;
use crate::serializer::serialize_script;
use crate::session::Session;
use crate::tokenizer::tokenize;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Session config JSON file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Where the script text comes from. Without either option the configured
/// initial script is used.
#[derive(clap::Args)]
struct ScriptSource {
    /// Script file
    script: Option<PathBuf>,

    /// Script text given directly on the command line
    #[arg(long, conflicts_with = "script")]
    inline: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a script into an in-memory scene and print what it built
    Run {
        #[command(flatten)]
        source: ScriptSource,

        /// Print every scene call instead of the scene summary
        #[arg(long)]
        trace: bool,
    },
    /// Decode a script and print its commands as JSON
    Tokenize {
        #[command(flatten)]
        source: ScriptSource,
    },
    /// Encode a JSON array of commands back into script text
    Encode {
        /// JSON file holding an array of commands
        input: PathBuf,
    },
    /// Print the operation catalog as JSON
    Catalog,
    /// Validate a script; prints a diagnostic and fails if it is invalid
    Check {
        #[command(flatten)]
        source: ScriptSource,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport {
    replay: ReplaySummary,
    scene: SceneSummary,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { source, trace } => {
            let script = read_script(&source, &config)?;
            if trace {
                let mut calls = CallLog::new();
                dispatcher::run(&mut calls, &script)?;
                for call in &calls.calls {
                    println!("{:?}", call);
                }
            } else {
                let config = SessionConfig {
                    initial_script: script,
                    ..config
                };
                let mut session = Session::with_config(SceneGraph::new(), &config)?;
                let report = RunReport {
                    replay: session.rebuild()?,
                    scene: session.scene().summary(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
        Commands::Tokenize { source } => {
            let script = read_script(&source, &config)?;
            let commands = tokenize(&script)?;
            println!("{}", serde_json::to_string_pretty(&commands)?);
        }
        Commands::Encode { input } => {
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {:?}", input))?;
            let commands: Vec<Command> = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse commands in {:?}", input))?;
            println!("{}", serialize_script(&commands)?);
        }
        Commands::Catalog => {
            println!("{}", serde_json::to_string_pretty(&catalog::entries())?);
        }
        Commands::Check { source } => {
            let script = read_script(&source, &config)?;
            let mut calls = CallLog::new();
            match dispatcher::replay(&mut calls, &script) {
                Ok(summary) => {
                    log::info!("script ok: {} commands", summary.commands);
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                }
                Err(err) => {
                    let diagnostic = from_script_error(&err, Some(&script));
                    println!("{}", serde_json::to_string_pretty(&diagnostic)?);
                    return Err(anyhow!("invalid script: {}", err));
                }
            }
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let config = match path {
        Some(path) => SessionConfig::from_file(path).map_err(|e| anyhow!(e))?,
        None => SessionConfig::default(),
    };
    config.validate().map_err(|e| anyhow!(e))?;
    Ok(config)
}

fn read_script(source: &ScriptSource, config: &SessionConfig) -> Result<String> {
    if let Some(text) = &source.inline {
        return Ok(text.clone());
    }
    match &source.script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {:?}", path)),
        None => Ok(config.initial_script.clone()),
    }
}
