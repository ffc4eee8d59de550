pub mod error;
pub mod param;
pub mod command;
pub mod tokenizer;
pub mod serializer;
pub mod catalog;
pub mod scene;
pub mod dispatcher;

// Scene state and the builder loop
pub mod scene_graph;
pub mod session;
pub mod config;
pub mod script_diagnostics;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

#[cfg(target_arch = "wasm32")]
pub mod wasm;
