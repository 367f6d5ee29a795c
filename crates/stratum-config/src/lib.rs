//! Configuration for the Stratum scheduler.
//!
//! Settings persist to disk as RON files with forward/backward compatible
//! serialization, and can be overridden per run via clap CLI flags.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, SceneConfig};
pub use error::ConfigError;
