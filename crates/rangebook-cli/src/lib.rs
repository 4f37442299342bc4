//! Command-line front end for rangebook.
//!
//! Token decimals come from the `[tokens]` table of the configuration file,
//! so every command runs offline.

pub mod commands;
pub mod config;
pub mod error;

pub use commands::{run, BuildArgs, Command, FeeOp, OverlapArgs};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
