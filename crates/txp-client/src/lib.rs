//! txp client library: CLI, transfer loop, and progress reporting.

pub mod cli;
pub mod progress;
pub mod transfer;

pub use cli::Cli;
pub use transfer::{send_file, SendReport};
