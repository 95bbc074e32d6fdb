//! txp server library: CLI, listener, and per-connection receive logic.

pub mod cli;
pub mod connection;
pub mod listener;

pub use cli::Cli;
pub use connection::{ReceiveReport, ServerConfig};
pub use listener::FileServer;
