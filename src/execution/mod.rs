//! Deployment script execution: permission checks, child process
//! lifecycle, output capture, and optional staging of the script to an
//! executable temporary file.

mod runner;
mod staging;

pub use runner::ScriptRunner;
pub use staging::StagedScript;
