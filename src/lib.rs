// Public API - configuration, the extraction engine, protocol output, and the runner
pub mod config;
pub mod formats;
pub mod runner;
pub mod singer;

// Internal modules
mod io;
mod telemetry;
