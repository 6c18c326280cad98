//! Resolution of source locations

pub mod uri;

pub use uri::SourcePath;
