//! Path resolution and the `.dottsrc` settings file.
pub mod paths;
pub mod settings;

pub use paths::DottsPaths;
pub use settings::{Backend, Settings};
