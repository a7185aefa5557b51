//! Command: print version information.
use std::io::{self, Write};

use anyhow::Result;

/// The build's version: `DOTTS_VERSION` stamped by the build script, else
/// the crate version.
#[must_use]
pub const fn version() -> &'static str {
    match option_env!("DOTTS_VERSION") {
        Some(version) => version,
        None => env!("CARGO_PKG_VERSION"),
    }
}

/// Print the dotts version to stdout.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn run() -> Result<()> {
    writeln!(io::stdout(), "dotts {}", version())?;
    Ok(())
}
