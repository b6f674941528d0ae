//! Subcommand implementations.

pub mod cart;
pub mod catalog;

use serde::Serialize;

/// Pretty-print `value` as JSON on stdout.
///
/// # Errors
///
/// Returns an error if `value` cannot be serialized.
#[allow(clippy::print_stdout)]
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    let output = serde_json::to_string_pretty(value)?;
    println!("{output}");
    Ok(())
}
