//! Validate command - check manifest files without building.

use super::common::{load_builder, SourceArgs};
use crate::error::CliError;

/// Run the validate command.
pub fn run(args: SourceArgs) -> Result<(), CliError> {
    let builder = load_builder(&args)?;
    let violations = builder.validate();

    if violations.is_empty() {
        println!("Manifest is valid.");
        Ok(())
    } else {
        Err(CliError::Validation(violations))
    }
}
