//! Build command - generate the manifest and content-type parts.

use std::path::PathBuf;

use extpack::content_types::ContentTypeFragment;
use extpack::package::to_zip_item_name;
use tracing::info;

use super::common::{load_builder, write_part, SourceArgs};
use crate::error::CliError;

/// Arguments for the build command.
pub struct BuildArgs {
    pub source: SourceArgs,
    pub out_dir: PathBuf,
    pub skip_validation: bool,
}

/// Run the build command.
pub async fn run(args: BuildArgs) -> Result<(), CliError> {
    let mut builder = load_builder(&args.source)?;

    if !args.skip_validation {
        let violations = builder.validate();
        if !violations.is_empty() {
            return Err(CliError::Validation(violations));
        }
    }

    builder.finalize().await?;

    let manifest = builder.get_result()?;
    let manifest_path = write_part(&args.out_dir, builder.path(), &manifest)?;
    println!("Wrote {}", manifest_path.display());

    let content_types = builder
        .content_types()
        .ok_or_else(|| CliError::Config("content types were not resolved".to_string()))?
        .to_xml()
        .map_err(|e| CliError::Manifest(e.into()))?;
    let content_types_path = write_part(
        &args.out_dir,
        to_zip_item_name(ContentTypeFragment::PART_NAME),
        &content_types,
    )?;
    println!("Wrote {}", content_types_path.display());

    info!(
        files = builder.files().len(),
        out_dir = %args.out_dir.display(),
        "Build complete"
    );
    Ok(())
}
