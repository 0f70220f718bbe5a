//! Common types and utilities shared across CLI commands.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use serde_json::{Map, Value};
use tracing::debug;

use extpack::content_types::{ContentTypeStrategy, ResolverConfig};
use extpack::manifest::{BuilderConfig, ManifestBuilder};

use crate::error::CliError;

/// Content-type strategy selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum StrategyArg {
    /// Registry on Windows, sniffing elsewhere
    Auto,
    /// Per-extension lookup in the Windows file-association registry
    Registry,
    /// Per-file sniffing with the `file` utility
    Sniffing,
}

impl From<StrategyArg> for ContentTypeStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Auto => ContentTypeStrategy::Auto,
            StrategyArg::Registry => ContentTypeStrategy::Registry,
            StrategyArg::Sniffing => ContentTypeStrategy::Sniffing,
        }
    }
}

/// Arguments describing where the manifest configuration comes from.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Extension root directory; relative file paths resolve against it
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// JSON manifest files, applied in order
    #[arg(long = "manifest", value_name = "FILE", default_value = "vss-extension.json")]
    pub manifests: Vec<PathBuf>,

    /// JSON object whose keys override values from the manifest files
    #[arg(long, value_name = "JSON")]
    pub overrides: Option<String>,

    /// Content-type resolution strategy
    #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
    pub strategy: StrategyArg,

    /// Command used to sniff content types
    #[arg(long, value_name = "CMD")]
    pub sniff_command: Option<String>,

    /// Command used to query the file-association registry
    #[arg(long, value_name = "CMD")]
    pub registry_command: Option<String>,

    /// Do not add a default installation target
    #[arg(long)]
    pub no_default_target: bool,
}

impl SourceArgs {
    /// Builder configuration for these arguments.
    pub fn builder_config(&self) -> BuilderConfig {
        let mut resolver = ResolverConfig::default().with_strategy(self.strategy.into());
        if let Some(command) = &self.sniff_command {
            resolver = resolver.with_sniff_command(command.clone());
        }
        if let Some(command) = &self.registry_command {
            resolver = resolver.with_registry_command(command.clone());
        }

        let mut config = BuilderConfig::new(self.root.clone()).with_resolver(resolver);
        if self.no_default_target {
            config = config.with_default_target(None);
        }
        config
    }
}

/// Create a builder and apply every manifest file and the overrides.
///
/// Manifest file values may not conflict with each other; overrides always win.
pub fn load_builder(args: &SourceArgs) -> Result<ManifestBuilder, CliError> {
    let mut builder = ManifestBuilder::new(args.builder_config());

    for path in &args.manifests {
        let path = resolve_manifest_path(&args.root, path);
        let keys = read_manifest(&path)?;
        debug!(path = %path.display(), keys = keys.len(), "Applying manifest file");
        apply_keys(&mut builder, &keys, false)?;
    }

    if let Some(overrides) = &args.overrides {
        let keys = parse_object(overrides)
            .map_err(|e| CliError::Config(format!("invalid --overrides: {}", e)))?;
        apply_keys(&mut builder, &keys, true)?;
    }

    Ok(builder)
}

fn resolve_manifest_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || path.exists() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

fn read_manifest(path: &Path) -> Result<Map<String, Value>, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_object(&text).map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))
}

fn parse_object(text: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("expected a JSON object".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn apply_keys(
    builder: &mut ManifestBuilder,
    keys: &Map<String, Value>,
    override_allowed: bool,
) -> Result<(), CliError> {
    for (key, value) in keys {
        builder.process_key(key, value, override_allowed)?;
    }
    Ok(())
}

/// Write a generated part below the output directory.
pub fn write_part(out_dir: &Path, name: &str, content: &str) -> Result<PathBuf, CliError> {
    let path = out_dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| CliError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&path, content).map_err(|source| CliError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
