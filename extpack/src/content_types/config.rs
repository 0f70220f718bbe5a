//! Configuration for content-type resolution.

/// Default command used to sniff content types from file bytes.
pub const DEFAULT_SNIFF_COMMAND: &str = "file";

/// Default command used to query the platform file-association registry.
pub const DEFAULT_REGISTRY_COMMAND: &str = "reg";

/// Which resolution strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentTypeStrategy {
    /// Pick by host platform: the registry on Windows, sniffing elsewhere.
    #[default]
    Auto,

    /// Per-extension lookup in the platform file-association registry.
    Registry,

    /// Per-file content sniffing with a majority vote per extension.
    Sniffing,
}

impl ContentTypeStrategy {
    /// Resolve `Auto` against the host platform.
    pub fn effective(self) -> Self {
        match self {
            ContentTypeStrategy::Auto => {
                if cfg!(windows) {
                    ContentTypeStrategy::Registry
                } else {
                    ContentTypeStrategy::Sniffing
                }
            }
            other => other,
        }
    }

    /// Parse from a configuration string.
    pub fn from_config_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(ContentTypeStrategy::Auto),
            "registry" => Some(ContentTypeStrategy::Registry),
            "sniffing" | "sniff" => Some(ContentTypeStrategy::Sniffing),
            _ => None,
        }
    }
}

/// Configuration for content-type resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Resolution strategy.
    pub strategy: ContentTypeStrategy,

    /// Command invoked as `<cmd> --mime-type -b <path>` by the sniffing strategy.
    pub sniff_command: String,

    /// Command invoked as `<cmd> query HKCR\<ext> /v "Content Type"` by the
    /// registry strategy.
    pub registry_command: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            strategy: ContentTypeStrategy::Auto,
            sniff_command: DEFAULT_SNIFF_COMMAND.to_string(),
            registry_command: DEFAULT_REGISTRY_COMMAND.to_string(),
        }
    }
}

impl ResolverConfig {
    /// Set the strategy.
    pub fn with_strategy(mut self, strategy: ContentTypeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the sniffing command.
    pub fn with_sniff_command(mut self, command: impl Into<String>) -> Self {
        self.sniff_command = command.into();
        self
    }

    /// Set the registry query command.
    pub fn with_registry_command(mut self, command: impl Into<String>) -> Self {
        self.registry_command = command.into();
        self
    }
}
