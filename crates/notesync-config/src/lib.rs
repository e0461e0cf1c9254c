//! Shared configuration loader for notesync.
//!
//! `defaults/notesync.default.toml` is embedded into the binary so the
//! documented defaults and runtime behavior never drift apart. Callers layer a
//! user file, `NOTESYNC__*` environment variables and command-line overrides
//! on top through [`Loader`] before deserializing into [`NotesyncConfig`].

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, Map, ValueKind};
use notesync_core::notion::NotionApi;
use notesync_core::{FencePolicy, History, SyncOptions};
use serde::Deserialize;

const DEFAULT_TOML: &str = include_str!("../defaults/notesync.default.toml");

/// Prefix of environment variables read by [`Loader::with_environment`].
pub const ENV_PREFIX: &str = "NOTESYNC";

/// Separator between prefix, section and key, as in `NOTESYNC__NOTION__VERSION`.
pub const ENV_SEPARATOR: &str = "__";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NotesyncConfig {
    pub notion: NotionConfig,
    pub parser: ParserConfig,
    pub history: HistoryConfig,
}

/// Where and how pages are written.
#[derive(Debug, Clone, Deserialize)]
pub struct NotionConfig {
    pub api_base: String,
    pub version: String,
    pub database_id: String,
    pub max_children_per_request: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    pub unterminated_fence: FencePolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    pub path: PathBuf,
}

impl NotesyncConfig {
    /// Options for [`notesync_core::sync_note`].
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            database_id: self.notion.database_id.clone(),
            max_children_per_request: self.notion.max_children_per_request,
            fence_policy: self.parser.unterminated_fence,
        }
    }

    /// Endpoints and `Notion-Version` header for outgoing requests.
    pub fn api(&self) -> NotionApi {
        NotionApi::new(&self.notion.api_base, self.notion.version.clone())
    }

    pub fn history(&self) -> History {
        History::new(&self.history.path)
    }
}

impl From<&ParserConfig> for notesync_core::Parser {
    fn from(config: &ParserConfig) -> Self {
        notesync_core::Parser::new().with_fence_policy(config.unterminated_fence)
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer `NOTESYNC__SECTION__KEY` variables from the process environment.
    pub fn with_environment(mut self) -> Self {
        self.builder = self.builder.add_source(environment());
        self
    }

    /// Same as [`Loader::with_environment`] but reads from `vars` instead.
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.builder = self.builder.add_source(environment().source(Some(vars)));
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<NotesyncConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_SEPARATOR)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<NotesyncConfig, ConfigError> {
    Loader::new().build()
}
