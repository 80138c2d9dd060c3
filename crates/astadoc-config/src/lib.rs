//! Configuration management for astadoc.
//!
//! Parses `astadoc.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `astah.command_path`
//! - `astah.image_dir`

use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override build output directory.
    pub output_dir: Option<PathBuf>,
    /// Override path to the `astah-command` executable.
    pub command_path: Option<PathBuf>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "astadoc.toml";

/// Default directory (relative to the output dir) for generated images.
const DEFAULT_IMAGE_DIR: &str = "_images";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Documentation configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Astah integration configuration (paths are relative strings from TOML).
    astah: AstahConfigRaw,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Resolved Astah configuration (set after loading).
    #[serde(skip)]
    pub astah_resolved: AstahSettings,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    output_dir: Option<String>,
    cache_enabled: Option<bool>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Source directory for markdown files.
    pub source_dir: PathBuf,
    /// Directory the rendered site is written to.
    pub output_dir: PathBuf,
    /// Project directory for astadoc data (.astadoc/).
    pub project_dir: PathBuf,
    /// Whether the incremental build environment is persisted.
    pub cache_enabled: bool,
}

impl DocsConfig {
    /// Cache directory path (.astadoc/cache/).
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.project_dir.join("cache")
    }
}

/// Raw Astah configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AstahConfigRaw {
    command_path: Option<String>,
    image_dir: Option<String>,
}

/// Resolved Astah integration configuration.
#[derive(Debug)]
pub struct AstahSettings {
    /// Explicit path to `astah-command.sh` (or `.bat`).
    ///
    /// When `None`, the converter probes the platform install location.
    pub command_path: Option<PathBuf>,
    /// Directory under the output dir where converted images are written.
    pub image_dir: String,
}

impl Default for AstahSettings {
    fn default() -> Self {
        Self {
            command_path: None,
            image_dir: DEFAULT_IMAGE_DIR.to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`astah.command_path`").
        field: String,
        /// Error message (e.g., "${`ASTAH_HOME`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `astadoc.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.docs_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(command_path) = &settings.command_path {
            self.astah_resolved.command_path = Some(command_path.clone());
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.docs_resolved.cache_enabled = cache_enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            docs: DocsConfigRaw::default(),
            astah: AstahConfigRaw::default(),
            docs_resolved: DocsConfig {
                source_dir: base.join("docs"),
                output_dir: base.join("_build/html"),
                project_dir: base.join(".astadoc"),
                cache_enabled: true,
            },
            astah_resolved: AstahSettings::default(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_astah()
    }

    /// Validate the Astah section.
    fn validate_astah(&self) -> Result<(), ConfigError> {
        let image_dir = &self.astah_resolved.image_dir;
        require_non_empty(image_dir, "astah.image_dir")?;

        let escapes = Path::new(image_dir)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(ConfigError::Validation(format!(
                "astah.image_dir must be a relative path inside the output directory, got '{image_dir}'"
            )));
        }

        if let Some(command_path) = &self.astah_resolved.command_path {
            require_non_empty(&command_path.to_string_lossy(), "astah.command_path")?;
        }

        Ok(())
    }

    /// Expand `${VAR}` references in the fields that accept them.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let fields = [
            ("astah.command_path", &mut self.astah.command_path),
            ("astah.image_dir", &mut self.astah.image_dir),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                *value = expand_env(value, field)?;
            }
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.docs_resolved = DocsConfig {
            source_dir: resolve(self.docs.source_dir.as_deref(), "docs"),
            output_dir: resolve(self.docs.output_dir.as_deref(), "_build/html"),
            project_dir: config_dir.join(".astadoc"),
            cache_enabled: self.docs.cache_enabled.unwrap_or(true),
        };

        self.astah_resolved = AstahSettings {
            command_path: self
                .astah
                .command_path
                .as_deref()
                .map(|p| config_dir.join(p)),
            image_dir: self
                .astah
                .image_dir
                .clone()
                .unwrap_or_else(|| DEFAULT_IMAGE_DIR.to_owned()),
        };
    }
}

/// Expand `${VAR}` and `${VAR:-default}`; a bare `$VAR` is kept as written.
fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }
    shellexpand::env_with_context(value, |var| std::env::var(var).map(Some))
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}
