//! Configuration management for report rendering.
//!
//! Parses `rp.toml` configuration files with serde and provides
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
//! - `report.template`
//! - `report.output`
//! - `report.data`
//! - `images.marker`
//! - `images.files.*`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override template path.
    pub template: Option<PathBuf>,
    /// Override output path.
    pub output: Option<PathBuf>,
    /// Override JSON data path.
    pub data: Option<PathBuf>,
    /// Additional image bindings (`name`, path); replace same-named entries.
    pub images: Vec<(String, PathBuf)>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "rp.toml";

/// Default placeholder marker.
const DEFAULT_MARKER: &str = "%";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Report paths (relative strings from TOML).
    report: ReportConfigRaw,
    /// Image embedding configuration.
    pub images: ImagesConfig,

    /// Resolved report paths (set after loading).
    #[serde(skip)]
    pub report_resolved: ReportConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Raw report configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ReportConfigRaw {
    template: Option<String>,
    output: Option<String>,
    data: Option<String>,
}

/// Resolved report paths.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReportConfig {
    /// Template package (`.docx`).
    pub template: Option<PathBuf>,
    /// Where the rendered package is written.
    pub output: Option<PathBuf>,
    /// JSON file with the render context values.
    pub data: Option<PathBuf>,
    /// Image files bound to placeholder names.
    pub images: BTreeMap<String, PathBuf>,
}

/// Image embedding configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Placeholder marker character (`{%chart}`).
    pub marker: String,
    /// Width in pixels used when images are not sized from their header.
    pub default_width: f64,
    /// Height in pixels used when images are not sized from their header.
    pub default_height: f64,
    /// Scale wider images down to this width (pixels).
    pub max_width: Option<f64>,
    /// Read image dimensions from the image header.
    pub size_from_header: bool,
    /// Image files bound to placeholder names, relative to the config file.
    files: BTreeMap<String, String>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_owned(),
            default_width: 600.0,
            default_height: 400.0,
            max_width: None,
            size_from_header: true,
            files: BTreeMap::new(),
        }
    }
}

impl ImagesConfig {
    /// The marker as a character.
    ///
    /// Only meaningful after [`Config::validate`] succeeded.
    #[must_use]
    pub fn marker_char(&self) -> char {
        self.marker.chars().next().unwrap_or('%')
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
        /// Config field path (e.g., "`report.template`").
        field: String,
        /// Error message (e.g., "${`TEMPLATE_DIR`} not set").
        message: String,
    },
}

/// Require a size field to be a positive finite number.
fn require_positive(value: f64, field: &str) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `rp.toml` in current directory and parents.
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
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(template) = &settings.template {
            self.report_resolved.template = Some(template.clone());
        }
        if let Some(output) = &settings.output {
            self.report_resolved.output = Some(output.clone());
        }
        if let Some(data) = &settings.data {
            self.report_resolved.data = Some(data.clone());
        }
        for (name, path) in &settings.images {
            self.report_resolved
                .images
                .insert(name.clone(), path.clone());
        }
    }

    /// Template path, required by `render`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if neither the config nor the CLI
    /// named a template.
    pub fn require_template(&self) -> Result<&Path, ConfigError> {
        self.report_resolved.template.as_deref().ok_or_else(|| {
            ConfigError::Validation("report.template is required (or pass --template)".into())
        })
    }

    /// Output path, required by `render`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if neither the config nor the CLI
    /// named an output.
    pub fn require_output(&self) -> Result<&Path, ConfigError> {
        self.report_resolved.output.as_deref().ok_or_else(|| {
            ConfigError::Validation("report.output is required (or pass --output)".into())
        })
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

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_images()
    }

    /// Validate images configuration.
    fn validate_images(&self) -> Result<(), ConfigError> {
        let mut chars = self.images.marker.chars();
        let marker = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(ConfigError::Validation(
                    "images.marker must be exactly one character".to_owned(),
                ));
            }
        };
        if marker.is_alphanumeric()
            || marker.is_whitespace()
            || matches!(marker, '{' | '}' | '<' | '_' | '.')
        {
            return Err(ConfigError::Validation(format!(
                "images.marker cannot be {marker:?}"
            )));
        }

        require_positive(self.images.default_width, "images.default_width")?;
        require_positive(self.images.default_height, "images.default_height")?;
        if let Some(max_width) = self.images.max_width {
            require_positive(max_width, "images.max_width")?;
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let report = &mut self.report;
        for (value, field) in [
            (&mut report.template, "report.template"),
            (&mut report.output, "report.output"),
            (&mut report.data, "report.data"),
        ] {
            if let Some(raw) = value.as_deref() {
                *value = Some(expand::expand_env(raw, field)?);
            }
        }

        self.images.marker = expand::expand_env(&self.images.marker, "images.marker")?;

        for (name, path) in &mut self.images.files {
            *path = expand::expand_env(path, &format!("images.files.{name}"))?;
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>| path.map(|p| config_dir.join(p));

        self.report_resolved = ReportConfig {
            template: resolve(self.report.template.as_deref()),
            output: resolve(self.report.output.as_deref()),
            data: resolve(self.report.data.as_deref()),
            images: self
                .images
                .files
                .iter()
                .map(|(name, path)| (name.clone(), config_dir.join(path)))
                .collect(),
        };
    }
}
