//! CLI error types.

use rp_config::ConfigError;
use rp_package::PackageError;
use rp_template::RenderError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Package(#[from] PackageError),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("invalid data file: {0}")]
    Data(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),
}
