//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// Returns the original string unchanged if no `${}` patterns are present.
/// Bare `$VAR` syntax is not expanded (only `${VAR}` with braces).
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    // Unset variables without a default are left in place and reported below.
    let expanded =
        shellexpand::env_with_context_no_errors(value, |var| std::env::var(var).ok()).into_owned();

    match unexpanded_var(&expanded) {
        Some(var) => Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{var}}} not set"),
        }),
        None => Ok(expanded),
    }
}

/// Name of the first `${VAR}` reference left in an expanded string.
fn unexpanded_var(expanded: &str) -> Option<&str> {
    let start = expanded.find("${")? + 2;
    let len = expanded[start..].find('}')?;
    Some(&expanded[start..start + len])
}
