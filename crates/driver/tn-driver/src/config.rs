//! Compilation options

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tn_resolve::Namespace;

/// Options loading failure
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Options file could not be read
    #[error("failed to read options file {}", .path.display())]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Options text is not valid TOML for [`CompileOptions`]
    #[error("failed to parse options: {0}")]
    Parse(#[from] toml::de::Error),
}

/// How a source unit is compiled
///
/// Every field has a default, so an empty TOML table is a valid options file:
///
/// ```toml
/// default_module = "scripts"
/// default_package = "main"
/// file_name = "main.tn"
/// prelude = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileOptions {
    /// Module used when the source has no `package` line
    pub default_module: String,
    /// Package used when the source has no `package` line
    pub default_package: String,
    /// Name shown in rendered diagnostics
    pub file_name: String,
    /// Load `std/lang` into namespaces created from these options
    pub prelude: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            default_module: "user".to_string(),
            default_package: "default".to_string(),
            file_name: "<input>".to_string(),
            prelude: true,
        }
    }
}

impl CompileOptions {
    /// Parse options from TOML text
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read options from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// A fresh namespace, with the prelude when enabled
    pub fn namespace(&self) -> Namespace {
        if self.prelude {
            Namespace::with_prelude()
        } else {
            Namespace::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_options_use_defaults() {
        assert_eq!(CompileOptions::from_toml("").unwrap(), CompileOptions::default());
    }

    #[test]
    fn test_partial_options() {
        let options = CompileOptions::from_toml("default_module = \"scripts\"\nprelude = false").unwrap();
        assert_eq!(options.default_module, "scripts");
        assert_eq!(options.default_package, "default");
        assert!(!options.prelude);
        assert!(options.namespace().find_package("std", "lang").is_none());
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        assert!(matches!(
            CompileOptions::from_toml("optimize = true"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let error = CompileOptions::load(Path::new("/nonexistent/tern.toml")).unwrap_err();
        assert!(error.to_string().contains("/nonexistent/tern.toml"));
    }
}
