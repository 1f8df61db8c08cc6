use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// EngineConfig
///
/// Project-wide naming defaults, normally read from `stencil.toml`. Every
/// section and key is optional.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub accessors: AccessorConfig,
    pub builder: BuilderConfig,
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&text)
    }
}

///
/// AccessorConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct AccessorConfig {
    /// Accessors are named after the field, without `get`/`set`.
    pub fluent: bool,

    /// Setters return the receiver. Implied by `fluent`.
    pub chain: bool,

    /// Boolean getters use `is` instead of `get`.
    pub boolean_prefix: bool,
}

impl AccessorConfig {
    #[must_use]
    pub const fn chains(&self) -> bool {
        self.chain || self.fluent
    }
}

impl Default for AccessorConfig {
    fn default() -> Self {
        Self {
            fluent: false,
            chain: false,
            boolean_prefix: true,
        }
    }
}

///
/// BuilderConfig
///
/// Fallbacks for builder parameters the directive leaves unset.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub class_suffix: String,
    pub method_name: String,
    pub build_method: String,
    pub setter_prefix: String,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            class_suffix: "Builder".to_string(),
            method_name: "builder".to_string(),
            build_method: "build".to_string(),
            setter_prefix: String::new(),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = EngineConfig::from_toml_str("").unwrap();

        assert_eq!(cfg, EngineConfig::default());
        assert!(cfg.accessors.boolean_prefix);
        assert_eq!(cfg.builder.class_suffix, "Builder");
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let cfg = EngineConfig::from_toml_str(
            r#"
            [accessors]
            fluent = true

            [builder]
            setter_prefix = "with"
            "#,
        )
        .unwrap();

        assert!(cfg.accessors.fluent);
        assert!(cfg.accessors.chains());
        assert!(cfg.accessors.boolean_prefix);
        assert_eq!(cfg.builder.setter_prefix, "with");
        assert_eq!(cfg.builder.build_method, "build");
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = EngineConfig::from_toml_str("[accessors\nfluent = 1").unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EngineConfig::load("/nonexistent/stencil.toml").unwrap_err();

        assert!(err.to_string().contains("/nonexistent/stencil.toml"));
    }
}
