use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which trigger syntaxes a reader installs on top of the baseline table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Extensions {
    pub vector: bool,
    pub hash_map: bool,
    pub fixed_map: bool,
    pub lambda: bool,
    pub caret_lambda: bool,
    pub raw_string: bool,
    pub path: bool,
}

impl Default for Extensions {
    fn default() -> Self {
        Self {
            vector: true,
            hash_map: true,
            fixed_map: true,
            lambda: true,
            caret_lambda: true,
            raw_string: true,
            path: true,
        }
    }
}

impl Extensions {
    pub fn none() -> Self {
        Self {
            vector: false,
            hash_map: false,
            fixed_map: false,
            lambda: false,
            caret_lambda: false,
            raw_string: false,
            path: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    pub extensions: Extensions,
}

impl ReaderOptions {
    pub fn with_source_name(mut self, name: Option<String>) -> Self {
        self.source_name = name;
        self
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }
}

pub fn load_options_str(text: &str) -> Result<ReaderOptions, ConfigError> {
    Ok(toml::from_str(text)?)
}

pub fn load_options_file(path: &Path) -> Result<ReaderOptions, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_options_str(&text)
}

pub fn render_options(options: &ReaderOptions) -> Result<String, ConfigError> {
    Ok(toml::to_string(options)?)
}
