//! core::config
//!
//! Configuration schema, loading and persistence.
//!
//! # Overview
//!
//! The library keeps one TOML file describing every kind and module
//! (see [`schema`]). A command loads it once, hands `&mut` access to the
//! engine, and writes it back once after the operation succeeds. Failed
//! operations never write.
//!
//! # Example
//!
//! ```no_run
//! use librarian::core::config::Config;
//! use librarian::core::paths::LibraryPaths;
//!
//! let paths = LibraryPaths::discover().unwrap();
//! let mut config = Config::load(&paths).unwrap();
//! for (name, module) in config.library.modules_of_kind(Some("love")) {
//!     println!("{} from {}", name, module.url);
//! }
//! config.save().unwrap();
//! ```

pub mod schema;

pub use schema::{KindConfig, LibraryConfig, ModuleRecord, Registration};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::core::paths::LibraryPaths;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// The library configuration together with where it came from.
#[derive(Debug, Clone)]
pub struct Config {
    /// Kinds and modules
    pub library: LibraryConfig,
    /// Path the configuration is read from and written to
    path: PathBuf,
}

impl Config {
    /// Load the configuration for a library.
    ///
    /// A missing file is not an error; an empty configuration is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed or
    /// validated.
    pub fn load(paths: &LibraryPaths) -> Result<Self, ConfigError> {
        let path = paths.config_path();
        let library = if path.exists() {
            Self::read_library_config(&path)?
        } else {
            debug!(path = %path.display(), "no config file, starting empty");
            LibraryConfig::default()
        };
        library.validate()?;

        Ok(Self { library, path })
    }

    /// Path the configuration is written to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate and persist the configuration atomically.
    pub fn save(&self) -> Result<&Path, ConfigError> {
        self.library.validate()?;
        write_config_atomic(&self.path, &self.library)?;
        debug!(path = %self.path.display(), "config written");
        Ok(&self.path)
    }

    fn read_library_config(path: &Path) -> Result<LibraryConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Write a config file atomically.
///
/// Creates parent directories if needed, writes to a temp file in the same
/// directory and renames it over the target.
fn write_config_atomic<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let contents =
        toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

    let temp_path = path.with_extension("toml.tmp");
    let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
        path: temp_path.clone(),
        source: e,
    })?;

    file.write_all(contents.as_bytes())
        .map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

    file.sync_all().map_err(|e| ConfigError::WriteError {
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
