//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Library Config
//!
//! Located at `<library root>/config.toml`:
//!
//! ```toml
//! [kinds.love]
//! lib_path = "src/lib/"
//! include_pattern = '.*\.lua|LICENSE.*|README.*'
//! exclude_pattern = 'main\.lua|demos?|example.*|tests?|spec'
//! root_marker = "init.lua"
//! rename_pattern = '.*\.lua'
//!
//! [modules.windfield]
//! kind = "love"
//! clone = "/home/me/.librarian/clones/windfield"
//! url = "https://github.com/adnzzzzZ/windfield.git"
//! renamed_root_marker = "windfield.lua"
//! ```
//!
//! # Validation
//!
//! Config values are validated after parsing: every pattern must compile
//! and every module must belong to a registered kind.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::filter::{InclusionFilter, Pattern};
use crate::core::types::ModuleName;

/// Outcome of registering a kind or module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration<T> {
    /// No record existed; one was created.
    Created,
    /// A record already existed. Carries the record as it was before the call.
    Existing(T),
}

impl<T> Registration<T> {
    /// Check if a new record was created.
    pub fn is_created(&self) -> bool {
        matches!(self, Registration::Created)
    }
}

/// A category of project and how modules are vendored into it.
///
/// Empty or absent patterns mean "accept all".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct KindConfig {
    /// Destination sub-path inside a project (e.g. `src/lib/`)
    pub lib_path: Option<String>,

    /// Full-match regex over file names to include
    pub include_pattern: Option<String>,

    /// Full-match regex over names to exclude; beats include
    pub exclude_pattern: Option<String>,

    /// File whose presence marks a module's true root
    pub root_marker: Option<String>,

    /// Full-match regex selecting a lone file to rename to the root marker
    pub rename_pattern: Option<String>,
}

impl KindConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a pattern does not compile or
    /// a rename pattern is configured without a root marker to rename to.
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        InclusionFilter::for_kind(self)
            .map_err(|e| ConfigError::InvalidValue(format!("kind '{}': {}", name, e)))?;
        Pattern::optional(self.rename_pattern.as_deref(), "rename")
            .map_err(|e| ConfigError::InvalidValue(format!("kind '{}': {}", name, e)))?;

        if self.rename_pattern().is_some() && self.root_marker().is_none() {
            return Err(ConfigError::InvalidValue(format!(
                "kind '{}': a rename pattern needs a root marker to rename to",
                name
            )));
        }

        Ok(())
    }

    /// Destination sub-path, empty when unset.
    pub fn lib_path(&self) -> &str {
        self.lib_path.as_deref().unwrap_or("")
    }

    /// Root marker file name, if configured.
    pub fn root_marker(&self) -> Option<&str> {
        self.root_marker.as_deref().filter(|s| !s.is_empty())
    }

    /// Single-file rename pattern, if configured.
    pub fn rename_pattern(&self) -> Option<&str> {
        self.rename_pattern.as_deref().filter(|s| !s.is_empty())
    }
}

/// A module registered in the library.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ModuleRecord {
    /// Owning kind
    pub kind: String,

    /// Location of the library clone
    pub clone: PathBuf,

    /// Upstream clone URL
    pub url: String,

    /// Original file name before single-file normalization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renamed_root_marker: Option<String>,
}

/// Everything the library persists.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LibraryConfig {
    /// Kinds by name
    pub kinds: BTreeMap<String, KindConfig>,

    /// Modules by name
    pub modules: BTreeMap<String, ModuleRecord>,
}

impl LibraryConfig {
    /// Validate every kind and module.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, kind) in &self.kinds {
            kind.validate(name)?;
        }
        for (name, module) in &self.modules {
            ModuleName::new(name.as_str())
                .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
            if !self.kinds.contains_key(&module.kind) {
                return Err(ConfigError::InvalidValue(format!(
                    "module '{}' belongs to unknown kind '{}'",
                    name, module.kind
                )));
            }
        }
        Ok(())
    }

    /// Look up a kind.
    pub fn kind(&self, name: &str) -> Option<&KindConfig> {
        self.kinds.get(name)
    }

    /// Look up a module.
    pub fn module(&self, name: &ModuleName) -> Option<&ModuleRecord> {
        self.modules.get(name.as_str())
    }

    /// Look up a module for modification.
    pub fn module_mut(&mut self, name: &ModuleName) -> Option<&mut ModuleRecord> {
        self.modules.get_mut(name.as_str())
    }

    /// Create or replace a kind.
    ///
    /// Returns the previous record when one existed.
    pub fn register_kind(&mut self, name: &str, kind: KindConfig) -> Registration<KindConfig> {
        match self.kinds.insert(name.to_string(), kind) {
            Some(previous) => Registration::Existing(previous),
            None => Registration::Created,
        }
    }

    /// Create a module record unless one already exists.
    ///
    /// An existing record is left untouched and returned.
    pub fn register_module(
        &mut self,
        name: &ModuleName,
        record: ModuleRecord,
    ) -> Registration<ModuleRecord> {
        match self.modules.get(name.as_str()) {
            Some(existing) => Registration::Existing(existing.clone()),
            None => {
                self.modules.insert(name.to_string(), record);
                Registration::Created
            }
        }
    }

    /// Modules in name order, optionally restricted to one kind.
    pub fn modules_of_kind<'a>(
        &'a self,
        kind: Option<&'a str>,
    ) -> impl Iterator<Item = (&'a String, &'a ModuleRecord)> + 'a {
        self.modules
            .iter()
            .filter(move |(_, m)| kind.map_or(true, |k| m.kind == k))
    }
}
