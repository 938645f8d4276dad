//! Configuration: category table and entry filters.
//!
//! Configuration is read from TOML. Every section is optional; an empty file
//! gives the built-in category table and a filter that only keeps the
//! configuration file itself out of the sort.
//!
//! ```toml
//! directory_category = "Directories"
//! unknown_category = "Other"
//!
//! [[category]]
//! name = "Music"
//! extensions = ["mp3", "flac"]
//!
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = [".tidyrc.toml"]
//! patterns = ["*.part"]
//! extensions = ["crdownload"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use crate::category::{Category, CategorySet, DIRECTORY_CATEGORY, UNKNOWN_CATEGORY};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory configuration file.
pub const CONFIG_FILE_NAME: &str = ".tidyrc.toml";

/// Environment variable naming a configuration file.
pub const CONFIG_ENV_VAR: &str = "TIDY_CONFIG";

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Invalid glob pattern '{0}'")]
    InvalidGlobPattern(String),

    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },

    #[error("Invalid category '{name}': {reason}")]
    InvalidCategory { name: String, reason: String },

    #[error("IO error reading configuration: {0}")]
    IoError(String),
}

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TidyConfig {
    /// Category receiving relocated directories.
    #[serde(default)]
    pub directory_category: Option<String>,

    /// Category receiving files with unknown or no extension.
    #[serde(default)]
    pub unknown_category: Option<String>,

    /// Custom category table. Empty means the built-in table.
    #[serde(default, rename = "category")]
    pub categories: Vec<Category>,

    #[serde(default)]
    pub filters: FilterRules,
}

/// Which root entries a sort should leave alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether to sort hidden entries (starting with "."). Defaults to true.
    #[serde(default = "default_enable_hidden_files")]
    pub enable_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Whitelist, checked before any exclude rule.
    #[serde(default)]
    pub include: IncludeRules,
}

fn default_enable_hidden_files() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: true,
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

/// Rules for keeping entries out of the sort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact names to exclude.
    #[serde(default = "default_excluded_filenames")]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the entry name.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions to exclude, case-insensitive.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the entry name.
    #[serde(default)]
    pub regex: Vec<String>,
}

fn default_excluded_filenames() -> Vec<String> {
    vec![CONFIG_FILE_NAME.to_string()]
}

impl Default for ExcludeRules {
    fn default() -> Self {
        Self {
            filenames: default_excluded_filenames(),
            patterns: Vec::new(),
            extensions: Vec::new(),
            regex: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl TidyConfig {
    /// Load configuration, falling back to defaults.
    ///
    /// Attempts, in order:
    /// 1. `config_path`, if provided
    /// 2. the file named by `TIDY_CONFIG`
    /// 3. `.tidyrc.toml` in the current directory
    /// 4. `~/.config/tidy/config.toml`
    /// 5. built-in defaults
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
            && !path.is_empty()
        {
            return Self::load_from_file(Path::new(&path));
        }

        let local_config = PathBuf::from(CONFIG_FILE_NAME);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("tidy")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Builds the category set described by this configuration.
    ///
    /// Extensions are normalized to lowercase without a leading dot. Every
    /// extension claimed by more than one category is logged; the later
    /// category keeps it.
    pub fn category_set(&self) -> Result<CategorySet, ConfigError> {
        let directory = self
            .directory_category
            .clone()
            .unwrap_or_else(|| DIRECTORY_CATEGORY.to_string());
        let unknown = self
            .unknown_category
            .clone()
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());

        let set = if self.categories.is_empty() {
            let defaults = CategorySet::default();
            let mut categories = defaults.categories().to_vec();
            for (default_name, name) in [
                (DIRECTORY_CATEGORY, &directory),
                (UNKNOWN_CATEGORY, &unknown),
            ] {
                if let Some(category) = categories.iter_mut().find(|c| c.name == default_name) {
                    category.name = name.clone();
                }
            }
            CategorySet::new(categories, directory, unknown)?
        } else {
            let categories = self
                .categories
                .iter()
                .map(|category| Category {
                    name: category.name.clone(),
                    extensions: category
                        .extensions
                        .iter()
                        .map(|ext| normalize_extension(ext))
                        .collect(),
                })
                .collect();
            CategorySet::new(categories, directory, unknown)?
        };

        for (ext, owners) in set.duplicate_extensions() {
            let winner = owners.last().map(String::as_str).unwrap_or_default();
            tracing::warn!(
                extension = %ext,
                categories = ?owners,
                winner = %winner,
                "extension claimed by several categories; the last one wins"
            );
        }
        Ok(set)
    }

    /// Compiles the filter rules.
    pub fn entry_filter(&self) -> Result<EntryFilter, ConfigError> {
        EntryFilter::new(&self.filters)
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Compiled filter rules deciding which root entries a sort may move.
#[derive(Debug, Clone)]
pub struct EntryFilter {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl EntryFilter {
    /// Compiles `rules`.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex pattern is invalid.
    pub fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| normalize_extension(ext))
                .collect(),
            exclude_patterns: compile_globs(&rules.exclude.patterns)?,
            exclude_regexes,
            include_patterns: compile_globs(&rules.include.patterns)?,
        })
    }

    /// A filter that lets every entry through.
    pub fn allow_all() -> Self {
        Self {
            enable_hidden_files: true,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }

    /// Whether the root entry called `name` may be moved.
    ///
    /// Checks, in order: include patterns (always wins), hidden entries,
    /// exact names, extensions, glob patterns, regexes. Anything left is
    /// included.
    pub fn should_include(&self, name: &str) -> bool {
        if self.include_patterns.iter().any(|p| p.matches(name)) {
            return true;
        }

        if !self.enable_hidden_files && name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(name) {
            return false;
        }

        if let Some(ext) = Path::new(name).extension()
            && self
                .exclude_extensions
                .contains(&ext.to_string_lossy().to_lowercase())
        {
            return false;
        }

        if self.exclude_patterns.iter().any(|p| p.matches(name)) {
            return false;
        }

        !self.exclude_regexes.iter().any(|r| r.is_match(name))
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self::allow_all()
    }
}
