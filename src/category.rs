//! Categories and the extension lookup table built from them.
//!
//! A [`CategorySet`] is the ordered list of category directories that make up
//! the scaffold, including the two catch-all categories: one that receives
//! relocated directories and one that receives files with no recognized
//! extension.
//!
//! # Examples
//!
//! ```
//! use tidyup::category::CategorySet;
//!
//! let set = CategorySet::default();
//! let lookup = set.lookup();
//! assert_eq!(lookup.get("pdf").map(|c| c.name.as_str()), Some("PDFs"));
//! assert!(lookup.get("").is_none());
//! ```

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Default name of the category that receives relocated directories.
pub const DIRECTORY_CATEGORY: &str = "Directories";
/// Default name of the category that receives unrecognized files.
pub const UNKNOWN_CATEGORY: &str = "Other";

/// A named bucket of file extensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// Extensions without a leading dot.
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl Category {
    pub fn new(name: impl Into<String>, extensions: &[&str]) -> Self {
        Self {
            name: name.into(),
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

/// Ordered, validated set of categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    categories: Vec<Category>,
    directory_category: String,
    unknown_category: String,
}

impl CategorySet {
    /// Builds a set from `categories`, appending the catch-all categories if
    /// they are not already listed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidCategory` if a name is empty, contains a
    /// path separator, is `.`/`..`, or appears twice.
    pub fn new(
        categories: Vec<Category>,
        directory_category: impl Into<String>,
        unknown_category: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let directory_category = directory_category.into();
        let unknown_category = unknown_category.into();
        let mut categories = categories;

        for reserved in [&directory_category, &unknown_category] {
            if !categories.iter().any(|c| &c.name == reserved) {
                categories.push(Category {
                    name: reserved.clone(),
                    extensions: Vec::new(),
                });
            }
        }

        let mut seen = HashSet::new();
        for category in &categories {
            validate_name(&category.name)?;
            if !seen.insert(category.name.as_str()) {
                return Err(ConfigError::InvalidCategory {
                    name: category.name.clone(),
                    reason: "duplicate category name".to_string(),
                });
            }
        }

        Ok(Self {
            categories,
            directory_category,
            unknown_category,
        })
    }

    /// Categories in their fixed iteration order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn directory_category(&self) -> &str {
        &self.directory_category
    }

    pub fn unknown_category(&self) -> &str {
        &self.unknown_category
    }

    /// Category names sorted lexicographically.
    pub fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.categories.iter().map(|c| c.name.clone()).collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Builds the extension lookup table for this set.
    pub fn lookup(&self) -> ExtensionLookup {
        ExtensionLookup::build(&self.categories)
    }

    /// Extensions claimed by more than one category, with every claimant in
    /// order. The last claimant is the one the lookup table resolves to.
    pub fn duplicate_extensions(&self) -> Vec<(String, Vec<String>)> {
        let mut claims: Vec<(String, Vec<String>)> = Vec::new();
        for category in &self.categories {
            for ext in category.extensions.iter().filter(|ext| !ext.is_empty()) {
                match claims.iter_mut().find(|(e, _)| e == ext) {
                    Some((_, owners)) => {
                        if !owners.contains(&category.name) {
                            owners.push(category.name.clone());
                        }
                    }
                    None => claims.push((ext.clone(), vec![category.name.clone()])),
                }
            }
        }
        claims.retain(|(_, owners)| owners.len() > 1);
        claims
    }
}

fn validate_name(name: &str) -> Result<(), ConfigError> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name == "." || name == ".." {
        "name is a relative path component"
    } else if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
        "name contains a path separator"
    } else {
        return Ok(());
    };
    Err(ConfigError::InvalidCategory {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

impl Default for CategorySet {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            directory_category: DIRECTORY_CATEGORY.to_string(),
            unknown_category: UNKNOWN_CATEGORY.to_string(),
        }
    }
}

/// Maps an extension to the category it sorts into.
///
/// Built by walking categories in order and each category's extensions in
/// order; a later claim on an extension overwrites an earlier one.
#[derive(Debug, Clone)]
pub struct ExtensionLookup {
    categories: Vec<Category>,
    index: HashMap<String, usize>,
}

impl ExtensionLookup {
    fn build(categories: &[Category]) -> Self {
        let mut index = HashMap::new();
        for (position, category) in categories.iter().enumerate() {
            for ext in &category.extensions {
                index.insert(ext.clone(), position);
            }
        }
        Self {
            categories: categories.to_vec(),
            index,
        }
    }

    /// Looks up an exact, case-sensitive extension. The empty extension is
    /// never found.
    pub fn get(&self, extension: &str) -> Option<&Category> {
        if extension.is_empty() {
            return None;
        }
        self.index.get(extension).map(|&i| &self.categories[i])
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

fn default_categories() -> Vec<Category> {
    vec![
        Category::new(
            "Audio",
            &[
                "aa", "aax", "act", "aiff", "alac", "au", "wav", "flac", "ra", "wma", "ac3", "m4b",
                "mp3", "aac", "ots",
            ],
        ),
        Category::new(
            "Code",
            &[
                "html", "js", "json", "ts", "tsx", "jsx", "go", "c", "cpp", "java", "awk", "sh",
                "zsh", "lua", "pl", "obj", "s", "sql", "py", "r", "rb", "rs", "cs", "kt", "php",
                "pm", "rkt", "rktl", "scm", "scala",
            ],
        ),
        Category::new(
            "Compressed",
            &[
                "a", "ar", "cpio", "shar", "lbr", "iso", "mar", "sbx", "tar", "br", "bz2", "f",
                "genozip", "gz", "lz", "lz4", "lzma", "lzo", "rz", "sz", "sfark", "xz", "z", "zst",
                "7z", "s7z", "ace", "afa", "alz", "apk", "arc", "ark", "cdx", "arj", "b1", "b6z",
                "ba", "bh", "cab", "car", "cfs", "cpt", "dar", "dd", "dgc", "dmg", "ear", "gca",
                "ha", "hki", "ice", "kgb", "lzh", "lha", "lzx", "pak", "partimg", "paq6", "paq7",
                "paq8", "pea", "phar", "pim", "pit", "qda", "rar", "rk", "sda", "sea", "sen",
                "sfx", "shk", "sit", "sitx", "sqx", "tgz", "tbz2", "tlz", "txz", "uc", "uc0",
                "uc2", "ucn", "ur2", "ue2", "uca", "uha", "war", "wim", "xar", "xp3", "yz1", "zip",
                "zipx", "zoo", "zpaq", "zz", "ecc", "ecsbx", "par", "par2", "rev", "?xf",
            ],
        ),
        Category::new(DIRECTORY_CATEGORY, &[]),
        Category::new(
            "Documents",
            &[
                "doc", "docx", "odt", "msg", "rtf", "tex", "txt", "wks", "wps", "wpd", "md",
            ],
        ),
        Category::new(
            "Images",
            &[
                "jpeg", "jpg", "ai", "bmp", "gif", "heif", "heic", "ico", "max", "obj", "png",
                "ps", "psd", "svg", "tif", "tiff", "3ds", "3dm", "webp",
            ],
        ),
        Category::new(UNKNOWN_CATEGORY, &[]),
        Category::new("PDFs", &["pdf"]),
        // The empty entry is inert: the lookup never matches an empty extension.
        Category::new(
            "Videos",
            &[
                "avi", "flv", "h264", "m4v", "mkv", "mov", "mp4", "mpg", "mpeg", "mpeg-1",
                "mpeg-2", "mpeg-4", "", "rm", "swf", "vob", "wmv", "3g2", "3gp",
            ],
        ),
    ]
}
