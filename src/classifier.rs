//! Classification strategies.
//!
//! The engine only talks to the [`Classifier`] trait, so sorting by something
//! other than extension means adding a new implementation, not changing the
//! engine. [`ExtensionClassifier`] is the one that ships.
//!
//! # Examples
//!
//! ```
//! use tidyup::classifier::{Classifier, ExtensionClassifier};
//!
//! let classifier = ExtensionClassifier::default();
//! assert_eq!(classifier.classify("song.mp3").category, "Audio");
//! assert_eq!(classifier.classify("weird.xxx").category, "Other");
//! assert!(!classifier.classify(".bashrc").known_extension);
//! ```

use crate::category::{CategorySet, ExtensionLookup};

/// Where a file belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'a> {
    /// Name of the category directory.
    pub category: &'a str,
    /// False when the file fell through to the unknown-extension category.
    pub known_extension: bool,
}

/// A way of assigning root entries to category directories.
pub trait Classifier {
    /// The full scaffold, catch-all categories included.
    fn categories(&self) -> &CategorySet;

    /// Classifies a file by its base name.
    fn classify(&self, file_name: &str) -> Classification<'_>;

    /// Category that receives whole directories.
    fn directory_category(&self) -> &str {
        self.categories().directory_category()
    }

    /// Whether `name` is one of the scaffold directories.
    fn is_scaffold(&self, name: &str) -> bool {
        self.categories().contains(name)
    }
}

/// Sorts files by the suffix after the last dot in their name.
#[derive(Debug, Clone)]
pub struct ExtensionClassifier {
    set: CategorySet,
    lookup: ExtensionLookup,
}

impl ExtensionClassifier {
    pub fn new(set: CategorySet) -> Self {
        let lookup = set.lookup();
        Self { set, lookup }
    }

    pub fn lookup(&self) -> &ExtensionLookup {
        &self.lookup
    }
}

impl Default for ExtensionClassifier {
    fn default() -> Self {
        Self::new(CategorySet::default())
    }
}

impl Classifier for ExtensionClassifier {
    fn categories(&self) -> &CategorySet {
        &self.set
    }

    fn classify(&self, file_name: &str) -> Classification<'_> {
        match self.lookup.get(extension_of(file_name)) {
            Some(category) => Classification {
                category: &category.name,
                known_extension: true,
            },
            None => Classification {
                category: self.set.unknown_category(),
                known_extension: false,
            },
        }
    }
}

/// Returns the text after the last `.` in `file_name`.
///
/// Names without a dot, and dotfiles whose only dot is the leading one, have
/// no extension.
///
/// ```
/// use tidyup::classifier::extension_of;
///
/// assert_eq!(extension_of("archive.tar.gz"), "gz");
/// assert_eq!(extension_of("Makefile"), "");
/// assert_eq!(extension_of(".bashrc"), "");
/// assert_eq!(extension_of(".config.toml"), "toml");
/// ```
pub fn extension_of(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => "",
        Some(dot) => &file_name[dot + 1..],
    }
}
