//! Bundle identity and descriptor types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// Unique, stable, human-readable bundle identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BundleId(String);

impl<'de> Deserialize<'de> for BundleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl BundleId {
    /// Create a validated bundle id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidId`] if the id is empty or contains
    /// anything other than lowercase ASCII letters, digits, `-` or `_`.
    pub fn new(id: impl Into<String>) -> CatalogResult<Self> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> CatalogResult<()> {
        if id.is_empty() {
            return Err(CatalogError::InvalidId {
                id: id.to_owned(),
                reason: "bundle id must not be empty".into(),
            });
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(CatalogError::InvalidId {
                id: id.to_owned(),
                reason: "only lowercase alphanumeric characters, '-' and '_' are allowed".into(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BundleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for BundleId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for BundleId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// The fixed set of catalog categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Games and quizzes.
    #[default]
    Game,
    /// Planning and organisation tools.
    Productivity,
    /// Drawing and free-form boards.
    Creative,
}

impl Category {
    /// Human-readable label shown next to a bundle in the catalog.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Game => "Game",
            Self::Productivity => "Productivity",
            Self::Creative => "Creative",
        }
    }

    /// The lowercase tag used in configuration files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Game => "game",
            Self::Productivity => "productivity",
            Self::Creative => "creative",
        }
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "game" => Ok(Self::Game),
            "productivity" => Ok(Self::Productivity),
            "creative" => Ok(Self::Creative),
            other => Err(CatalogError::UnknownCategory(other.to_owned())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of one bundle.
///
/// `entry_path`, `style_paths` and `script_paths` are resource locations
/// relative to the host origin (e.g. `assets/funzone/Bingo/bingo.html`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleDescriptor {
    id: BundleId,
    title: String,
    description: String,
    icon: String,
    entry_path: String,
    style_paths: Vec<String>,
    script_paths: Vec<String>,
    category: Category,
}

impl BundleDescriptor {
    /// Create a descriptor with no styles, no scripts and the default category.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a valid [`BundleId`] or `entry_path`
    /// is blank.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        entry_path: impl Into<String>,
    ) -> CatalogResult<Self> {
        let id = BundleId::new(id)?;
        let entry_path = entry_path.into();
        if entry_path.trim().is_empty() {
            return Err(CatalogError::MissingEntry { id: id.0 });
        }
        Ok(Self {
            id,
            title: title.into(),
            description: String::new(),
            icon: String::new(),
            entry_path,
            style_paths: Vec::new(),
            script_paths: Vec::new(),
            category: Category::default(),
        })
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the icon name.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Append a stylesheet path.
    #[must_use]
    pub fn with_style(mut self, path: impl Into<String>) -> Self {
        self.style_paths.push(path.into());
        self
    }

    /// Append a script path.
    #[must_use]
    pub fn with_script(mut self, path: impl Into<String>) -> Self {
        self.script_paths.push(path.into());
        self
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// The bundle's unique id.
    #[must_use]
    pub fn id(&self) -> &BundleId {
        &self.id
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Short description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Icon name.
    #[must_use]
    pub fn icon(&self) -> &str {
        &self.icon
    }

    /// Location of the entry markup resource.
    #[must_use]
    pub fn entry_path(&self) -> &str {
        &self.entry_path
    }

    /// Stylesheet locations in declaration order.
    #[must_use]
    pub fn style_paths(&self) -> &[String] {
        &self.style_paths
    }

    /// Script locations in declaration order.
    #[must_use]
    pub fn script_paths(&self) -> &[String] {
        &self.script_paths
    }

    /// Catalog category.
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Parent directory of the entry path, without leading or trailing `/`.
    ///
    /// `assets/funzone/Bingo/bingo.html` yields `assets/funzone/Bingo`; an
    /// entry at the root yields an empty string.
    #[must_use]
    pub fn entry_dir(&self) -> &str {
        let trimmed = self.entry_path.trim_start_matches('/');
        match trimmed.rfind('/') {
            Some(idx) => &trimmed[..idx],
            None => "",
        }
    }
}
