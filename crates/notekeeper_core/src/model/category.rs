//! List category filter key.

use crate::model::note::Note;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Sidebar category applied locally on top of the fetched collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Every note.
    #[default]
    All,
    /// Only notes with `starred == true`.
    Starred,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Starred => "starred",
        }
    }

    /// Returns whether `note` passes this category.
    pub fn admits(self, note: &Note) -> bool {
        match self {
            Self::All => true,
            Self::Starred => note.is_starred(),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown category name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError(pub String);

impl Display for ParseCategoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown category `{}`; expected all|starred", self.0)
    }
}

impl Error for ParseCategoryError {}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "starred" => Ok(Self::Starred),
            other => Err(ParseCategoryError(other.to_string())),
        }
    }
}
