use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// Categories seeded into a fresh database.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "food",
    "transport",
    "entertainment",
    "household",
    "health",
    "other",
];

static NAME_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9 &/_-]{0,39}$").ok());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
}

impl Category {
    /// Trim and lower-case a user-supplied category name, rejecting anything
    /// that can't be stored as a category.
    pub fn normalize_name(raw: &str) -> Result<String> {
        let name = raw.trim().to_lowercase();
        if name.is_empty() {
            return Err(Error::validation("Category must not be empty"));
        }
        let valid = NAME_PATTERN
            .as_ref()
            .is_some_and(|re| re.is_match(&name));
        if !valid {
            return Err(Error::validation(format!(
                "Invalid category '{}': use up to 40 letters, digits, spaces or & / _ -",
                raw.trim()
            )));
        }
        Ok(name)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
