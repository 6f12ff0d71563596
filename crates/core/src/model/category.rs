use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{CategoryId, SubcategoryId};

/// Longest accepted category or subcategory name, in characters.
pub const MAX_NAME_LEN: usize = 100;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CategoryError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("name is too long ({len} > {MAX_NAME_LEN} characters)")]
    NameTooLong { len: usize },
}

fn clean_name(raw: &str) -> Result<String, CategoryError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CategoryError::EmptyName);
    }
    let len = trimmed.chars().count();
    if len > MAX_NAME_LEN {
        return Err(CategoryError::NameTooLong { len });
    }
    Ok(trimmed.to_owned())
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Top-level grouping of subcategories. Names are unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    id: CategoryId,
    name: String,
}

impl Category {
    /// Build a category, trimming the name.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError` if the name is blank or longer than `MAX_NAME_LEN`.
    pub fn new(id: CategoryId, name: impl AsRef<str>) -> Result<Self, CategoryError> {
        Ok(Self {
            id,
            name: clean_name(name.as_ref())?,
        })
    }

    #[must_use]
    pub fn id(&self) -> CategoryId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Unsaved category; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
}

impl CategoryDraft {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// # Errors
    ///
    /// Returns `CategoryError` if the name is blank or too long.
    pub fn validate(self) -> Result<Self, CategoryError> {
        Ok(Self {
            name: clean_name(&self.name)?,
        })
    }
}

//
// ─── SUBCATEGORY ───────────────────────────────────────────────────────────────
//

/// A question pool inside a category. Play sessions are started per subcategory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subcategory {
    id: SubcategoryId,
    category_id: CategoryId,
    name: String,
}

impl Subcategory {
    /// # Errors
    ///
    /// Returns `CategoryError` if the name is blank or too long.
    pub fn new(
        id: SubcategoryId,
        category_id: CategoryId,
        name: impl AsRef<str>,
    ) -> Result<Self, CategoryError> {
        Ok(Self {
            id,
            category_id,
            name: clean_name(name.as_ref())?,
        })
    }

    #[must_use]
    pub fn id(&self) -> SubcategoryId {
        self.id
    }

    #[must_use]
    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubcategoryDraft {
    pub category_id: CategoryId,
    pub name: String,
}

impl SubcategoryDraft {
    #[must_use]
    pub fn new(category_id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            category_id,
            name: name.into(),
        }
    }

    /// # Errors
    ///
    /// Returns `CategoryError` if the name is blank or too long.
    pub fn validate(self) -> Result<Self, CategoryError> {
        Ok(Self {
            category_id: self.category_id,
            name: clean_name(&self.name)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed() {
        let category = Category::new(CategoryId::new(1), "  Physics ").unwrap();
        assert_eq!(category.name(), "Physics");
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = CategoryDraft::new("   ").validate().unwrap_err();
        assert_eq!(err, CategoryError::EmptyName);
    }

    #[test]
    fn long_name_is_rejected() {
        let name = "x".repeat(MAX_NAME_LEN + 1);
        let err = SubcategoryDraft::new(CategoryId::new(1), name)
            .validate()
            .unwrap_err();
        assert_eq!(err, CategoryError::NameTooLong { len: MAX_NAME_LEN + 1 });
    }

    #[test]
    fn name_limit_counts_characters_not_bytes() {
        let name = "é".repeat(MAX_NAME_LEN);
        assert!(Subcategory::new(SubcategoryId::new(1), CategoryId::new(1), name).is_ok());
    }
}
