//! # Categories
//!
//! Flat course categories with URL-safe slugs. Category names arrive
//! from instructor input; slugs are derived, never supplied.

use campus_core::CategoryId;
use serde::{Deserialize, Serialize};

/// A course category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Lowercase, hyphen-separated form of the name.
    pub slug: String,
}

impl Category {
    /// Create a category, deriving the slug from the name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self {
            id: CategoryId::new(),
            name,
            slug,
        }
    }
}

/// Derive a URL-safe slug: lowercase alphanumeric runs joined by single
/// hyphens, everything else dropped.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.extend(c.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    out
}
