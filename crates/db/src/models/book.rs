//! Book entity model and DTOs.

use bookshelf_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A book row from the `books` table.
///
/// The publication timestamp travels as `publisher` in JSON; `published_at`
/// is accepted on input as well.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Book {
    pub id: DbId,
    pub name: String,
    pub author: String,
    #[serde(rename = "publisher", alias = "published_at")]
    pub published_at: Timestamp,
    pub rating: i32,
}

/// DTO for creating a new book.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBook {
    pub name: String,
    pub author: String,
    /// Defaults to the insertion time if omitted.
    #[serde(default, rename = "publisher", alias = "published_at")]
    pub published_at: Option<Timestamp>,
    #[serde(default)]
    pub rating: i32,
}

/// Sparse patch for an existing book. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBook {
    pub name: Option<String>,
    pub author: Option<String>,
    #[serde(rename = "publisher", alias = "published_at")]
    pub published_at: Option<Timestamp>,
    pub rating: Option<i32>,
}

impl UpdateBook {
    /// `true` when no field is present.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.author.is_none()
            && self.published_at.is_none()
            && self.rating.is_none()
    }

    /// Apply the present fields to `book` in place.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(name) = &self.name {
            book.name.clone_from(name);
        }
        if let Some(author) = &self.author {
            book.author.clone_from(author);
        }
        if let Some(published_at) = self.published_at {
            book.published_at = published_at;
        }
        if let Some(rating) = self.rating {
            book.rating = rating;
        }
    }
}
