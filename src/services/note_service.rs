//! Domain service for show notes.
//!
//! Reading the public lists is open to everyone; viewing a single note,
//! editing and deleting are restricted to the note's author.

use crate::api::NoteDto;
use crate::domain::{NoteId, ShowId, StarRating, UserId};
use serde::Deserialize;
use thiserror::Error;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_TEXT_CHARS: usize = 1000;

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("Note not found: {0}")]
    NotFound(NoteId),

    #[error("Show not found: {0}")]
    ShowNotFound(ShowId),

    #[error("Note {0} belongs to another user")]
    Forbidden(NoteId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for NoteError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for NoteError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Editable fields of a note.
#[derive(Debug, Clone, Deserialize)]
pub struct NoteInput {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub rating: Option<i32>,
}

impl NoteInput {
    /// Trims title and text and checks lengths and rating range.
    pub fn validated(self) -> Result<Self, NoteError> {
        let title = self.title.trim().to_string();
        let text = self.text.trim().to_string();

        if title.is_empty() {
            return Err(NoteError::Validation("Title is required".to_string()));
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(NoteError::Validation(format!(
                "Title must be {MAX_TITLE_CHARS} characters or less"
            )));
        }
        if text.is_empty() {
            return Err(NoteError::Validation("Text is required".to_string()));
        }
        if text.chars().count() > MAX_TEXT_CHARS {
            return Err(NoteError::Validation(format!(
                "Text must be {MAX_TEXT_CHARS} characters or less"
            )));
        }
        if let Some(rating) = self.rating {
            StarRating::try_from(rating).map_err(NoteError::Validation)?;
        }

        Ok(Self {
            title,
            text,
            rating: self.rating,
        })
    }
}

#[async_trait::async_trait]
pub trait NoteService: Send + Sync {
    /// All notes, most recently posted first.
    async fn latest(&self) -> Result<Vec<NoteDto>, NoteError>;

    /// Notes for one show, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::ShowNotFound`] if the show does not exist.
    async fn for_show(&self, show_id: ShowId) -> Result<Vec<NoteDto>, NoteError>;

    async fn for_user(&self, user_id: UserId) -> Result<Vec<NoteDto>, NoteError>;

    /// A single note, visible to its author only.
    ///
    /// # Errors
    ///
    /// - Returns [`NoteError::NotFound`] if the note does not exist
    /// - Returns [`NoteError::Forbidden`] if `caller` is not the author
    async fn get_owned(&self, id: NoteId, caller: UserId) -> Result<NoteDto, NoteError>;

    async fn create(
        &self,
        show_id: ShowId,
        caller: UserId,
        input: NoteInput,
    ) -> Result<NoteDto, NoteError>;

    async fn update(
        &self,
        id: NoteId,
        caller: UserId,
        input: NoteInput,
    ) -> Result<NoteDto, NoteError>;

    async fn delete(&self, id: NoteId, caller: UserId) -> Result<(), NoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, text: &str, rating: Option<i32>) -> NoteInput {
        NoteInput {
            title: title.to_string(),
            text: text.to_string(),
            rating,
        }
    }

    #[test]
    fn validation_trims_fields() {
        let ok = input("  Great  ", " loud ", Some(5)).validated().unwrap();
        assert_eq!(ok.title, "Great");
        assert_eq!(ok.text, "loud");
    }

    #[test]
    fn validation_rejects_bad_input() {
        assert!(input("", "text", None).validated().is_err());
        assert!(input("title", "   ", None).validated().is_err());
        assert!(input("title", "text", Some(6)).validated().is_err());
        assert!(input(&"t".repeat(201), "text", None).validated().is_err());
        assert!(input("title", &"x".repeat(1001), None).validated().is_err());
        assert!(input(&"t".repeat(200), "text", None).validated().is_ok());
    }

    #[test]
    fn note_error_display() {
        let err = NoteError::Forbidden(NoteId::new(2));
        assert_eq!(err.to_string(), "Note 2 belongs to another user");
    }
}
