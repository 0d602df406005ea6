//! `SeaORM` implementation of the `NoteService` trait.

use crate::api::NoteDto;
use crate::db::{NewNote, Note, Store};
use crate::domain::{NoteId, ShowId, UserId};
use crate::services::note_service::{NoteError, NoteInput, NoteService};
use tracing::info;

pub struct SeaOrmNoteService {
    store: Store,
}

impl SeaOrmNoteService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn load(&self, id: NoteId) -> Result<Note, NoteError> {
        self.store
            .get_note(id.value())
            .await?
            .ok_or(NoteError::NotFound(id))
    }

    /// Loads the note and checks that `caller` wrote it.
    async fn load_owned(&self, id: NoteId, caller: UserId) -> Result<Note, NoteError> {
        let note = self.load(id).await?;
        if note.user_id != caller.value() {
            return Err(NoteError::Forbidden(id));
        }
        Ok(note)
    }
}

#[async_trait::async_trait]
impl NoteService for SeaOrmNoteService {
    async fn latest(&self) -> Result<Vec<NoteDto>, NoteError> {
        let notes = self.store.latest_notes().await?;
        Ok(notes.into_iter().map(NoteDto::from).collect())
    }

    async fn for_show(&self, show_id: ShowId) -> Result<Vec<NoteDto>, NoteError> {
        if !self.store.show_exists(show_id.value()).await? {
            return Err(NoteError::ShowNotFound(show_id));
        }
        let notes = self.store.notes_for_show(show_id.value()).await?;
        Ok(notes.into_iter().map(NoteDto::from).collect())
    }

    async fn for_user(&self, user_id: UserId) -> Result<Vec<NoteDto>, NoteError> {
        let notes = self.store.notes_for_user(user_id.value()).await?;
        Ok(notes.into_iter().map(NoteDto::from).collect())
    }

    async fn get_owned(&self, id: NoteId, caller: UserId) -> Result<NoteDto, NoteError> {
        self.load_owned(id, caller).await.map(NoteDto::from)
    }

    async fn create(
        &self,
        show_id: ShowId,
        caller: UserId,
        input: NoteInput,
    ) -> Result<NoteDto, NoteError> {
        let input = input.validated()?;

        if !self.store.show_exists(show_id.value()).await? {
            return Err(NoteError::ShowNotFound(show_id));
        }

        let id = self
            .store
            .create_note(NewNote {
                show_id: show_id.value(),
                user_id: caller.value(),
                title: input.title,
                text: input.text,
                rating: input.rating,
                posted_date: chrono::Utc::now().date_naive(),
            })
            .await?;

        info!(note_id = id, show_id = %show_id, user_id = %caller, "Note created");
        self.load(NoteId::new(id)).await.map(NoteDto::from)
    }

    async fn update(
        &self,
        id: NoteId,
        caller: UserId,
        input: NoteInput,
    ) -> Result<NoteDto, NoteError> {
        let input = input.validated()?;
        self.load_owned(id, caller).await?;

        let updated = self
            .store
            .update_note(id.value(), &input.title, &input.text, input.rating)
            .await?;
        if !updated {
            return Err(NoteError::NotFound(id));
        }

        self.load(id).await.map(NoteDto::from)
    }

    async fn delete(&self, id: NoteId, caller: UserId) -> Result<(), NoteError> {
        self.load_owned(id, caller).await?;

        if !self.store.delete_note(id.value()).await? {
            return Err(NoteError::NotFound(id));
        }

        info!(note_id = %id, user_id = %caller, "Note deleted");
        Ok(())
    }
}
