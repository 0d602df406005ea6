use crate::entities::{notes, prelude::*};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Select, Set,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: i32,
    pub show_id: i32,
    pub user_id: i32,
    pub title: String,
    pub text: String,
    pub rating: Option<i32>,
    pub posted_date: NaiveDate,
    pub updated_at: Option<String>,
}

impl From<notes::Model> for Note {
    fn from(model: notes::Model) -> Self {
        Self {
            id: model.id,
            show_id: model.show_id,
            user_id: model.user_id,
            title: model.title,
            text: model.text,
            rating: model.rating,
            posted_date: model.posted_date,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewNote {
    pub show_id: i32,
    pub user_id: i32,
    pub title: String,
    pub text: String,
    pub rating: Option<i32>,
    pub posted_date: NaiveDate,
}

pub struct NoteRepository {
    conn: DatabaseConnection,
}

impl NoteRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn newest_first(select: Select<Notes>) -> Select<Notes> {
        select
            .order_by_desc(notes::Column::PostedDate)
            .order_by_desc(notes::Column::Id)
    }

    pub async fn create(&self, note: NewNote) -> Result<i32> {
        let active_model = notes::ActiveModel {
            show_id: Set(note.show_id),
            user_id: Set(note.user_id),
            title: Set(note.title),
            text: Set(note.text),
            rating: Set(note.rating),
            posted_date: Set(note.posted_date),
            updated_at: Set(None),
            ..Default::default()
        };

        let res = Notes::insert(active_model)
            .exec(&self.conn)
            .await
            .context("Failed to insert note")?;

        Ok(res.last_insert_id)
    }

    pub async fn get(&self, id: i32) -> Result<Option<Note>> {
        let row = Notes::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query note by ID")?;

        Ok(row.map(Note::from))
    }

    pub async fn latest(&self) -> Result<Vec<Note>> {
        let rows = Self::newest_first(Notes::find())
            .all(&self.conn)
            .await
            .context("Failed to list notes")?;

        Ok(rows.into_iter().map(Note::from).collect())
    }

    pub async fn for_show(&self, show_id: i32) -> Result<Vec<Note>> {
        let rows = Self::newest_first(Notes::find().filter(notes::Column::ShowId.eq(show_id)))
            .all(&self.conn)
            .await
            .context("Failed to list notes for show")?;

        Ok(rows.into_iter().map(Note::from).collect())
    }

    pub async fn for_user(&self, user_id: i32) -> Result<Vec<Note>> {
        let rows = Self::newest_first(Notes::find().filter(notes::Column::UserId.eq(user_id)))
            .all(&self.conn)
            .await
            .context("Failed to list notes for user")?;

        Ok(rows.into_iter().map(Note::from).collect())
    }

    /// Returns `false` when the note does not exist.
    pub async fn update(
        &self,
        id: i32,
        title: &str,
        text: &str,
        rating: Option<i32>,
    ) -> Result<bool> {
        let Some(existing) = Notes::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        let mut active: notes::ActiveModel = existing.into();
        active.title = Set(title.to_string());
        active.text = Set(text.to_string());
        active.rating = Set(rating);
        active.updated_at = Set(Some(chrono::Utc::now().to_rfc3339()));
        active.update(&self.conn).await?;

        Ok(true)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Notes::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
