use crate::entities::{artists, prelude::*};
use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artist {
    pub id: i32,
    pub name: String,
}

impl From<artists::Model> for Artist {
    fn from(model: artists::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

pub struct ArtistRepository {
    conn: DatabaseConnection,
}

impl ArtistRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts an artist. Fails with a unique-constraint violation when the
    /// name is already present.
    pub async fn create(&self, name: &str) -> Result<i32> {
        let active_model = artists::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };

        let res = Artists::insert(active_model)
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to insert artist '{name}'"))?;

        Ok(res.last_insert_id)
    }

    pub async fn get(&self, id: i32) -> Result<Option<Artist>> {
        let row = Artists::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query artist by ID")?;

        Ok(row.map(Artist::from))
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Artist>> {
        let row = Artists::find()
            .filter(artists::Column::Name.eq(name))
            .one(&self.conn)
            .await
            .context("Failed to query artist by name")?;

        Ok(row.map(Artist::from))
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<Artist>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = Artists::find()
            .filter(artists::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Artist::from).collect())
    }

    /// All artists, alphabetically (case-insensitive).
    pub async fn list(&self) -> Result<Vec<Artist>> {
        let rows = Artists::find()
            .order_by_asc(Expr::cust("name COLLATE NOCASE"))
            .all(&self.conn)
            .await
            .context("Failed to list artists")?;

        Ok(rows.into_iter().map(Artist::from).collect())
    }

    pub async fn count_by_name(&self, name: &str) -> Result<u64> {
        let count = Artists::find()
            .filter(artists::Column::Name.eq(name))
            .count(&self.conn)
            .await?;

        Ok(count)
    }
}
