use crate::entities::{prelude::*, venues};
use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, sea_query::Expr,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Venue {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: Option<String>,
    pub thumbnail: Option<String>,
}

impl From<venues::Model> for Venue {
    fn from(model: venues::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            city: model.city,
            state: model.state,
            address: model.address,
            thumbnail: model.thumbnail,
        }
    }
}

/// Fields for a venue that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVenue {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: Option<String>,
    pub thumbnail: Option<String>,
}

pub struct VenueRepository {
    conn: DatabaseConnection,
}

impl VenueRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, venue: &NewVenue) -> Result<i32> {
        let active_model = venues::ActiveModel {
            name: Set(venue.name.clone()),
            city: Set(venue.city.clone()),
            state: Set(venue.state.clone()),
            address: Set(venue.address.clone()),
            thumbnail: Set(venue.thumbnail.clone()),
            ..Default::default()
        };

        let res = Venues::insert(active_model)
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to insert venue '{}'", venue.name))?;

        Ok(res.last_insert_id)
    }

    pub async fn get(&self, id: i32) -> Result<Option<Venue>> {
        let row = Venues::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query venue by ID")?;

        Ok(row.map(Venue::from))
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Venue>> {
        let row = Venues::find()
            .filter(venues::Column::Name.eq(name))
            .one(&self.conn)
            .await
            .context("Failed to query venue by name")?;

        Ok(row.map(Venue::from))
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<Venue>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = Venues::find()
            .filter(venues::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Venue::from).collect())
    }

    pub async fn list(&self) -> Result<Vec<Venue>> {
        let rows = Venues::find()
            .order_by_asc(Expr::cust("name COLLATE NOCASE"))
            .all(&self.conn)
            .await
            .context("Failed to list venues")?;

        Ok(rows.into_iter().map(Venue::from).collect())
    }
}
