use crate::entities::{prelude::*, shows};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use std::collections::HashMap;

use super::artist::{Artist, ArtistRepository};
use super::venue::{Venue, VenueRepository};

/// A show with its artist and venue resolved.
#[derive(Debug, Clone, Serialize)]
pub struct ShowDetail {
    pub id: i32,
    pub show_date: DateTime<Utc>,
    pub artist: Artist,
    pub venue: Venue,
}

pub struct ShowRepository {
    conn: DatabaseConnection,
}

impl ShowRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        artist_id: i32,
        venue_id: i32,
        show_date: DateTime<Utc>,
    ) -> Result<i32> {
        let active_model = shows::ActiveModel {
            show_date: Set(show_date),
            artist_id: Set(artist_id),
            venue_id: Set(venue_id),
            ..Default::default()
        };

        let res = Shows::insert(active_model)
            .exec(&self.conn)
            .await
            .context("Failed to insert show")?;

        Ok(res.last_insert_id)
    }

    pub async fn exists(&self, id: i32) -> Result<bool> {
        let count = Shows::find()
            .filter(shows::Column::Id.eq(id))
            .count(&self.conn)
            .await?;
        Ok(count > 0)
    }

    pub async fn get_detail(&self, id: i32) -> Result<Option<ShowDetail>> {
        let mut details = self
            .details_where(Condition::all().add(shows::Column::Id.eq(id)))
            .await?;
        Ok(details.pop())
    }

    /// Shows played by an artist, newest first.
    pub async fn for_artist(&self, artist_id: i32) -> Result<Vec<ShowDetail>> {
        self.details_where(Condition::all().add(shows::Column::ArtistId.eq(artist_id)))
            .await
    }

    /// Shows hosted by a venue, newest first.
    pub async fn for_venue(&self, venue_id: i32) -> Result<Vec<ShowDetail>> {
        self.details_where(Condition::all().add(shows::Column::VenueId.eq(venue_id)))
            .await
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Shows::find().count(&self.conn).await?)
    }

    async fn details_where(&self, condition: Condition) -> Result<Vec<ShowDetail>> {
        let rows = Shows::find()
            .filter(condition)
            .order_by_desc(shows::Column::ShowDate)
            .order_by_desc(shows::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query shows")?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let artist_ids: Vec<i32> = rows.iter().map(|r| r.artist_id).collect();
        let venue_ids: Vec<i32> = rows.iter().map(|r| r.venue_id).collect();

        let artist_repo = ArtistRepository::new(self.conn.clone());
        let venue_repo = VenueRepository::new(self.conn.clone());
        let (artists, venues) = tokio::try_join!(
            artist_repo.get_by_ids(&artist_ids),
            venue_repo.get_by_ids(&venue_ids),
        )?;

        let artists: HashMap<i32, Artist> = artists.into_iter().map(|a| (a.id, a)).collect();
        let venues: HashMap<i32, Venue> = venues.into_iter().map(|v| (v.id, v)).collect();

        // Foreign keys cascade, so a dangling reference is skipped rather than reported.
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                Some(ShowDetail {
                    id: row.id,
                    show_date: row.show_date,
                    artist: artists.get(&row.artist_id)?.clone(),
                    venue: venues.get(&row.venue_id)?.clone(),
                })
            })
            .collect())
    }
}
