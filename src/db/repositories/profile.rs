use crate::entities::{prelude::*, profiles};
use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

pub struct ProfileRepository {
    conn: DatabaseConnection,
}

impl ProfileRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_bio(&self, user_id: i32) -> Result<Option<String>> {
        let row = Profiles::find()
            .filter(profiles::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query profile")?;

        Ok(row.map(|p| p.bio))
    }

    /// Creates the profile row on first write.
    pub async fn set_bio(&self, user_id: i32, bio: &str) -> Result<()> {
        let existing = Profiles::find()
            .filter(profiles::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query profile")?;

        if let Some(profile) = existing {
            let mut active: profiles::ActiveModel = profile.into();
            active.bio = Set(bio.to_string());
            active.update(&self.conn).await?;
        } else {
            let active = profiles::ActiveModel {
                user_id: Set(user_id),
                bio: Set(bio.to_string()),
                ..Default::default()
            };
            Profiles::insert(active).exec(&self.conn).await?;
        }

        Ok(())
    }
}
