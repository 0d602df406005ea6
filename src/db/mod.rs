use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::artist::Artist;
pub use repositories::note::{NewNote, Note};
pub use repositories::show::ShowDetail;
pub use repositories::user::User;
pub use repositories::venue::{NewVenue, Venue};

/// Catalog store shared by the ingestion passes and the web layer.
///
/// Every write is a single autocommitted statement.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
        if !path_str.starts_with(":memory:") {
            if let Some(parent) = Path::new(path_str).parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn artist_repo(&self) -> repositories::artist::ArtistRepository {
        repositories::artist::ArtistRepository::new(self.conn.clone())
    }

    fn venue_repo(&self) -> repositories::venue::VenueRepository {
        repositories::venue::VenueRepository::new(self.conn.clone())
    }

    fn show_repo(&self) -> repositories::show::ShowRepository {
        repositories::show::ShowRepository::new(self.conn.clone())
    }

    fn note_repo(&self) -> repositories::note::NoteRepository {
        repositories::note::NoteRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn profile_repo(&self) -> repositories::profile::ProfileRepository {
        repositories::profile::ProfileRepository::new(self.conn.clone())
    }

    // Artists

    pub async fn create_artist(&self, name: &str) -> Result<i32> {
        self.artist_repo().create(name).await
    }

    pub async fn get_artist(&self, id: i32) -> Result<Option<Artist>> {
        self.artist_repo().get(id).await
    }

    pub async fn get_artist_by_name(&self, name: &str) -> Result<Option<Artist>> {
        self.artist_repo().get_by_name(name).await
    }

    pub async fn list_artists(&self) -> Result<Vec<Artist>> {
        self.artist_repo().list().await
    }

    pub async fn count_artists_named(&self, name: &str) -> Result<u64> {
        self.artist_repo().count_by_name(name).await
    }

    // Venues

    pub async fn create_venue(&self, venue: &NewVenue) -> Result<i32> {
        self.venue_repo().create(venue).await
    }

    pub async fn get_venue(&self, id: i32) -> Result<Option<Venue>> {
        self.venue_repo().get(id).await
    }

    pub async fn get_venue_by_name(&self, name: &str) -> Result<Option<Venue>> {
        self.venue_repo().get_by_name(name).await
    }

    pub async fn list_venues(&self) -> Result<Vec<Venue>> {
        self.venue_repo().list().await
    }

    // Shows

    pub async fn create_show(
        &self,
        artist_id: i32,
        venue_id: i32,
        show_date: DateTime<Utc>,
    ) -> Result<i32> {
        self.show_repo().create(artist_id, venue_id, show_date).await
    }

    pub async fn show_exists(&self, id: i32) -> Result<bool> {
        self.show_repo().exists(id).await
    }

    pub async fn get_show(&self, id: i32) -> Result<Option<ShowDetail>> {
        self.show_repo().get_detail(id).await
    }

    pub async fn shows_for_artist(&self, artist_id: i32) -> Result<Vec<ShowDetail>> {
        self.show_repo().for_artist(artist_id).await
    }

    pub async fn shows_for_venue(&self, venue_id: i32) -> Result<Vec<ShowDetail>> {
        self.show_repo().for_venue(venue_id).await
    }

    pub async fn count_shows(&self) -> Result<u64> {
        self.show_repo().count().await
    }

    // Notes

    pub async fn create_note(&self, note: NewNote) -> Result<i32> {
        self.note_repo().create(note).await
    }

    pub async fn get_note(&self, id: i32) -> Result<Option<Note>> {
        self.note_repo().get(id).await
    }

    pub async fn latest_notes(&self) -> Result<Vec<Note>> {
        self.note_repo().latest().await
    }

    pub async fn notes_for_show(&self, show_id: i32) -> Result<Vec<Note>> {
        self.note_repo().for_show(show_id).await
    }

    pub async fn notes_for_user(&self, user_id: i32) -> Result<Vec<Note>> {
        self.note_repo().for_user(user_id).await
    }

    pub async fn update_note(
        &self,
        id: i32,
        title: &str,
        text: &str,
        rating: Option<i32>,
    ) -> Result<bool> {
        self.note_repo().update(id, title, text, rating).await
    }

    pub async fn delete_note(&self, id: i32) -> Result<bool> {
        self.note_repo().delete(id).await
    }

    // Users & profiles

    pub async fn create_user(&self, username: &str, is_admin: bool) -> Result<User> {
        self.user_repo().create(username, is_admin).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn regenerate_user_api_key(&self, username: &str) -> Result<String> {
        self.user_repo().regenerate_api_key(username).await
    }

    pub async fn get_profile_bio(&self, user_id: i32) -> Result<Option<String>> {
        self.profile_repo().get_bio(user_id).await
    }

    pub async fn set_profile_bio(&self, user_id: i32, bio: &str) -> Result<()> {
        self.profile_repo().set_bio(user_id, bio).await
    }
}
