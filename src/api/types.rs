use serde::{Deserialize, Serialize};

use crate::db::{Artist, Note, ShowDetail, User, Venue};
use crate::domain::StarRating;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArtistDto {
    pub id: i32,
    pub name: String,
}

impl From<Artist> for ArtistDto {
    fn from(artist: Artist) -> Self {
        Self {
            id: artist.id,
            name: artist.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VenueDto {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: Option<String>,
    pub thumbnail: Option<String>,
}

impl From<Venue> for VenueDto {
    fn from(venue: Venue) -> Self {
        Self {
            id: venue.id,
            name: venue.name,
            city: venue.city,
            state: venue.state,
            address: venue.address,
            thumbnail: venue.thumbnail,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShowDto {
    pub id: i32,
    /// RFC 3339, UTC.
    pub show_date: String,
    pub artist: ArtistDto,
    pub venue: VenueDto,
}

impl From<ShowDetail> for ShowDto {
    fn from(show: ShowDetail) -> Self {
        Self {
            id: show.id,
            show_date: show.show_date.to_rfc3339(),
            artist: show.artist.into(),
            venue: show.venue.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NoteDto {
    pub id: i32,
    pub show_id: i32,
    pub user_id: i32,
    pub title: String,
    pub text: String,
    pub rating: Option<i32>,
    /// Rating rendered as star glyphs.
    pub stars: Option<String>,
    pub posted_date: String,
    pub updated_at: Option<String>,
}

impl From<Note> for NoteDto {
    fn from(note: Note) -> Self {
        let stars = note.rating.and_then(StarRating::new).map(|r| r.stars());
        Self {
            id: note.id,
            show_id: note.show_id,
            user_id: note.user_id,
            title: note.title,
            text: note.text,
            rating: note.rating,
            stars,
            posted_date: note.posted_date.format("%Y-%m-%d").to_string(),
            updated_at: note.updated_at,
        }
    }
}

/// Public view of a user.
#[derive(Debug, Serialize)]
pub struct UserProfileDto {
    pub id: i32,
    pub username: String,
    pub bio: Option<String>,
    pub notes: Vec<NoteDto>,
}

/// The caller's own account.
#[derive(Debug, Serialize)]
pub struct MeDto {
    pub id: i32,
    pub username: String,
    pub is_admin: bool,
    pub created_at: String,
    pub bio: Option<String>,
}

impl MeDto {
    #[must_use]
    pub fn new(user: User, bio: Option<String>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            is_admin: user.is_admin,
            created_at: user.created_at,
            bio,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub bio: String,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub database_ok: bool,
    pub artists: usize,
    pub venues: usize,
    pub shows: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn note_dto_renders_stars_and_date() {
        let note = Note {
            id: 1,
            show_id: 2,
            user_id: 3,
            title: "Great".to_string(),
            text: "Loud".to_string(),
            rating: Some(4),
            posted_date: NaiveDate::from_ymd_opt(2017, 2, 2).unwrap(),
            updated_at: None,
        };
        let dto = NoteDto::from(note);
        assert_eq!(dto.stars.as_deref(), Some("★★★★"));
        assert_eq!(dto.posted_date, "2017-02-02");
    }

    #[test]
    fn error_response_omits_data() {
        let json = serde_json::to_value(ApiResponse::<()>::error("nope")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "nope");
        assert!(json.get("data").is_none());
    }
}
