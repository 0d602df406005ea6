//! Domain primitives for the concert catalog.
//!
//! Newtype ids keep a note id from being passed where a show id is expected,
//! and [`StarRating`] carries the 1-5 bound for note ratings.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn value(&self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self::new(id)
            }
        }
    };
}

entity_id!(
    /// Primary key of an `artists` row.
    ArtistId
);
entity_id!(
    /// Primary key of a `venues` row.
    VenueId
);
entity_id!(
    /// Primary key of a `shows` row.
    ShowId
);
entity_id!(
    /// Primary key of a `notes` row.
    NoteId
);
entity_id!(
    /// Primary key of a `users` row.
    UserId
);

/// A one-to-five star rating attached to a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct StarRating(u8);

impl StarRating {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 5;

    /// Returns `None` when `value` is outside `1..=5`.
    #[must_use]
    pub fn new(value: i32) -> Option<Self> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(&i32::from(*v)))
            .map(Self)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0 as i32
    }

    /// Star glyphs, e.g. `★★★` for a rating of three.
    #[must_use]
    pub fn stars(&self) -> String {
        "★".repeat(usize::from(self.0))
    }
}

impl TryFrom<i32> for StarRating {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| {
            format!(
                "rating must be between {} and {}, got {value}",
                Self::MIN,
                Self::MAX
            )
        })
    }
}

impl From<StarRating> for i32 {
    fn from(rating: StarRating) -> Self {
        rating.value()
    }
}

impl fmt::Display for StarRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stars())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_conversions() {
        let id = ShowId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i32::from(id), 42);
        assert_eq!(ShowId::from(42), id);
    }

    #[test]
    fn id_serialization() {
        let id = NoteId::new(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");
        let back: NoteId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn star_rating_bounds() {
        assert!(StarRating::new(0).is_none());
        assert!(StarRating::new(6).is_none());
        assert!(StarRating::new(-1).is_none());
        assert_eq!(StarRating::new(1).map(|r| r.value()), Some(1));
        assert_eq!(StarRating::new(5).map(|r| r.value()), Some(5));
    }

    #[test]
    fn star_rating_display() {
        let rating = StarRating::new(3).unwrap();
        assert_eq!(rating.to_string(), "★★★");
    }

    #[test]
    fn star_rating_deserialize_rejects_out_of_range() {
        let ok: StarRating = serde_json::from_str("4").unwrap();
        assert_eq!(ok.value(), 4);
        assert!(serde_json::from_str::<StarRating>("9").is_err());
    }
}
