pub mod artist;
pub mod note;
pub mod profile;
pub mod show;
pub mod user;
pub mod venue;
