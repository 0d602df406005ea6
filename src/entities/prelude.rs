pub use super::artists::Entity as Artists;
pub use super::notes::Entity as Notes;
pub use super::profiles::Entity as Profiles;
pub use super::shows::Entity as Shows;
pub use super::users::Entity as Users;
pub use super::venues::Entity as Venues;
