pub mod prelude;

pub mod artists;
pub mod notes;
pub mod profiles;
pub mod shows;
pub mod users;
pub mod venues;
