mod ingest;
mod user;

pub use ingest::cmd_ingest;
pub use user::{cmd_user_add, cmd_user_list, cmd_user_regenerate_key};
