mod handler;
pub mod model;

pub use handler::{create_user, delete_user, get_user, list_users, login, recompute_ranking, update_user};
