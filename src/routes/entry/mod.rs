mod handler;
pub mod model;

pub use handler::{bulk_create_entries, create_entry, delete_entry, get_entry, list_entries, update_entry};
