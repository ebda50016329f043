mod handler;
pub mod model;

pub use handler::{create_alert_type, delete_alert_type, get_alert_type, list_alert_types, update_alert_type};
