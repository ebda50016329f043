// Row shapes as read from Postgres, converted into the domain models

pub mod alert_type;
pub mod entry;
pub mod user;

pub use alert_type::{ALERT_TYPE_COLUMNS, AlertTypeEntity};
pub use entry::{ENTRY_COLUMNS, EntryEntity};
pub use user::{USER_COLUMNS, UserEntity};

use crate::models::Status;
use crate::store::StoreError;

fn parse_status(raw: &str) -> Result<Status, StoreError> {
    raw.parse().map_err(StoreError::Decode)
}
