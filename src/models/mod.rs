// Domain types shared by the stores, the ranking engines and the HTTP layer

pub mod alert_type;
pub mod entry;
pub mod ranking;
pub mod user;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use alert_type::{AlertType, AlertTypeFields};
pub use entry::{Address, Entry, EntryFields, GeoPoint};
pub use ranking::{LocationRanking, Rank, Ranking, SafetyLevel};
pub use user::{AdminRole, User, UserChanges};

/// Lifecycle status of entries, alert types and users.
///
/// Records are never removed physically; deleting one flips it to `Deleted`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Enabled,
    Deleted,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Enabled => "enabled",
            Status::Deleted => "deleted",
        }
    }

    pub fn is_enabled(self) -> bool {
        self == Status::Enabled
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enabled" => Ok(Status::Enabled),
            "deleted" => Ok(Status::Deleted),
            other => Err(format!("unknown status `{other}`")),
        }
    }
}
