pub(crate) mod handler;
pub mod model;

pub use handler::{login, me, sign_up};
