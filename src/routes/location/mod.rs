mod handler;
pub mod model;

pub use handler::location_ranking;
pub(crate) use handler::invalidate_rankings;
