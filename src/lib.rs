mod api;
mod config;
mod error;
pub mod models;
mod seed;
mod store;

pub use api::{AppState, routes};
pub use config::Config;
pub use error::ApiError;
pub use seed::seed;
pub use store::{ListingStore, PropertyFilter};
