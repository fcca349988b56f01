pub mod analysis;
pub mod config;
pub mod dataset;
pub mod filters;
pub mod routes;

pub use config::ServerConfig;
pub use filters::Filters;
pub use routes::{build_router, AppState};

pub const APP_NAME: &str = "strokedash";
