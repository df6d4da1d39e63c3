pub mod config;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod services;
pub mod state;

pub use config::Config;
pub use router::app;
pub use state::AppState;
