pub mod aggregate;
pub mod app;
pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod journal;
pub mod ledger;
pub mod models;
pub mod rewards;
pub mod session;
pub mod state;
pub mod store;
pub mod tasks;
pub mod timer;
pub mod ui;
pub mod wins;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use store::DocumentStore;
