pub mod app;
pub mod chart;
pub mod client;
pub mod config;
pub mod controllers;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod page;
pub mod report;
pub mod samples;
pub mod source;
pub mod state;
pub mod stats;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::load_store;
