pub mod app;
pub mod config;
pub mod engine;
pub mod errors;
pub mod handlers;
pub mod history;
pub mod metrics;
pub mod models;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use engine::{Tracker, TrackerOptions, UndoPolicy};
pub use state::AppState;
pub use storage::JsonFileStore;
