pub mod app;
pub mod coalesce;
pub mod completion;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod progress;
pub mod registry;
pub mod state;
pub mod stats;
pub mod storage;
pub mod streak;
pub mod timer;
pub mod tracker;
pub mod workers;

pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
pub use storage::{load_tracker, BlobStore};
pub use tracker::HabitTracker;
