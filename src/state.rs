use crate::engine::Tracker;
use crate::storage::JsonFileStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub store: JsonFileStore,
    pub tracker: Arc<Mutex<Tracker>>,
    pub default_target: f64,
}

impl AppState {
    pub fn new(store: JsonFileStore, tracker: Tracker, default_target: f64) -> Self {
        Self {
            store,
            tracker: Arc::new(Mutex::new(tracker)),
            default_target,
        }
    }
}
