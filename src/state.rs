use crate::coalesce::SliderBuffer;
use crate::storage::BlobStore;
use crate::timer::TimerBoard;
use crate::tracker::HabitTracker;
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

/// Shared handle to the tracker. When more than one lock is needed, take
/// `tracker` first.
#[derive(Clone)]
pub struct AppState {
    pub store: BlobStore,
    pub tracker: Arc<Mutex<HabitTracker>>,
    pub timers: Arc<Mutex<TimerBoard>>,
    pub sliders: Arc<Mutex<SliderBuffer>>,
    pub timer_tick: Duration,
}

impl AppState {
    pub fn new(
        store: BlobStore,
        tracker: HabitTracker,
        slider_window: Duration,
        timer_tick: Duration,
    ) -> Self {
        Self {
            store,
            tracker: Arc::new(Mutex::new(tracker)),
            timers: Arc::new(Mutex::new(TimerBoard::default())),
            sliders: Arc::new(Mutex::new(SliderBuffer::new(slider_window))),
            timer_tick,
        }
    }
}
