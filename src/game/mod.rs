pub mod best_time_store;
pub mod clock;
pub mod dialer;
pub mod game_engine;
pub mod pin_lock;
pub mod run_session;
pub mod settings;
pub mod streak_grid;
pub mod timer_queue;

pub use best_time_store::{BestTimeStore, JsonFileStore, MemoryStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use game_engine::GameEngine;
pub use settings::Settings;
