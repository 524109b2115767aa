pub mod cache;
pub mod events;
pub mod list;
pub mod manager;

pub use cache::ItemCache;
pub use events::{BroadcastEventBus, EventBus, QueueEvent};
pub use list::IndexedList;
pub use manager::QueueManager;
