mod channel;
mod event_handler;

pub use channel::{Channel, EventEmitter, EventObserver, SubscriptionId, Unsubscriber};
pub use event_handler::{attach_handler, EventHandler};
