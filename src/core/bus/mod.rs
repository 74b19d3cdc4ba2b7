// Bus module - In-process publish/subscribe hub
pub mod hub;
pub mod message;

pub use hub::{MessageBus, SubscriptionHandle};
pub use message::{AppLifecycle, BusMessage, Record};
