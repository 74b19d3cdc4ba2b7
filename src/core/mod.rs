// Core module - Bridge state, concurrency, and failure handling
pub mod bridge;
pub mod bus;
pub mod directory;
pub mod link;

pub use bridge::DeviceBridge;
pub use bus::{BusMessage, MessageBus};
pub use directory::DeviceDirectory;
pub use link::{ConnectionManager, ConnectionState, LineFramer};
