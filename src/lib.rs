//! SerBridge Library
//!
//! Bridges a single serial-attached measurement device to software
//! consumers: device discovery and polling, single-connection lifecycle
//! management, line framing, an in-process message bus, and a WebSocket
//! broadcast gateway for browser-hosted clients.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use crate::core::bridge::DeviceBridge;
pub use crate::core::bus::{AppLifecycle, BusMessage, MessageBus, Record, SubscriptionHandle};
pub use crate::core::directory::DeviceDirectory;
pub use crate::core::link::{ConnectionManager, ConnectionState, LineFramer};
pub use crate::domain::config::BridgeConfig;
pub use crate::domain::device::{Device, DeviceSet};
pub use crate::domain::error::{BridgeError, BridgeResult};
pub use crate::infrastructure::serial::{PortProvider, SystemPortProvider};
pub use crate::infrastructure::ws::BroadcastGateway;
