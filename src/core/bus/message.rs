use crate::domain::device::DeviceSet;
use serde::{Deserialize, Serialize};

/// One delimiter-terminated unit of data read from the active connection.
/// Carries no identity beyond its payload and arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub payload: String,
}

impl Record {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

/// Consumer lifecycle notifications sent by the UI host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppLifecycle {
    Started,
    Closing,
}

/// The unit exchanged on the bus. Closed enumeration; messages are immutable
/// value objects and the bus never mutates one after publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusMessage {
    /// The attached device set changed (Device Directory)
    DevicesChanged(DeviceSet),
    /// Whether a serial connection is now open (Connection Manager)
    DeviceSelected(bool),
    /// A framed record from the active connection (Line Framer)
    Data(Record),
    /// Free-form payload received from a network client (Broadcast Gateway)
    ClientData(String),
    /// Command: connect to the named device, or disconnect with `None`
    SelectDevice(Option<String>),
    /// Command: consumer lifecycle notification
    AppLifecycle(AppLifecycle),
}
