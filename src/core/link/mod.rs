// Link module - Active serial connection lifecycle and framing
pub mod framer;
pub mod manager;

pub use framer::LineFramer;
pub use manager::{ConnectionManager, ConnectionState, ReaderClosed, ReaderEvent};
