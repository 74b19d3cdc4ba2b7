// WebSocket module - Browser-facing broadcast transport
pub mod gateway;

pub use gateway::BroadcastGateway;
