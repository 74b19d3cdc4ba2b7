// Domain module - Core types shared across the bridge
pub mod config;
pub mod device;
pub mod error;
