// Serial module - Port enumeration and link opening
pub mod provider;

pub use provider::{PortProvider, SystemPortProvider};
