//! Gateway-facing messaging port and incoming event types.

pub mod port;
pub mod types;
