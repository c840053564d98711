//! Error plumbing and small path helpers shared across skilldeck crates.

pub mod error;
pub mod paths;

pub use error::FromMessage;
