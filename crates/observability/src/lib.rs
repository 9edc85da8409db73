//! Process-wide logging setup shared by the binaries.

pub mod subscriber;

pub use subscriber::{directive, init};
