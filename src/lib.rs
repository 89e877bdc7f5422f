//! Bounded-polling waiters that synchronize integration tests with the
//! asynchronous state transitions of control-plane resources (images,
//! volumes, network interface attachments).

pub mod client;
pub mod config;
pub mod waiters;

#[cfg(any(test, feature = "test-harness"))]
pub mod test_harness;

// Polling budget defaults, in seconds
pub const DEFAULT_BUILD_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_BUILD_INTERVAL_SECS: u64 = 1;
