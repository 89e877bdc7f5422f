//! Integration tests for the cloudwait waiters.
//!
//! These tests drive the public waiter functions end to end against scripted
//! clients from the test harness. The deterministic scenarios inject a
//! manual clock; the smoke scenarios run on the real tokio clock with small
//! polling budgets. They require the `test-harness` feature:
//!
//! ```bash
//! cargo test --features test-harness
//! ```

pub mod image;
pub mod interface;
pub mod volume;

use cloudwait::config::BuildSettings;

/// A small real-time budget so smoke tests finish in a few seconds at worst.
pub fn quick_settings() -> BuildSettings {
    BuildSettings {
        build_timeout_secs: 10,
        build_interval_secs: 1,
    }
}
