//! End-to-end image waiter scenarios.

use std::time::Instant;

use cloudwait::client::{ImageStatus, PollTimings};
use cloudwait::test_harness::{init_test_logging, ScriptedImageClient};
use cloudwait::waiters::{wait_for_image_status, WaitError};

use crate::quick_settings;

/// An image that is already active completes in well under the budget on the
/// real clock, without ever sleeping.
#[tokio::test]
async fn test_active_image_returns_well_under_timeout() {
    init_test_logging();
    let client = ScriptedImageClient::with_statuses("img1", &[ImageStatus::Active])
        .settings(quick_settings());

    let start = Instant::now();
    let image = wait_for_image_status(&client, "img1", ImageStatus::Active)
        .await
        .unwrap();

    assert_eq!(image.id, "img1");
    assert_eq!(image.status, ImageStatus::Active);
    assert!(start.elapsed() < client.build_timeout());
    assert_eq!(client.query_count(), 1);
}

/// An image that transitions through `saving` becomes active after one real
/// interval sleep.
#[tokio::test]
async fn test_saving_image_becomes_active() {
    init_test_logging();
    let client =
        ScriptedImageClient::with_statuses("img1", &[ImageStatus::Saving, ImageStatus::Active])
            .settings(quick_settings());

    let image = wait_for_image_status(&client, "img1", ImageStatus::Active)
        .await
        .unwrap();

    assert_eq!(image.status, ImageStatus::Active);
    assert_eq!(client.query_count(), 2);
}

/// A creation failure surfaces as the image-specific error, not a timeout.
#[tokio::test]
async fn test_image_error_fails_the_wait() {
    init_test_logging();
    let client = ScriptedImageClient::with_statuses(
        "img1",
        &[ImageStatus::Queued, ImageStatus::Error],
    )
    .settings(quick_settings());

    let result = wait_for_image_status(&client, "img1", ImageStatus::Active).await;

    match result {
        Err(WaitError::ImageCreateFailed { image_id, .. }) => assert_eq!(image_id, "img1"),
        other => panic!("expected ImageCreateFailed, got {other:?}"),
    }
}
