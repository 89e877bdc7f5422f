//! End-to-end volume status and deletion scenarios.

use std::time::Duration;

use cloudwait::client::{ClientError, VolumeResourceKind, VolumeStatus};
use cloudwait::test_harness::{init_test_logging, ManualClock, ScriptedVolumeClient};
use cloudwait::waiters::{
    wait_for_resource_deletion, wait_for_volume_resource_status, WaitError, Waiter,
};

use crate::quick_settings;

#[tokio::test]
async fn test_creating_volume_becomes_available() {
    init_test_logging();
    let client = ScriptedVolumeClient::with_statuses(
        VolumeResourceKind::Volume,
        "vol1",
        &[VolumeStatus::Creating, VolumeStatus::Available],
    )
    .settings(quick_settings());

    let volume = wait_for_volume_resource_status(&client, "vol1", VolumeStatus::Available)
        .await
        .unwrap();

    assert_eq!(volume.status, VolumeStatus::Available);
    assert_eq!(client.query_count(), 2);
}

/// The restore-specific failure propagates through the public entry point.
#[tokio::test]
async fn test_restore_failure_is_distinguishable() {
    init_test_logging();
    let client = ScriptedVolumeClient::with_statuses(
        VolumeResourceKind::Volume,
        "vol1",
        &[VolumeStatus::RestoringBackup, VolumeStatus::ErrorRestoring],
    )
    .settings(quick_settings());

    let result = wait_for_volume_resource_status(&client, "vol1", VolumeStatus::Available).await;

    assert!(matches!(result, Err(WaitError::VolumeRestoreFailed { .. })));
    assert_eq!(client.query_count(), 2);
}

/// Snapshot deletion: the resource lingers in `deleting`, then disappears.
/// The NotFound answer ends the wait successfully.
#[tokio::test]
async fn test_snapshot_deletion_completes_on_not_found() {
    init_test_logging();
    let client = ScriptedVolumeClient::deleting(
        VolumeResourceKind::Snapshot,
        "snap1",
        &[VolumeStatus::Deleting],
    )
    .settings(quick_settings());

    wait_for_resource_deletion(&client, "snap1").await.unwrap();
    assert_eq!(client.query_count(), 2);
}

/// A volume stuck in a transient state runs the budget down and reports what
/// it last saw. Driven by a manual clock so no real time passes.
#[tokio::test]
async fn test_stuck_volume_times_out_with_context() {
    init_test_logging();
    let client = ScriptedVolumeClient::with_statuses(
        VolumeResourceKind::Volume,
        "vol1",
        &[VolumeStatus::Attaching],
    )
    .settings(quick_settings());
    let clock = ManualClock::advancing_by(Duration::from_secs(11));

    let result = Waiter::with_clock(clock)
        .volume_resource_status(&client, "vol1", VolumeStatus::InUse)
        .await;

    match result {
        Err(WaitError::Timeout {
            resource,
            id,
            target,
            last,
            timeout_secs,
        }) => {
            assert_eq!(resource, "volume");
            assert_eq!(id, "vol1");
            assert_eq!(target, "status in-use");
            assert_eq!(last, "status attaching");
            assert_eq!(timeout_secs, 10);
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
}

/// NotFound outside a deletion wait stays an error.
#[tokio::test]
async fn test_vanished_volume_fails_a_status_wait() {
    init_test_logging();
    let client = ScriptedVolumeClient::new(
        VolumeResourceKind::Volume,
        vec![Err(ClientError::NotFound {
            resource: "volume".to_string(),
            id: "vol1".to_string(),
        })],
    )
    .settings(quick_settings());

    let result = wait_for_volume_resource_status(&client, "vol1", VolumeStatus::Available).await;
    assert!(matches!(
        result,
        Err(WaitError::Client(ClientError::NotFound { .. }))
    ));
}
