//! End-to-end interface attach/detach scenarios.

use std::time::Duration;

use cloudwait::test_harness::{attachment, init_test_logging, ManualClock, ScriptedInterfaceClient};
use cloudwait::waiters::{
    wait_for_interface_detach, wait_for_interface_status, WaitError, Waiter,
};

use crate::quick_settings;

#[tokio::test]
async fn test_interface_comes_up_after_one_interval() {
    init_test_logging();
    let client = ScriptedInterfaceClient::new()
        .show_responses(vec![
            Ok(attachment("port_id", "DOWN")),
            Ok(attachment("port_id", "ACTIVE")),
        ])
        .settings(quick_settings());

    let body = wait_for_interface_status(&client, "server_id", "port_id", "ACTIVE")
        .await
        .unwrap();

    assert_eq!(body.port_state, "ACTIVE");
    assert_eq!(client.show_query_count(), 2);
}

#[tokio::test]
async fn test_detach_returns_remaining_attachments() {
    init_test_logging();
    let client = ScriptedInterfaceClient::new()
        .list_responses(vec![
            Ok(vec![
                attachment("port_one", "ACTIVE"),
                attachment("port_two", "ACTIVE"),
            ]),
            Ok(vec![attachment("port_one", "ACTIVE")]),
        ])
        .settings(quick_settings());

    let remaining = wait_for_interface_detach(&client, "server_id", "port_two")
        .await
        .unwrap();

    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].port_id, "port_one");
    assert_eq!(client.list_query_count(), 2);
}

/// A port that never leaves the attachment list can only fail by timeout.
#[tokio::test]
async fn test_detach_that_never_happens_times_out() {
    init_test_logging();
    let client = ScriptedInterfaceClient::new()
        .list_responses(vec![Ok(vec![attachment("port_one", "ACTIVE")])])
        .settings(quick_settings());
    let clock = ManualClock::advancing_by(Duration::from_secs(11));

    let result = Waiter::with_clock(clock)
        .interface_detach(&client, "server_id", "port_one")
        .await;

    match result {
        Err(WaitError::Timeout { resource, id, .. }) => {
            assert_eq!(resource, "interface");
            assert_eq!(id, "port_one");
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
}
