//! Narrow client traits the waiters consume.
//!
//! The waiters never perform network calls themselves; they observe a
//! resource through one of these traits. A real implementation fronts the
//! control-plane REST API, the test harness provides scripted stand-ins.
//! Query methods must be idempotent and side-effect free, and a missing
//! resource must surface as [`ClientError::NotFound`] rather than a generic
//! failure, because absence is itself the success condition for deletion
//! waits.

pub mod types;

pub use types::{Image, ImageStatus, InterfaceAttachment, Volume, VolumeStatus};

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by client query methods.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The resource does not exist (any more). Kept distinguishable from
    /// other failures so deletion-oriented waits can treat it as success.
    #[error("{resource} {id} could not be found")]
    NotFound { resource: String, id: String },

    /// Transport or API failure; the waiters propagate these untouched.
    #[error("control plane request failed: {0}")]
    Request(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Per-client polling budget, read-only from the waiters' perspective.
pub trait PollTimings {
    /// Total wall-clock budget for one wait.
    fn build_timeout(&self) -> Duration;
    /// Pause between consecutive polls.
    fn build_interval(&self) -> Duration;
}

/// Image service queries.
#[async_trait]
pub trait ImageClient: PollTimings + Send + Sync {
    async fn show_image(&self, image_id: &str) -> ClientResult<Image>;
}

/// Resource family served by a volume-style client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeResourceKind {
    Volume,
    Snapshot,
    Backup,
}

impl VolumeResourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::Snapshot => "snapshot",
            Self::Backup => "backup",
        }
    }
}

impl fmt::Display for VolumeResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Volume-family queries (volumes, snapshots, backups).
///
/// One trait covers all three kinds; `resource_kind` selects the error
/// vocabulary and the label used in failure reports.
#[async_trait]
pub trait VolumeResourceClient: PollTimings + Send + Sync {
    fn resource_kind(&self) -> VolumeResourceKind;
    async fn show_resource(&self, resource_id: &str) -> ClientResult<Volume>;
}

/// Server network interface attachment queries.
#[async_trait]
pub trait InterfaceClient: PollTimings + Send + Sync {
    async fn show_interface(
        &self,
        server_id: &str,
        port_id: &str,
    ) -> ClientResult<InterfaceAttachment>;

    async fn list_interfaces(&self, server_id: &str) -> ClientResult<Vec<InterfaceAttachment>>;
}
