//! Status snapshot types returned by control-plane query methods.
//!
//! The structs mirror the JSON payloads of the control plane, including the
//! extension attributes the volume service reports under `os-vol-*` keys.
//! Backend status strings are modelled as closed enumerations with an
//! `Other` fallback arm, so an unrecognized value is carried verbatim
//! instead of failing deserialization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an image.
///
/// Parsing is case-insensitive because some deployments report upper-case
/// statuses (`ERROR`); unknown strings land in `Other` with their original
/// spelling preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageStatus {
    Queued,
    Saving,
    Uploading,
    Importing,
    Active,
    Deactivated,
    Killed,
    Deleted,
    PendingDelete,
    Error,
    Other(String),
}

impl From<String> for ImageStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "queued" => Self::Queued,
            "saving" => Self::Saving,
            "uploading" => Self::Uploading,
            "importing" => Self::Importing,
            "active" => Self::Active,
            "deactivated" => Self::Deactivated,
            "killed" => Self::Killed,
            "deleted" => Self::Deleted,
            "pending_delete" => Self::PendingDelete,
            "error" => Self::Error,
            _ => Self::Other(value),
        }
    }
}

impl From<ImageStatus> for String {
    fn from(status: ImageStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Queued => "queued",
            Self::Saving => "saving",
            Self::Uploading => "uploading",
            Self::Importing => "importing",
            Self::Active => "active",
            Self::Deactivated => "deactivated",
            Self::Killed => "killed",
            Self::Deleted => "deleted",
            Self::PendingDelete => "pending_delete",
            Self::Error => "error",
            Self::Other(raw) => raw,
        };
        f.write_str(name)
    }
}

/// Lifecycle status of a volume, snapshot or backup.
///
/// The `Error*` variants are terminal failure states; everything else in the
/// closed set is transient and safe to keep polling on. Strings outside the
/// known vocabulary parse into `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VolumeStatus {
    Creating,
    Available,
    InUse,
    Attaching,
    Detaching,
    Deleting,
    Maintenance,
    RestoringBackup,
    BackingUp,
    Retyping,
    Extending,
    Downloading,
    Uploading,
    Error,
    ErrorDeleting,
    ErrorRestoring,
    ErrorExtending,
    Other(String),
}

impl VolumeStatus {
    /// Whether this status is a known terminal failure state.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Error | Self::ErrorDeleting | Self::ErrorRestoring | Self::ErrorExtending
        )
    }
}

impl From<String> for VolumeStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "creating" => Self::Creating,
            "available" => Self::Available,
            "in-use" => Self::InUse,
            "attaching" => Self::Attaching,
            "detaching" => Self::Detaching,
            "deleting" => Self::Deleting,
            "maintenance" => Self::Maintenance,
            "restoring-backup" => Self::RestoringBackup,
            "backing-up" => Self::BackingUp,
            "retyping" => Self::Retyping,
            "extending" => Self::Extending,
            "downloading" => Self::Downloading,
            "uploading" => Self::Uploading,
            "error" => Self::Error,
            "error_deleting" => Self::ErrorDeleting,
            "error_restoring" => Self::ErrorRestoring,
            "error_extending" => Self::ErrorExtending,
            _ => Self::Other(value),
        }
    }
}

impl From<VolumeStatus> for String {
    fn from(status: VolumeStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for VolumeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Creating => "creating",
            Self::Available => "available",
            Self::InUse => "in-use",
            Self::Attaching => "attaching",
            Self::Detaching => "detaching",
            Self::Deleting => "deleting",
            Self::Maintenance => "maintenance",
            Self::RestoringBackup => "restoring-backup",
            Self::BackingUp => "backing-up",
            Self::Retyping => "retyping",
            Self::Extending => "extending",
            Self::Downloading => "downloading",
            Self::Uploading => "uploading",
            Self::Error => "error",
            Self::ErrorDeleting => "error_deleting",
            Self::ErrorRestoring => "error_restoring",
            Self::ErrorExtending => "error_extending",
            Self::Other(raw) => raw,
        };
        f.write_str(name)
    }
}

/// Snapshot of an image as reported by `show_image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub status: ImageStatus,
    #[serde(default)]
    pub name: Option<String>,
}

/// Snapshot of a volume-family resource as reported by `show_*`.
///
/// Carries the migration bookkeeping fields a retype with migration updates
/// (`migration_status` and the admin-only `os-vol-mig-status-attr:migstat`)
/// alongside the identity fields that must survive a migration unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub id: String,
    pub status: VolumeStatus,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub volume_type: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub migration_status: Option<String>,
    #[serde(rename = "os-vol-mig-status-attr:migstat", default)]
    pub migration_status_attr: Option<String>,
    #[serde(rename = "os-vol-host-attr:host", default)]
    pub host: Option<String>,
    #[serde(rename = "os-vol-tenant-attr:tenant_id", default)]
    pub tenant_id: Option<String>,
}

/// One entry of a server's network interface attachment list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceAttachment {
    pub port_id: String,
    /// Reported in upper case by the network service, e.g. `ACTIVE` or `DOWN`.
    pub port_state: String,
    #[serde(default)]
    pub net_id: Option<String>,
    #[serde(default)]
    pub mac_addr: Option<String>,
}
