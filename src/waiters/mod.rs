//! Resource-specific waiters built on the bounded poll loop.
//!
//! Each waiter blocks (asynchronously) until a remotely managed resource
//! reaches an expected state, a terminal failure state is observed, or the
//! client's `build_timeout` budget runs out. Timing comes from the client
//! handle; the clock is injectable through [`Waiter::with_clock`] and the
//! free functions use the tokio-backed default.

pub mod poll;

pub use poll::{Clock, TokioClock, WaitTarget};

use log::{debug, info};
use thiserror::Error;

use crate::client::{
    ClientError, Image, ImageClient, ImageStatus, InterfaceAttachment, InterfaceClient, Volume,
    VolumeResourceClient, VolumeStatus,
};
use poll::PollState;

/// Failure signal of one waiter invocation.
///
/// Fatal states carry an error specific to their cause so callers can tell a
/// failed restore from a generic error state; everything the backend reports
/// outside the known vocabulary falls into `UnexpectedStatus`.
#[derive(Debug, Error)]
pub enum WaitError {
    #[error(
        "{resource} {id} failed to reach {target} within {timeout_secs} s \
         (last observed status: {last})"
    )]
    Timeout {
        resource: String,
        id: String,
        target: String,
        last: String,
        timeout_secs: u64,
    },

    #[error("image {image_id} entered status {status} while waiting to become {target}")]
    ImageCreateFailed {
        image_id: String,
        status: String,
        target: String,
    },

    #[error("{resource} {id} entered an error status")]
    ResourceBuildFailed { resource: String, id: String },

    #[error("volume {id} failed while restoring from backup")]
    VolumeRestoreFailed { id: String },

    #[error("volume {id} failed while extending")]
    VolumeExtendFailed { id: String },

    #[error("{resource} {id} failed while deleting")]
    VolumeDeleteFailed { resource: String, id: String },

    #[error("{resource} {id} reported unexpected status {status}")]
    UnexpectedStatus {
        resource: String,
        id: String,
        status: String,
    },

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Waiter handle carrying the injected clock.
///
/// `Waiter::new()` uses the tokio clock; tests inject a manual one. The
/// handle holds no other state, so it is free to construct per wait.
#[derive(Debug, Clone)]
pub struct Waiter<K = TokioClock> {
    clock: K,
}

impl Waiter<TokioClock> {
    pub fn new() -> Self {
        Self { clock: TokioClock }
    }
}

impl Default for Waiter<TokioClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clock> Waiter<K> {
    pub fn with_clock(clock: K) -> Self {
        Self { clock }
    }

    /// Waits for an image to report `target`.
    ///
    /// `error` and `killed` are terminal creation failures; any other
    /// non-target status keeps polling.
    pub async fn image_status<C>(
        &self,
        client: &C,
        image_id: &str,
        target: ImageStatus,
    ) -> Result<Image, WaitError>
    where
        C: ImageClient + ?Sized,
    {
        let wait = WaitTarget::new("image", image_id, format!("status {target}"));
        let image = poll::poll_until(
            &self.clock,
            client.build_interval(),
            client.build_timeout(),
            &wait,
            || {
                let target = target.clone();
                async move {
                    let image = client.show_image(image_id).await?;
                    if image.status == target {
                        return Ok(PollState::Satisfied(image));
                    }
                    match image.status {
                        ImageStatus::Error | ImageStatus::Killed => {
                            Ok(PollState::Fatal(WaitError::ImageCreateFailed {
                                image_id: image_id.to_string(),
                                status: image.status.to_string(),
                                target: target.to_string(),
                            }))
                        }
                        other => Ok(PollState::Retry(format!("status {other}"))),
                    }
                }
            },
        )
        .await?;

        info!("image {image_id} reached status {target}");
        Ok(image)
    }

    /// Waits for a volume-family resource to report `target`.
    ///
    /// The known fatal statuses each map to their own error kind; a status
    /// outside the known vocabulary that is neither the target nor transient
    /// fails as [`WaitError::UnexpectedStatus`] instead of polling forever.
    pub async fn volume_resource_status<C>(
        &self,
        client: &C,
        resource_id: &str,
        target: VolumeStatus,
    ) -> Result<Volume, WaitError>
    where
        C: VolumeResourceClient + ?Sized,
    {
        let kind = client.resource_kind();
        let wait = WaitTarget::new(kind.label(), resource_id, format!("status {target}"));
        let resource = poll::poll_until(
            &self.clock,
            client.build_interval(),
            client.build_timeout(),
            &wait,
            || {
                let target = target.clone();
                async move {
                    let resource = client.show_resource(resource_id).await?;
                    if resource.status == target {
                        return Ok(PollState::Satisfied(resource));
                    }
                    Ok(classify_volume_status(
                        kind.label(),
                        resource_id,
                        resource,
                    ))
                }
            },
        )
        .await?;

        info!("{kind} {resource_id} reached status {target}");
        Ok(resource)
    }

    /// Waits for a retyped volume to converge on `new_type`.
    ///
    /// Only type-name convergence is tracked here; checking the migration
    /// bookkeeping fields and the unchanged identity fields stays with the
    /// caller, which still holds the pre-retype snapshot to compare against.
    pub async fn volume_retype<C>(
        &self,
        client: &C,
        volume_id: &str,
        new_type: &str,
    ) -> Result<Volume, WaitError>
    where
        C: VolumeResourceClient + ?Sized,
    {
        let wait = WaitTarget::new("volume", volume_id, format!("type {new_type}"));
        let volume = poll::poll_until(
            &self.clock,
            client.build_interval(),
            client.build_timeout(),
            &wait,
            || async move {
                let volume = client.show_resource(volume_id).await?;
                if volume.volume_type.as_deref() == Some(new_type) {
                    Ok(PollState::Satisfied(volume))
                } else {
                    let current = volume.volume_type.as_deref().unwrap_or("none");
                    Ok(PollState::Retry(format!("type {current}")))
                }
            },
        )
        .await?;

        info!("volume {volume_id} retyped to {new_type}");
        Ok(volume)
    }

    /// Waits for a volume-family resource to disappear.
    ///
    /// A `NotFound` from the query is the success condition here, not an
    /// error; deletion races are expected. A resource stuck in
    /// `error_deleting` fails immediately.
    pub async fn resource_deletion<C>(&self, client: &C, resource_id: &str) -> Result<(), WaitError>
    where
        C: VolumeResourceClient + ?Sized,
    {
        let kind = client.resource_kind();
        let wait = WaitTarget::new(kind.label(), resource_id, "deletion");
        poll::poll_until(
            &self.clock,
            client.build_interval(),
            client.build_timeout(),
            &wait,
            || async move {
                match client.show_resource(resource_id).await {
                    Err(ClientError::NotFound { .. }) => Ok(PollState::Satisfied(())),
                    Err(err) => Err(err.into()),
                    Ok(resource) if resource.status == VolumeStatus::ErrorDeleting => {
                        Ok(PollState::Fatal(WaitError::VolumeDeleteFailed {
                            resource: kind.label().to_string(),
                            id: resource_id.to_string(),
                        }))
                    }
                    Ok(resource) => Ok(PollState::Retry(format!("status {}", resource.status))),
                }
            },
        )
        .await?;

        info!("{kind} {resource_id} deleted");
        Ok(())
    }

    /// Waits for a server interface attachment to report `target`
    /// (typically `ACTIVE`).
    ///
    /// The network service defines no fatal port state; missing the target
    /// before the budget runs out is the only failure mode.
    pub async fn interface_status<C>(
        &self,
        client: &C,
        server_id: &str,
        port_id: &str,
        target: &str,
    ) -> Result<InterfaceAttachment, WaitError>
    where
        C: InterfaceClient + ?Sized,
    {
        let wait = WaitTarget::new("interface", port_id, format!("port state {target}"));
        let attachment = poll::poll_until(
            &self.clock,
            client.build_interval(),
            client.build_timeout(),
            &wait,
            || async move {
                let attachment = client.show_interface(server_id, port_id).await?;
                if attachment.port_state == target {
                    Ok(PollState::Satisfied(attachment))
                } else {
                    Ok(PollState::Retry(format!(
                        "port state {}",
                        attachment.port_state
                    )))
                }
            },
        )
        .await?;

        debug!("interface {port_id} on server {server_id} reached {target}");
        Ok(attachment)
    }

    /// Waits until `port_id` no longer appears in the server's attachment
    /// list, returning the final list.
    ///
    /// A port that never detaches is indistinguishable from a slow detach,
    /// so timeout is the only failure mode.
    pub async fn interface_detach<C>(
        &self,
        client: &C,
        server_id: &str,
        port_id: &str,
    ) -> Result<Vec<InterfaceAttachment>, WaitError>
    where
        C: InterfaceClient + ?Sized,
    {
        let wait = WaitTarget::new("interface", port_id, "detach");
        let attachments = poll::poll_until(
            &self.clock,
            client.build_interval(),
            client.build_timeout(),
            &wait,
            || async move {
                let attachments = client.list_interfaces(server_id).await?;
                if attachments.iter().any(|a| a.port_id == port_id) {
                    Ok(PollState::Retry(format!(
                        "still attached ({} ports total)",
                        attachments.len()
                    )))
                } else {
                    Ok(PollState::Satisfied(attachments))
                }
            },
        )
        .await?;

        debug!("interface {port_id} detached from server {server_id}");
        Ok(attachments)
    }
}

fn classify_volume_status(resource: &str, id: &str, observed: Volume) -> PollState<Volume> {
    match observed.status {
        VolumeStatus::Error => PollState::Fatal(WaitError::ResourceBuildFailed {
            resource: resource.to_string(),
            id: id.to_string(),
        }),
        VolumeStatus::ErrorRestoring => PollState::Fatal(WaitError::VolumeRestoreFailed {
            id: id.to_string(),
        }),
        VolumeStatus::ErrorExtending => PollState::Fatal(WaitError::VolumeExtendFailed {
            id: id.to_string(),
        }),
        VolumeStatus::ErrorDeleting => PollState::Fatal(WaitError::VolumeDeleteFailed {
            resource: resource.to_string(),
            id: id.to_string(),
        }),
        VolumeStatus::Other(status) => PollState::Fatal(WaitError::UnexpectedStatus {
            resource: resource.to_string(),
            id: id.to_string(),
            status,
        }),
        transient => PollState::Retry(format!("status {transient}")),
    }
}

/// Waits for an image to report `target` using the tokio clock.
pub async fn wait_for_image_status<C: ImageClient>(
    client: &C,
    image_id: &str,
    target: ImageStatus,
) -> Result<Image, WaitError> {
    Waiter::new().image_status(client, image_id, target).await
}

/// Waits for a volume-family resource to report `target` using the tokio
/// clock.
pub async fn wait_for_volume_resource_status<C: VolumeResourceClient>(
    client: &C,
    resource_id: &str,
    target: VolumeStatus,
) -> Result<Volume, WaitError> {
    Waiter::new()
        .volume_resource_status(client, resource_id, target)
        .await
}

/// Waits for a retyped volume to converge on `new_type` using the tokio
/// clock.
pub async fn wait_for_volume_retype<C: VolumeResourceClient>(
    client: &C,
    volume_id: &str,
    new_type: &str,
) -> Result<Volume, WaitError> {
    Waiter::new().volume_retype(client, volume_id, new_type).await
}

/// Waits for a volume-family resource to disappear using the tokio clock.
pub async fn wait_for_resource_deletion<C: VolumeResourceClient>(
    client: &C,
    resource_id: &str,
) -> Result<(), WaitError> {
    Waiter::new().resource_deletion(client, resource_id).await
}

/// Waits for an interface attachment to report `target` using the tokio
/// clock.
pub async fn wait_for_interface_status<C: InterfaceClient>(
    client: &C,
    server_id: &str,
    port_id: &str,
    target: &str,
) -> Result<InterfaceAttachment, WaitError> {
    Waiter::new()
        .interface_status(client, server_id, port_id, target)
        .await
}

/// Waits until `port_id` detaches from the server using the tokio clock.
pub async fn wait_for_interface_detach<C: InterfaceClient>(
    client: &C,
    server_id: &str,
    port_id: &str,
) -> Result<Vec<InterfaceAttachment>, WaitError> {
    Waiter::new()
        .interface_detach(client, server_id, port_id)
        .await
}
