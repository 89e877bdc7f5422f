//! Deterministic test doubles for the waiters.
//!
//! Provides a manual clock that only moves when told to, plus scripted
//! clients that replay a fixed sequence of query responses. Both exist so
//! waiter tests can assert exact query and sleep counts without real time
//! passing and without patching any global state; the clock is handed to
//! [`crate::waiters::Waiter::with_clock`] and the clients implement the
//! normal query traits.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::client::types::{Image, ImageStatus, InterfaceAttachment, Volume, VolumeStatus};
use crate::client::{
    ClientError, ClientResult, ImageClient, InterfaceClient, PollTimings, VolumeResourceClient,
    VolumeResourceKind,
};
use crate::config::BuildSettings;
use crate::waiters::Clock;

/// Initializes env_logger once for a test binary. Safe to call repeatedly.
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Fabricates a resource id in the shape the control plane uses.
pub fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

struct ClockState {
    now: Instant,
    tick: Duration,
    sleeps: Vec<Duration>,
}

/// Clock that only advances when read (by `tick`) or slept on.
///
/// With a zero tick, elapsed time equals the sum of the sleeps performed, so
/// a wait can run as many iterations as its script needs. With a tick larger
/// than the budget, the very first elapsed-time check fires the timeout.
pub struct ManualClock {
    state: Mutex<ClockState>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::advancing_by(Duration::ZERO)
    }

    /// Each `now()` reading advances the clock by `tick`.
    pub fn advancing_by(tick: Duration) -> Self {
        Self {
            state: Mutex::new(ClockState {
                now: Instant::now(),
                tick,
                sleeps: Vec::new(),
            }),
        }
    }

    pub fn sleep_count(&self) -> usize {
        self.state.lock().unwrap().sleeps.len()
    }

    /// The intervals passed to `sleep`, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.state.lock().unwrap().sleeps.clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let mut state = self.state.lock().unwrap();
        let now = state.now;
        let tick = state.tick;
        state.now += tick;
        now
    }

    async fn sleep(&self, interval: Duration) {
        let mut state = self.state.lock().unwrap();
        state.sleeps.push(interval);
        state.now += interval;
    }
}

/// Builds an image snapshot with the given id and status.
pub fn image(id: &str, status: ImageStatus) -> Image {
    Image {
        id: id.to_string(),
        status,
        name: None,
    }
}

/// Builds a volume snapshot with the given id and status; the remaining
/// fields stay unset and can be filled with struct update syntax.
pub fn volume(id: &str, status: VolumeStatus) -> Volume {
    Volume {
        id: id.to_string(),
        status,
        name: None,
        description: None,
        size: None,
        volume_type: None,
        user_id: None,
        migration_status: None,
        migration_status_attr: None,
        host: None,
        tenant_id: None,
    }
}

/// Builds an interface attachment entry.
pub fn attachment(port_id: &str, port_state: &str) -> InterfaceAttachment {
    InterfaceAttachment {
        port_id: port_id.to_string(),
        port_state: port_state.to_string(),
        net_id: None,
        mac_addr: None,
    }
}

fn not_found(resource: &str, id: &str) -> ClientError {
    ClientError::NotFound {
        resource: resource.to_string(),
        id: id.to_string(),
    }
}

/// Pops the next scripted response; the final entry repeats forever so a
/// single-entry script behaves like a constant responder.
fn next_response<T: Clone>(queue: &Mutex<VecDeque<ClientResult<T>>>) -> ClientResult<T> {
    let mut queue = queue.lock().unwrap();
    if queue.len() > 1 {
        queue.pop_front().unwrap()
    } else {
        queue
            .front()
            .cloned()
            .unwrap_or_else(|| Err(ClientError::Request("scripted client is empty".to_string())))
    }
}

/// Image client replaying a fixed response sequence.
pub struct ScriptedImageClient {
    settings: BuildSettings,
    responses: Mutex<VecDeque<ClientResult<Image>>>,
    queries: AtomicUsize,
}

impl ScriptedImageClient {
    pub fn new(responses: Vec<ClientResult<Image>>) -> Self {
        Self {
            settings: BuildSettings::default(),
            responses: Mutex::new(responses.into()),
            queries: AtomicUsize::new(0),
        }
    }

    /// Scripts one snapshot per status, all for the same image id.
    pub fn with_statuses(image_id: &str, statuses: &[ImageStatus]) -> Self {
        Self::new(
            statuses
                .iter()
                .map(|status| Ok(image(image_id, status.clone())))
                .collect(),
        )
    }

    pub fn settings(mut self, settings: BuildSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl PollTimings for ScriptedImageClient {
    fn build_timeout(&self) -> Duration {
        self.settings.build_timeout()
    }

    fn build_interval(&self) -> Duration {
        self.settings.build_interval()
    }
}

#[async_trait]
impl ImageClient for ScriptedImageClient {
    async fn show_image(&self, _image_id: &str) -> ClientResult<Image> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        next_response(&self.responses)
    }
}

/// Volume-family client replaying a fixed response sequence.
pub struct ScriptedVolumeClient {
    kind: VolumeResourceKind,
    settings: BuildSettings,
    responses: Mutex<VecDeque<ClientResult<Volume>>>,
    queries: AtomicUsize,
}

impl ScriptedVolumeClient {
    pub fn new(kind: VolumeResourceKind, responses: Vec<ClientResult<Volume>>) -> Self {
        Self {
            kind,
            settings: BuildSettings::default(),
            responses: Mutex::new(responses.into()),
            queries: AtomicUsize::new(0),
        }
    }

    /// Scripts one snapshot per status, all for the same resource id.
    pub fn with_statuses(
        kind: VolumeResourceKind,
        resource_id: &str,
        statuses: &[VolumeStatus],
    ) -> Self {
        Self::new(
            kind,
            statuses
                .iter()
                .map(|status| Ok(volume(resource_id, status.clone())))
                .collect(),
        )
    }

    /// Scripts a deletion: `statuses` while the resource lingers, then
    /// NotFound forever.
    pub fn deleting(
        kind: VolumeResourceKind,
        resource_id: &str,
        statuses: &[VolumeStatus],
    ) -> Self {
        let mut responses: Vec<ClientResult<Volume>> = statuses
            .iter()
            .map(|status| Ok(volume(resource_id, status.clone())))
            .collect();
        responses.push(Err(not_found(kind.label(), resource_id)));
        Self::new(kind, responses)
    }

    pub fn settings(mut self, settings: BuildSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl PollTimings for ScriptedVolumeClient {
    fn build_timeout(&self) -> Duration {
        self.settings.build_timeout()
    }

    fn build_interval(&self) -> Duration {
        self.settings.build_interval()
    }
}

#[async_trait]
impl VolumeResourceClient for ScriptedVolumeClient {
    fn resource_kind(&self) -> VolumeResourceKind {
        self.kind
    }

    async fn show_resource(&self, _resource_id: &str) -> ClientResult<Volume> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        next_response(&self.responses)
    }
}

/// Interface client with separate scripts for `show_interface` and
/// `list_interfaces`.
pub struct ScriptedInterfaceClient {
    settings: BuildSettings,
    show: Mutex<VecDeque<ClientResult<InterfaceAttachment>>>,
    list: Mutex<VecDeque<ClientResult<Vec<InterfaceAttachment>>>>,
    show_queries: AtomicUsize,
    list_queries: AtomicUsize,
}

impl ScriptedInterfaceClient {
    pub fn new() -> Self {
        Self {
            settings: BuildSettings::default(),
            show: Mutex::new(VecDeque::new()),
            list: Mutex::new(VecDeque::new()),
            show_queries: AtomicUsize::new(0),
            list_queries: AtomicUsize::new(0),
        }
    }

    pub fn show_responses(self, responses: Vec<ClientResult<InterfaceAttachment>>) -> Self {
        *self.show.lock().unwrap() = responses.into();
        self
    }

    pub fn list_responses(self, responses: Vec<ClientResult<Vec<InterfaceAttachment>>>) -> Self {
        *self.list.lock().unwrap() = responses.into();
        self
    }

    pub fn settings(mut self, settings: BuildSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn show_query_count(&self) -> usize {
        self.show_queries.load(Ordering::SeqCst)
    }

    pub fn list_query_count(&self) -> usize {
        self.list_queries.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedInterfaceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PollTimings for ScriptedInterfaceClient {
    fn build_timeout(&self) -> Duration {
        self.settings.build_timeout()
    }

    fn build_interval(&self) -> Duration {
        self.settings.build_interval()
    }
}

#[async_trait]
impl InterfaceClient for ScriptedInterfaceClient {
    async fn show_interface(
        &self,
        _server_id: &str,
        _port_id: &str,
    ) -> ClientResult<InterfaceAttachment> {
        self.show_queries.fetch_add(1, Ordering::SeqCst);
        next_response(&self.show)
    }

    async fn list_interfaces(&self, _server_id: &str) -> ClientResult<Vec<InterfaceAttachment>> {
        self.list_queries.fetch_add(1, Ordering::SeqCst);
        next_response(&self.list)
    }
}
