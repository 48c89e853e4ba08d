use crate::application::ports::RemoteBackend;
use crate::shared::config::ConnectivityConfig;
use std::sync::{Arc, RwLock};
use tokio::sync::{Notify, broadcast};
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep, timeout};
use tracing::{debug, info};

/// Tracks whether the remote backend is currently reachable.
///
/// State is `None` until first determined. Once `false`, only a successful
/// probe (or the explicit debug override) flips it back to `true`; a
/// platform-level "went online" signal merely wakes the probe early, since a
/// flaky network stack can report online without the backend being
/// reachable.
pub struct ConnectivityMonitor {
    remote: Arc<dyn RemoteBackend>,
    config: ConnectivityConfig,
    state: RwLock<Option<bool>>,
    events: broadcast::Sender<bool>,
    probe_wake: Notify,
}

impl ConnectivityMonitor {
    pub fn new(remote: Arc<dyn RemoteBackend>, config: ConnectivityConfig) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            remote,
            config,
            state: RwLock::new(None),
            events,
            probe_wake: Notify::new(),
        }
    }

    /// Last-known state, non-blocking. Unknown counts as offline.
    pub fn is_online(&self) -> bool {
        matches!(self.state(), Some(true))
    }

    pub fn state(&self) -> Option<bool> {
        *self.state.read().expect("connectivity state lock poisoned")
    }

    /// Listeners see each actual state change exactly once; repeated
    /// identical states are not re-published. Unsubscribe by dropping the
    /// receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<bool> {
        self.events.subscribe()
    }

    /// Platform-level network transition. `false` flips state immediately;
    /// `true` only permits the next probe to run sooner.
    pub fn set_network_hint(&self, online: bool) {
        if online {
            self.probe_wake.notify_one();
        } else {
            self.set_state(false);
        }
    }

    /// Explicit override, used by tests and debug tooling.
    pub fn force_state(&self, online: bool) {
        self.set_state(online);
    }

    /// Called by collaborators that hit a transport failure on an ordinary
    /// remote call: evidence of unreachability, same as a failed probe.
    pub fn report_transport_failure(&self) {
        self.set_state(false);
    }

    /// One bounded reachability check against the remote backend. An
    /// application-level error proves the backend answered, so it counts as
    /// online; only a transport failure or timeout flips state to offline.
    pub async fn probe_once(&self) -> bool {
        let deadline = Duration::from_secs(self.config.probe_timeout);
        let online = match timeout(deadline, self.remote.probe()).await {
            Ok(Ok(())) => true,
            Ok(Err(err)) => !err.is_transport(),
            Err(_) => {
                debug!("connectivity probe timed out after {deadline:?}");
                false
            }
        };

        self.set_state(online);
        online
    }

    /// Background probe loop: one probe shortly after startup, then every
    /// `probe_interval`, woken early by online hints.
    pub fn spawn_probe_loop(self: Arc<Self>) -> JoinHandle<()> {
        let interval = Duration::from_secs(self.config.probe_interval);
        tokio::spawn(async move {
            sleep(Duration::from_secs(1)).await;
            loop {
                self.probe_once().await;
                tokio::select! {
                    _ = sleep(interval) => {}
                    _ = self.probe_wake.notified() => {}
                }
            }
        })
    }

    fn set_state(&self, online: bool) {
        let mut guard = self.state.write().expect("connectivity state lock poisoned");
        if *guard == Some(online) {
            return;
        }
        *guard = Some(online);
        drop(guard);

        info!("connectivity changed: online={online}");
        let _ = self.events.send(online);
    }
}
