use crate::domain::value_objects::Mode;
use crate::infrastructure::database::LocalStore;
use crate::shared::error::Result;
use tokio::sync::watch;
use tracing::info;

const MODE_SETTING_KEY: &str = "mode";

/// Holds the process-wide mode and persists changes. Enforcement of what a
/// mode means lives in the facade and the reconciler.
pub struct ModeController {
    store: LocalStore,
    mode_tx: watch::Sender<Mode>,
}

impl ModeController {
    /// Reads the persisted mode once at startup; defaults to `online`.
    pub async fn load(store: LocalStore) -> Result<Self> {
        let mode = store
            .get_setting(MODE_SETTING_KEY)
            .await?
            .map(|value| Mode::from(value.as_str()))
            .unwrap_or_default();

        let (mode_tx, _) = watch::channel(mode);
        Ok(Self { store, mode_tx })
    }

    pub fn mode(&self) -> Mode {
        *self.mode_tx.borrow()
    }

    /// Persists before publishing, so a crash between the two leaves the
    /// durable value ahead of the in-memory one, never behind.
    pub async fn set_mode(&self, mode: Mode) -> Result<()> {
        self.store.put_setting(MODE_SETTING_KEY, mode.as_str()).await?;
        if self.mode() != mode {
            info!("mode changed: {mode}");
            self.mode_tx.send_replace(mode);
        }
        Ok(())
    }

    pub fn subscribe(&self) -> watch::Receiver<Mode> {
        self.mode_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::ConnectionPool;

    async fn setup_store() -> (ConnectionPool, LocalStore) {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        let store = LocalStore::new(pool.get_pool().clone());
        (pool, store)
    }

    #[tokio::test]
    async fn defaults_to_online_when_nothing_is_persisted() {
        let (_pool, store) = setup_store().await;
        let controller = ModeController::load(store).await.unwrap();
        assert_eq!(controller.mode(), Mode::Online);
    }

    #[tokio::test]
    async fn set_mode_persists_across_controllers() {
        let (_pool, store) = setup_store().await;

        let controller = ModeController::load(store.clone()).await.unwrap();
        controller.set_mode(Mode::Hybrid).await.unwrap();

        let reloaded = ModeController::load(store).await.unwrap();
        assert_eq!(reloaded.mode(), Mode::Hybrid);
    }

    #[tokio::test]
    async fn subscribers_see_mode_changes() {
        let (_pool, store) = setup_store().await;
        let controller = ModeController::load(store).await.unwrap();
        let mut rx = controller.subscribe();

        controller.set_mode(Mode::Offline).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Mode::Offline);
    }
}
