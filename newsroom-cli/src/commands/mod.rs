//! CLI command implementations

pub mod key;
pub mod status;
pub mod subscribe;
pub mod unsubscribe;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use newsroom_lib::mock::SubscriptionStateStore;
use newsroom_lib::{
    create_messenger, ClientConfiguration, LenientMessenger, MessengerBackend, NewsroomMessenger,
    Subscription, SubscriptionRequest,
};

/// Load the configuration from `path`, or from `NEWSROOM_*` env vars.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfiguration> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&json)
                .with_context(|| format!("Invalid config file {}", path.display()))
        }
        None => Ok(ClientConfiguration::from_env()?),
    }
}

/// The messenger a command runs against, in strict or lenient mode.
pub struct Session {
    config: ClientConfiguration,
    messenger: Arc<dyn NewsroomMessenger>,
    lenient: Option<LenientMessenger<dyn NewsroomMessenger>>,
    store: Option<Arc<SubscriptionStateStore>>,
    state_file: Option<PathBuf>,
}

impl Session {
    /// Build the messenger for the selected backend.
    pub fn open(
        config: ClientConfiguration,
        mock: bool,
        state_file: Option<PathBuf>,
        lenient: bool,
    ) -> Result<Self> {
        let store = if mock {
            let store = match &state_file {
                Some(path) => SubscriptionStateStore::load_from_file(path)
                    .with_context(|| format!("Failed to load mock state {}", path.display()))?,
                None => SubscriptionStateStore::new(),
            };
            Some(Arc::new(store))
        } else {
            None
        };

        let backend = match &store {
            Some(store) => MessengerBackend::Mock(store.clone()),
            None => MessengerBackend::Remote,
        };
        tracing::debug!(?backend, lenient, "opening session");

        let messenger = create_messenger(config.clone(), backend)?;
        let lenient = lenient.then(|| LenientMessenger::new(messenger.clone()));

        Ok(Self {
            config,
            messenger,
            lenient,
            store,
            state_file,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &ClientConfiguration {
        &self.config
    }

    /// True when failures are reported as warnings.
    pub fn is_lenient(&self) -> bool {
        self.lenient.is_some()
    }

    /// True when running against the local mock.
    pub fn is_mock(&self) -> bool {
        self.store.is_some()
    }

    /// Subscribe; `Ok(None)` is a failure already reported in lenient mode.
    pub async fn subscribe(&self, request: &SubscriptionRequest) -> Result<Option<Subscription>> {
        match &self.lenient {
            Some(lenient) => Ok(lenient.subscribe(request).await),
            None => Ok(Some(self.messenger.subscribe(request).await?)),
        }
    }

    /// Unsubscribe; `Ok(None)` means not configured in lenient mode.
    pub async fn unsubscribe(&self, email: &str, list_ids: &[String]) -> Result<Option<bool>> {
        match &self.lenient {
            Some(lenient) => Ok(lenient.unsubscribe(email, list_ids).await),
            None => Ok(Some(self.messenger.unsubscribe(email, list_ids).await?)),
        }
    }

    /// Subscription lookup.
    pub async fn is_subscribed(&self, email: &str, list_ids: &[String]) -> Result<bool> {
        match &self.lenient {
            Some(lenient) => Ok(lenient.is_subscribed(email, list_ids).await),
            None => Ok(self.messenger.is_subscribed(email, list_ids).await?),
        }
    }

    /// Persist mock state if a state file was given.
    pub fn close(&self) -> Result<()> {
        if let (Some(store), Some(path)) = (&self.store, &self.state_file) {
            store
                .save_to_file(path)
                .with_context(|| format!("Failed to save mock state {}", path.display()))?;
            tracing::debug!(path = %path.display(), "mock state saved");
        }
        Ok(())
    }
}
