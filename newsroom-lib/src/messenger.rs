//! The messenger capability and its two deployment modes.
//!
//! [`NewsroomMessenger`] is what the page layer talks to. Exactly one
//! implementation is chosen when the messenger is built, from an explicit
//! [`MessengerBackend`]:
//!
//! - [`MessengerBackend::Remote`] -> [`NewsroomClient`] over HTTP
//! - [`MessengerBackend::Mock`] -> [`MockMessenger`] over an in-process
//!   [`SubscriptionStateStore`]
//!
//! The trait is the strict mode: every failure is a typed error.
//! [`LenientMessenger`] wraps any messenger into the lenient mode, which
//! logs failures and returns `None`/`false` instead.

use std::sync::Arc;

use async_trait::async_trait;

use crate::client::NewsroomClient;
use crate::config::ClientConfiguration;
use crate::mock::{MockMessenger, SubscriptionStateStore};
use crate::models::Subscription;
use crate::request::SubscriptionRequest;
use crate::{NewsroomError, Result};

/// Subscribe/unsubscribe/lookup capability against one Newsroom universe.
#[async_trait]
pub trait NewsroomMessenger: Send + Sync {
    /// True when the underlying configuration is complete.
    fn is_configured(&self) -> bool;

    /// Subscribe to every list of `request`; report the first requested list.
    async fn subscribe(&self, request: &SubscriptionRequest) -> Result<Subscription>;

    /// Leave each list in order; `false` at the first unconfirmed list.
    async fn unsubscribe(&self, email: &str, list_ids: &[String]) -> Result<bool>;

    /// Whether `email` is subscribed to any of `list_ids`.
    async fn is_subscribed(&self, email: &str, list_ids: &[String]) -> Result<bool>;
}

/// Which implementation [`create_messenger`] resolves.
#[derive(Clone)]
pub enum MessengerBackend {
    /// The real service at `ClientConfiguration::base_url`.
    Remote,
    /// The in-process simulation backed by the given store.
    Mock(Arc<SubscriptionStateStore>),
}

impl std::fmt::Debug for MessengerBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote => f.write_str("Remote"),
            Self::Mock(_) => f.write_str("Mock"),
        }
    }
}

/// Build the messenger for `backend`.
pub fn create_messenger(
    config: ClientConfiguration,
    backend: MessengerBackend,
) -> Result<Arc<dyn NewsroomMessenger>> {
    #[cfg(feature = "tracing")]
    tracing::debug!(?backend, universe = %config.universe_acronym, "creating newsroom messenger");

    match backend {
        MessengerBackend::Remote => Ok(Arc::new(NewsroomClient::new(config)?)),
        MessengerBackend::Mock(store) => Ok(Arc::new(MockMessenger::new(config, store))),
    }
}

/// Lenient wrapper: failures are logged and turned into sentinel values.
///
/// | operation       | success          | not configured | other failure  |
/// |-----------------|------------------|----------------|----------------|
/// | `subscribe`     | `Some(sub)`      | `None`         | `None`         |
/// | `unsubscribe`   | `Some(bool)`     | `None`         | `Some(false)`  |
/// | `is_subscribed` | `bool`           | `false`        | `false`        |
pub struct LenientMessenger<M: ?Sized> {
    inner: Arc<M>,
}

impl<M: NewsroomMessenger + ?Sized> LenientMessenger<M> {
    /// Wrap a strict messenger.
    pub fn new(inner: Arc<M>) -> Self {
        Self { inner }
    }

    /// The wrapped strict messenger.
    pub fn inner(&self) -> &Arc<M> {
        &self.inner
    }

    /// True when the wrapped messenger is configured.
    pub fn is_configured(&self) -> bool {
        self.inner.is_configured()
    }

    /// Subscribe, or `None` on any failure.
    pub async fn subscribe(&self, request: &SubscriptionRequest) -> Option<Subscription> {
        match self.inner.subscribe(request).await {
            Ok(subscription) => Some(subscription),
            Err(err) => {
                log_failure("subscribe", &err);
                None
            }
        }
    }

    /// Unsubscribe; `None` when not configured, `Some(false)` on failure.
    pub async fn unsubscribe(&self, email: &str, list_ids: &[String]) -> Option<bool> {
        match self.inner.unsubscribe(email, list_ids).await {
            Ok(done) => Some(done),
            Err(err @ NewsroomError::NotConfigured { .. }) => {
                log_failure("unsubscribe", &err);
                None
            }
            Err(err) => {
                log_failure("unsubscribe", &err);
                Some(false)
            }
        }
    }

    /// Subscription lookup, `false` on any failure.
    pub async fn is_subscribed(&self, email: &str, list_ids: &[String]) -> bool {
        match self.inner.is_subscribed(email, list_ids).await {
            Ok(subscribed) => subscribed,
            Err(err) => {
                log_failure("is_subscribed", &err);
                false
            }
        }
    }
}

#[cfg(feature = "tracing")]
fn log_failure(operation: &str, err: &NewsroomError) {
    tracing::warn!(code = ?err.code(), "newsroom {} failed: {}", operation, err);
}

#[cfg(not(feature = "tracing"))]
fn log_failure(operation: &str, err: &NewsroomError) {
    eprintln!("newsroom {} failed: {}", operation, err);
}
