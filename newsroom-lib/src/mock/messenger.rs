//! In-process messenger backed by a [`SubscriptionStateStore`].

use std::sync::Arc;

use async_trait::async_trait;

use super::store::SubscriptionStateStore;
use crate::client::require_email;
use crate::config::ClientConfiguration;
use crate::messenger::NewsroomMessenger;
use crate::models::Subscription;
use crate::request::{
    build_subscribe_payload, build_subscriptions_query, build_unsubscribe_queries,
    validate_list_ids, SubscriptionRequest,
};
use crate::response::{interpret_subscribe, interpret_subscriptions, interpret_unsubscribe};
use crate::Result;

/// Messenger that talks to a store directly instead of over HTTP.
///
/// Requests are built and responses interpreted by the same code as
/// [`NewsroomClient`](crate::NewsroomClient), so results and errors match the
/// remote path.
pub struct MockMessenger {
    config: ClientConfiguration,
    store: Arc<SubscriptionStateStore>,
}

impl MockMessenger {
    /// Create a messenger over `store`.
    pub fn new(config: ClientConfiguration, store: Arc<SubscriptionStateStore>) -> Self {
        Self { config, store }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ClientConfiguration {
        &self.config
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<SubscriptionStateStore> {
        &self.store
    }
}

#[async_trait]
impl NewsroomMessenger for MockMessenger {
    fn is_configured(&self) -> bool {
        self.config.is_complete()
    }

    async fn subscribe(&self, request: &SubscriptionRequest) -> Result<Subscription> {
        self.config.require_complete()?;
        request.validate()?;

        let payload = build_subscribe_payload(request, &self.config);
        let response = self.store.handle_subscribe(&payload);

        interpret_subscribe(
            response.status,
            &response.body_string(),
            request,
            &payload.subscription.email,
            &self.config.universe_acronym,
        )
    }

    async fn unsubscribe(&self, email: &str, list_ids: &[String]) -> Result<bool> {
        self.config.require_complete()?;
        require_email(email)?;
        validate_list_ids(list_ids)?;

        for query in build_unsubscribe_queries(email, list_ids, &self.config) {
            let response = self
                .store
                .handle_unsubscribe_in(&self.config.universe_acronym, &query);
            if !interpret_unsubscribe(response.status) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn is_subscribed(&self, email: &str, list_ids: &[String]) -> Result<bool> {
        self.config.require_complete()?;
        require_email(email)?;

        let query = build_subscriptions_query(email, list_ids, &self.config);
        let response = self.store.handle_subscriptions_query(&query);
        interpret_subscriptions(response.status, &response.body_string())
    }
}
