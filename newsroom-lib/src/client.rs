//! HTTP client for the Newsroom subscription API.
//!
//! # Example
//!
//! ```rust,ignore
//! use newsroom_lib::{ClientConfiguration, NewsroomClient, SubscriptionRequest};
//!
//! let config = ClientConfiguration::new("TESTU", "my-site", "shared-secret");
//! let client = NewsroomClient::new(config)?;
//!
//! let request = SubscriptionRequest::new("someone@example.com", ["1111"]).with_language("en");
//! let subscription = client.subscribe(&request).await?;
//! println!("{}", subscription.feedback_message);
//!
//! let still_there = client.is_subscribed("someone@example.com", &["1111".into()]).await?;
//! ```
//!
//! Every operation checks the configuration first and fails with
//! [`NewsroomError::NotConfigured`] without touching the network when it is
//! incomplete. Nothing is retried.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::ClientConfiguration;
use crate::key::normalize_email;
use crate::messenger::NewsroomMessenger;
use crate::models::Subscription;
use crate::request::{
    build_subscribe_payload, build_subscriptions_query, build_unsubscribe_queries,
    validate_list_ids, SubscriptionRequest, SUBSCRIBE_PATH, SUBSCRIPTIONS_PATH, UNSUBSCRIBE_PATH,
};
use crate::response::{interpret_subscribe, interpret_subscriptions, interpret_unsubscribe};
use crate::{NewsroomError, Result};

/// Client for one Newsroom universe.
///
/// Holds nothing but its configuration and a connection pool; every call is
/// an independent request/response cycle.
pub struct NewsroomClient {
    config: ClientConfiguration,
    http: reqwest::Client,
}

impl NewsroomClient {
    /// Create a client for the given configuration.
    ///
    /// An incomplete configuration is accepted here; operations reject it.
    /// A zero timeout is not.
    pub fn new(config: ClientConfiguration) -> Result<Self> {
        config.require_valid_timeout()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                NewsroomError::ServiceUnavailable(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self { config, http })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ClientConfiguration {
        &self.config
    }

    /// True when universe, app id and secret are set.
    pub fn is_configured(&self) -> bool {
        self.config.is_complete()
    }

    /// Fail with [`NewsroomError::NotConfigured`] unless configured.
    pub fn require_configured(&self) -> Result<()> {
        self.config.require_complete()
    }

    /// Build the full URL for an API path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Map reqwest errors raised before a status was obtained.
    fn map_reqwest_error(&self, operation: &str, e: reqwest::Error) -> NewsroomError {
        if e.is_timeout() {
            NewsroomError::ServiceUnavailable(format!(
                "{} timed out after {}s",
                operation, self.config.timeout_secs
            ))
        } else if e.is_connect() {
            NewsroomError::ServiceUnavailable(format!(
                "{}: cannot reach {}: {}",
                operation, self.config.base_url, e
            ))
        } else {
            NewsroomError::invalid_response_from(format!("{} request failed", operation), e)
        }
    }

    /// Subscribe to every list of `request` in one call.
    ///
    /// Returns the entry for the first requested list ID present in the
    /// response, searched in request order.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, request), fields(universe = %self.config.universe_acronym, lists = %request.list_ids.join(","))))]
    pub async fn subscribe(&self, request: &SubscriptionRequest) -> Result<Subscription> {
        self.require_configured()?;
        request.validate()?;

        let payload = build_subscribe_payload(request, &self.config);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            related = ?payload.subscription.related_sv_id,
            topics = ?payload.subscription.topic_ext_id,
            "sending subscribe request"
        );

        let response = self
            .http
            .post(self.url(SUBSCRIBE_PATH))
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error("subscribe", e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            NewsroomError::invalid_response_from("failed to read subscribe response", e)
        })?;

        let result = interpret_subscribe(
            status,
            &body,
            request,
            &payload.subscription.email,
            &self.config.universe_acronym,
        );
        #[cfg(feature = "tracing")]
        {
            if let Err(err) = &result {
                tracing::warn!(status, "subscribe failed: {}", err);
            }
        }
        result
    }

    /// Leave every list in `list_ids`, one request per list, in order.
    ///
    /// Stops at the first list the remote does not confirm and returns
    /// `false`; the remaining lists are not attempted.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, email, list_ids), fields(universe = %self.config.universe_acronym, lists = %list_ids.join(","))))]
    pub async fn unsubscribe(&self, email: &str, list_ids: &[String]) -> Result<bool> {
        self.require_configured()?;
        require_email(email)?;
        validate_list_ids(list_ids)?;

        for query in build_unsubscribe_queries(email, list_ids, &self.config) {
            let response = self
                .http
                .get(self.url(UNSUBSCRIBE_PATH))
                .query(&query)
                .send()
                .await
                .map_err(|e| self.map_reqwest_error("unsubscribe", e))?;

            let status = response.status().as_u16();
            if !interpret_unsubscribe(status) {
                #[cfg(feature = "tracing")]
                tracing::warn!(status, list = %query.sv_id, "unsubscribe not confirmed");
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Whether `email` holds at least one subscription among `list_ids`.
    ///
    /// An empty `list_ids` asks about any list of the universe.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, email, list_ids), fields(universe = %self.config.universe_acronym, lists = %list_ids.join(","))))]
    pub async fn is_subscribed(&self, email: &str, list_ids: &[String]) -> Result<bool> {
        self.require_configured()?;
        require_email(email)?;

        let query = build_subscriptions_query(email, list_ids, &self.config);
        let response = self
            .http
            .get(self.url(SUBSCRIPTIONS_PATH))
            .query(&query)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error("subscriptions lookup", e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            NewsroomError::invalid_response_from("failed to read subscriptions response", e)
        })?;

        interpret_subscriptions(status, &body)
    }

    /// The email as this client sends it.
    pub fn wire_email(&self, email: &str) -> String {
        normalize_email(email, self.config.normalize_email)
    }
}

pub(crate) fn require_email(email: &str) -> Result<()> {
    if email.trim().is_empty() {
        Err(NewsroomError::InvalidRequest("email is empty".into()))
    } else {
        Ok(())
    }
}

#[async_trait]
impl NewsroomMessenger for NewsroomClient {
    fn is_configured(&self) -> bool {
        NewsroomClient::is_configured(self)
    }

    async fn subscribe(&self, request: &SubscriptionRequest) -> Result<Subscription> {
        NewsroomClient::subscribe(self, request).await
    }

    async fn unsubscribe(&self, email: &str, list_ids: &[String]) -> Result<bool> {
        NewsroomClient::unsubscribe(self, email, list_ids).await
    }

    async fn is_subscribed(&self, email: &str, list_ids: &[String]) -> Result<bool> {
        NewsroomClient::is_subscribed(self, email, list_ids).await
    }
}
