//! The mock service over real HTTP.
//!
//! [`MockNewsroomServer`] starts a wiremock [`MockServer`] on a random local
//! port and mounts one responder per Newsroom endpoint, each delegating to a
//! shared [`SubscriptionStateStore`]. Point a [`NewsroomClient`] at
//! [`MockNewsroomServer::uri`] to run the full client stack without the
//! remote service.
//!
//! ```rust,ignore
//! let server = MockNewsroomServer::start().await;
//! let client = NewsroomClient::new(server.configure(config))?;
//! client.subscribe(&request).await?;
//! assert!(server.store().is_subscribed("TESTU", "1111", "a@b.eu"));
//! ```
//!
//! [`NewsroomClient`]: crate::NewsroomClient

use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use super::store::{MockBody, MockResponse, SubscriptionStateStore};
use crate::config::ClientConfiguration;
use crate::request::{
    SubscriptionsQuery, UnsubscribeQuery, SUBSCRIBE_PATH, SUBSCRIPTIONS_PATH, UNSUBSCRIBE_PATH,
};

/// A running HTTP mock of the Newsroom API.
pub struct MockNewsroomServer {
    server: MockServer,
    store: Arc<SubscriptionStateStore>,
}

impl MockNewsroomServer {
    /// Start a server over a fresh store.
    pub async fn start() -> Self {
        Self::start_with_store(Arc::new(SubscriptionStateStore::new())).await
    }

    /// Start a server over an existing store.
    pub async fn start_with_store(store: Arc<SubscriptionStateStore>) -> Self {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SUBSCRIBE_PATH))
            .respond_with(SubscribeResponder(store.clone()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(UNSUBSCRIBE_PATH))
            .respond_with(UnsubscribeResponder(store.clone()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(SUBSCRIPTIONS_PATH))
            .respond_with(SubscriptionsResponder(store.clone()))
            .mount(&server)
            .await;

        #[cfg(feature = "tracing")]
        tracing::debug!(uri = %server.uri(), "mock newsroom server started");

        Self { server, store }
    }

    /// Base URL of the server, e.g. `http://127.0.0.1:49152`.
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// The store behind the server.
    pub fn store(&self) -> &Arc<SubscriptionStateStore> {
        &self.store
    }

    /// `config` with its base URL pointed at this server.
    pub fn configure(&self, config: ClientConfiguration) -> ClientConfiguration {
        config.with_base_url(self.uri())
    }
}

struct SubscribeResponder(Arc<SubscriptionStateStore>);

impl Respond for SubscribeResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        to_template(self.0.handle_subscribe_body(&request.body))
    }
}

struct UnsubscribeResponder(Arc<SubscriptionStateStore>);

impl Respond for UnsubscribeResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        match UnsubscribeQuery::from_pairs(request.url.query_pairs()) {
            Ok(query) => to_template(self.0.handle_unsubscribe(&query)),
            Err(err) => ResponseTemplate::new(400).set_body_string(err.to_string()),
        }
    }
}

struct SubscriptionsResponder(Arc<SubscriptionStateStore>);

impl Respond for SubscriptionsResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        match SubscriptionsQuery::from_pairs(request.url.query_pairs()) {
            Ok(query) => to_template(self.0.handle_subscriptions_query(&query)),
            Err(err) => ResponseTemplate::new(400).set_body_string(err.to_string()),
        }
    }
}

fn to_template(response: MockResponse) -> ResponseTemplate {
    let template = ResponseTemplate::new(response.status);
    match response.body {
        MockBody::Json(value) => template.set_body_json(value),
        MockBody::Text(text) => template.set_body_string(text),
    }
}
