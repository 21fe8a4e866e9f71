//! In-memory state of the simulated Newsroom service.
//!
//! State is a three-level map `universe -> list -> email -> record`.
//! Records are created on first subscribe and never removed: unsubscribing
//! only clears the `subscribed` flag, so re-subscribing later behaves like
//! the real service.
//!
//! The unsubscribe endpoint names an app but no universe. Every subscribe
//! registers its `topicExtWebsite` as an app of its universe, and
//! [`SubscriptionStateStore::handle_unsubscribe`] resolves the universe from
//! the query's `app`. An app never seen resolves to nothing, so its
//! unsubscribes are 404.
//!
//! # Thread Safety
//!
//! State and the request log sit behind `RwLock`s so one store can be shared
//! between a wiremock responder and the test body. Lock poisoning is reported
//! as [`NewsroomError::Storage`] by the typed API and as HTTP 500 by the
//! `handle_*` API; it never panics.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use super::messages::{thanks_message, ALREADY_REGISTERED, NOT_FOUND, UNSUBSCRIBED};
use crate::models::ApiSubscription;
use crate::request::{split_list_ids, SubscribePayload, SubscriptionsQuery, UnsubscribeQuery};
use crate::{NewsroomError, Result};

/// Per-email state of one list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// Whether the email currently receives the list.
    pub subscribed: bool,
    /// Language recorded at subscribe time.
    #[serde(default)]
    pub language: Option<String>,
    /// Topics recorded at subscribe time.
    #[serde(default)]
    pub topic_ext_ids: Vec<String>,
}

/// `list -> email -> record` for one universe.
pub type UniverseState = BTreeMap<String, BTreeMap<String, SubscriptionRecord>>;

/// Serializable copy of the whole state map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// `universe -> list -> email -> record`.
    pub universes: BTreeMap<String, UniverseState>,
    /// `app -> universe`, registered by subscribe calls.
    #[serde(default)]
    pub apps: BTreeMap<String, String>,
}

/// Endpoint a recorded request was addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MockOperation {
    /// `POST /subscribe`
    Subscribe,
    /// `GET /unsubscribe`
    Unsubscribe,
    /// `GET /subscriptions`
    Subscriptions,
}

/// A request as received by the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedRequest {
    /// Targeted endpoint.
    pub operation: MockOperation,
    /// Payload or query, as JSON. Raw text for undecodable bodies.
    pub params: serde_json::Value,
}

/// Body of a simulated response.
#[derive(Clone, Debug, PartialEq)]
pub enum MockBody {
    /// `application/json` body.
    Json(serde_json::Value),
    /// `text/plain` body.
    Text(String),
}

/// A simulated HTTP response.
#[derive(Clone, Debug, PartialEq)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: MockBody,
}

impl MockResponse {
    fn json(status: u16, value: serde_json::Value) -> Self {
        Self {
            status,
            body: MockBody::Json(value),
        }
    }

    fn text(status: u16, text: impl Into<String>) -> Self {
        Self {
            status,
            body: MockBody::Text(text.into()),
        }
    }

    fn from_error(err: NewsroomError) -> Self {
        match err {
            NewsroomError::InvalidRequest(msg) => Self::text(400, format!("Invalid request: {}", msg)),
            NewsroomError::NotFound { .. } => Self::text(404, NOT_FOUND),
            other => Self::text(500, other.to_string()),
        }
    }

    /// Body rendered as it would travel over the wire.
    pub fn body_string(&self) -> String {
        match &self.body {
            MockBody::Json(value) => value.to_string(),
            MockBody::Text(text) => text.clone(),
        }
    }
}

/// Simulated Newsroom service state.
pub struct SubscriptionStateStore {
    state: RwLock<StoreSnapshot>,
    requests: RwLock<Vec<RecordedRequest>>,
}

fn lock_error(context: &str) -> NewsroomError {
    NewsroomError::Storage(format!(
        "SubscriptionStateStore: lock poisoned during {}",
        context
    ))
}

impl SubscriptionStateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::from_snapshot(StoreSnapshot::default())
    }

    /// Create a store holding `snapshot`.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
            requests: RwLock::new(Vec::new()),
        }
    }

    /// Load a store from a JSON snapshot file. A missing file yields an
    /// empty store.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)?;
        let snapshot: StoreSnapshot = serde_json::from_str(&json)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Write the state map (not the request log) as JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.snapshot()?)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Copy of the current state map.
    pub fn snapshot(&self) -> Result<StoreSnapshot> {
        let state = self.state.read().map_err(|_| lock_error("snapshot"))?;
        Ok(state.clone())
    }

    /// Forget all subscriptions and recorded requests.
    pub fn reset(&self) {
        // A poisoned lock is recovered here: reset is how tests get back to
        // a clean state.
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = StoreSnapshot::default();
        self.clear_recorded_requests();
    }

    /// Forget recorded requests, keeping subscription state.
    pub fn clear_recorded_requests(&self) {
        self.requests
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Every request received since creation or the last reset, oldest first.
    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .read()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Record for `(universe, list_id, email)`, if any.
    pub fn record(&self, universe: &str, list_id: &str, email: &str) -> Option<SubscriptionRecord> {
        let state = self.state.read().ok()?;
        state
            .universes
            .get(universe)?
            .get(list_id)?
            .get(email)
            .cloned()
    }

    /// Whether `email` currently receives `list_id` in `universe`.
    pub fn is_subscribed(&self, universe: &str, list_id: &str, email: &str) -> bool {
        self.record(universe, list_id, email)
            .is_some_and(|record| record.subscribed)
    }

    /// Subscribe `email` to every list of `list_ids`.
    ///
    /// Returns whether the first list was new for this email. All lists are
    /// marked subscribed with `language` and `topic_ext_ids`, whatever their
    /// previous state.
    pub fn subscribe_lists(
        &self,
        universe: &str,
        email: &str,
        list_ids: &[String],
        language: Option<&str>,
        topic_ext_ids: &[String],
    ) -> Result<bool> {
        let first = list_ids
            .first()
            .ok_or_else(|| NewsroomError::InvalidRequest("no list IDs given".into()))?;

        let mut state = self.state.write().map_err(|_| lock_error("subscribe"))?;
        let lists = state.universes.entry(universe.to_string()).or_default();

        let is_new = !lists
            .get(first)
            .and_then(|emails| emails.get(email))
            .is_some_and(|record| record.subscribed);

        for list_id in list_ids {
            lists.entry(list_id.clone()).or_default().insert(
                email.to_string(),
                SubscriptionRecord {
                    subscribed: true,
                    language: language.map(str::to_string),
                    topic_ext_ids: topic_ext_ids.to_vec(),
                },
            );
        }

        Ok(is_new)
    }

    /// Unsubscribe `email` from `list_id` in `universe`.
    ///
    /// Already unsubscribed records succeed again; a triple never seen is
    /// [`NewsroomError::NotFound`]. Other universes are left untouched.
    pub fn unsubscribe_record(&self, universe: &str, list_id: &str, email: &str) -> Result<()> {
        let mut state = self.state.write().map_err(|_| lock_error("unsubscribe"))?;

        let record = state
            .universes
            .get_mut(universe)
            .and_then(|lists| lists.get_mut(list_id))
            .and_then(|emails| emails.get_mut(email))
            .ok_or_else(|| NewsroomError::not_found(list_id, email))?;

        record.subscribed = false;
        record.language = None;
        record.topic_ext_ids.clear();
        Ok(())
    }

    /// Universe `app` was last registered to by a subscribe call.
    pub fn universe_for_app(&self, app: &str) -> Option<String> {
        let state = self.state.read().ok()?;
        state.apps.get(app).cloned()
    }

    fn register_app(&self, app: &str, universe: &str) -> Result<()> {
        if app.trim().is_empty() {
            return Ok(());
        }
        let mut state = self.state.write().map_err(|_| lock_error("subscribe"))?;
        state.apps.insert(app.to_string(), universe.to_string());
        Ok(())
    }

    /// Lists of `universe` that `email` currently receives.
    ///
    /// With `list_ids`, only those lists are considered, in that order.
    /// Without, every list of the universe is, in list ID order.
    pub fn subscribed_lists(
        &self,
        universe: &str,
        email: &str,
        list_ids: Option<&[String]>,
    ) -> Result<Vec<(String, SubscriptionRecord)>> {
        let state = self.state.read().map_err(|_| lock_error("subscriptions"))?;
        let Some(lists) = state.universes.get(universe) else {
            return Ok(Vec::new());
        };

        let active = |list_id: &String| {
            lists
                .get(list_id)
                .and_then(|emails| emails.get(email))
                .filter(|record| record.subscribed)
                .map(|record| (list_id.clone(), record.clone()))
        };

        Ok(match list_ids {
            Some(ids) => ids.iter().filter_map(active).collect(),
            None => lists.keys().filter_map(active).collect(),
        })
    }

    // ========================================================================
    // Endpoint handlers
    // ========================================================================

    /// Handle `POST /subscribe` with an already decoded payload.
    ///
    /// The first of list IDs followed by related list IDs decides the
    /// reported result; every one of them ends up subscribed. The response
    /// array holds that single reported entry.
    pub fn handle_subscribe(&self, payload: &SubscribePayload) -> MockResponse {
        self.log(
            MockOperation::Subscribe,
            serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        );

        match self.subscribe_payload(payload) {
            Ok(entry) => MockResponse::json(200, serde_json::json!([entry])),
            Err(err) => MockResponse::from_error(err),
        }
    }

    /// Handle `POST /subscribe` with a raw request body.
    pub fn handle_subscribe_body(&self, body: &[u8]) -> MockResponse {
        match serde_json::from_slice::<SubscribePayload>(body) {
            Ok(payload) => self.handle_subscribe(&payload),
            Err(err) => {
                self.log(
                    MockOperation::Subscribe,
                    serde_json::Value::String(String::from_utf8_lossy(body).into_owned()),
                );
                MockResponse::text(400, format!("Invalid request: {}", err))
            }
        }
    }

    /// Handle `GET /unsubscribe` for one list, in the universe registered
    /// for the query's `app`.
    pub fn handle_unsubscribe(&self, query: &UnsubscribeQuery) -> MockResponse {
        match self.universe_for_app(&query.app) {
            Some(universe) => self.handle_unsubscribe_in(&universe, query),
            None => {
                self.log_unsubscribe(query);
                MockResponse::text(404, NOT_FOUND)
            }
        }
    }

    /// Handle `GET /unsubscribe` for one list of a known `universe`.
    pub fn handle_unsubscribe_in(&self, universe: &str, query: &UnsubscribeQuery) -> MockResponse {
        self.log_unsubscribe(query);

        match self.unsubscribe_record(universe, &query.sv_id, &query.user_email) {
            Ok(()) => MockResponse::text(200, UNSUBSCRIBED),
            Err(err) => MockResponse::from_error(err),
        }
    }

    fn log_unsubscribe(&self, query: &UnsubscribeQuery) {
        self.log(
            MockOperation::Unsubscribe,
            serde_json::to_value(query).unwrap_or(serde_json::Value::Null),
        );
    }

    /// Handle `GET /subscriptions`.
    pub fn handle_subscriptions_query(&self, query: &SubscriptionsQuery) -> MockResponse {
        self.log(
            MockOperation::Subscriptions,
            serde_json::to_value(query).unwrap_or(serde_json::Value::Null),
        );

        let list_ids = query.list_ids();
        match self.subscribed_lists(&query.universe_acronym, &query.user_email, list_ids.as_deref())
        {
            Ok(lists) => {
                let entries: Vec<ApiSubscription> = lists
                    .into_iter()
                    .map(|(list_id, record)| {
                        subscription_entry(
                            &query.universe_acronym,
                            &list_id,
                            &query.user_email,
                            record.language,
                            false,
                            None,
                        )
                    })
                    .collect();
                MockResponse::json(200, serde_json::json!(entries))
            }
            Err(err) => MockResponse::from_error(err),
        }
    }

    fn subscribe_payload(&self, payload: &SubscribePayload) -> Result<ApiSubscription> {
        let fields = &payload.subscription;
        for (name, value) in [
            ("key", &payload.key),
            ("universeAcronym", &fields.universe_acronym),
            ("email", &fields.email),
            ("sv_id", &fields.sv_id),
        ] {
            if value.trim().is_empty() {
                return Err(NewsroomError::InvalidRequest(format!("missing {}", name)));
            }
        }

        let mut list_ids = split_list_ids(&fields.sv_id);
        if let Some(related) = &fields.related_sv_id {
            for id in split_list_ids(related) {
                if !list_ids.contains(&id) {
                    list_ids.push(id);
                }
            }
        }
        let topics = fields
            .topic_ext_id
            .as_deref()
            .map(split_list_ids)
            .unwrap_or_default();

        let is_new = self.subscribe_lists(
            &fields.universe_acronym,
            &fields.email,
            &list_ids,
            fields.language.as_deref(),
            &topics,
        )?;
        self.register_app(&fields.topic_ext_website, &fields.universe_acronym)?;

        let feedback = if is_new {
            thanks_message(fields.language.as_deref())
        } else {
            ALREADY_REGISTERED.to_string()
        };

        Ok(subscription_entry(
            &fields.universe_acronym,
            &list_ids[0],
            &fields.email,
            fields.language.clone(),
            is_new,
            Some(feedback),
        ))
    }

    fn log(&self, operation: MockOperation, params: serde_json::Value) {
        #[cfg(feature = "tracing")]
        tracing::debug!(?operation, "mock newsroom request");

        self.requests
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedRequest { operation, params });
    }
}

impl Default for SubscriptionStateStore {
    fn default() -> Self {
        Self::new()
    }
}

fn subscription_entry(
    universe: &str,
    list_id: &str,
    email: &str,
    language: Option<String>,
    is_new: bool,
    feedback: Option<String>,
) -> ApiSubscription {
    ApiSubscription {
        newsletter_id: Some(list_id.to_string()),
        newsletter_name: Some(format!("Newsletter {}", list_id)),
        universe_acronym: Some(universe.to_string()),
        email: Some(email.to_string()),
        is_new_subscription: Some(is_new),
        feedback_message: feedback,
        language,
        status: Some("Valid".to_string()),
        unsubscription_link: Some(format!(
            "https://ec.europa.eu/newsroom/{}/user-subscriptions/unsubscribe/{}",
            universe.to_lowercase(),
            list_id
        )),
        profile_link: Some(format!(
            "https://ec.europa.eu/newsroom/{}/user-profile",
            universe.to_lowercase()
        )),
    }
}
