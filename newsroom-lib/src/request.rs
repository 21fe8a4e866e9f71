//! Request building for the Newsroom API.
//!
//! Turns a [`SubscriptionRequest`] plus a [`ClientConfiguration`] into the
//! exact wire shapes the remote service expects:
//!
//! - subscribe: one JSON [`SubscribePayload`] covering every list ID
//! - unsubscribe: one [`UnsubscribeQuery`] per list ID (the remote has no
//!   batched unsubscribe)
//! - subscriptions lookup: one [`SubscriptionsQuery`]
//!
//! The same types are deserialized by the mock service, so both sides agree
//! on field names by construction.

use serde::{Deserialize, Serialize};

use crate::config::ClientConfiguration;
use crate::key::{derive_key_for, normalize_email};
use crate::{NewsroomError, Result};

/// Path of the subscribe endpoint, relative to the API host.
pub const SUBSCRIBE_PATH: &str = "/newsroom/api/v1/subscribe";
/// Path of the unsubscribe endpoint, relative to the API host.
pub const UNSUBSCRIBE_PATH: &str = "/newsroom/api/v1/unsubscribe";
/// Path of the subscriptions lookup endpoint, relative to the API host.
pub const SUBSCRIPTIONS_PATH: &str = "/newsroom/api/v1/subscriptions";

/// A subscribe or unsubscribe request as issued by the page layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    /// Subscriber email, as entered.
    pub email: String,
    /// Lists the user asked to join, in the order given. Duplicates are
    /// removed by the constructors, and again when the payload is built, so
    /// a request deserialized or filled in field by field is safe too.
    pub list_ids: Vec<String>,
    /// Lists to enroll in alongside, without being reported back.
    #[serde(default)]
    pub related_list_ids: Vec<String>,
    /// Preferred language code.
    #[serde(default)]
    pub language: Option<String>,
    /// Topic identifiers to attach to the subscription.
    #[serde(default)]
    pub topic_ext_ids: Vec<String>,
}

impl SubscriptionRequest {
    /// Create a request for `email` and the given list IDs.
    pub fn new<I, S>(email: impl Into<String>, list_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            email: email.into(),
            list_ids: dedup_ids(list_ids),
            ..Default::default()
        }
    }

    /// Set the related list IDs.
    pub fn with_related_list_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related_list_ids = dedup_ids(ids);
        self
    }

    /// Set the preferred language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the topic identifiers.
    pub fn with_topic_ext_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topic_ext_ids = dedup_ids(ids);
        self
    }

    /// Reject requests that cannot be sent.
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            return Err(NewsroomError::InvalidRequest("email is empty".into()));
        }
        validate_list_ids(&self.list_ids)
    }

    /// List IDs followed by related list IDs, without duplicates.
    pub fn merged_list_ids(&self) -> Vec<String> {
        dedup_ids(self.list_ids.iter().chain(self.related_list_ids.iter()).cloned())
    }
}

pub(crate) fn validate_list_ids(list_ids: &[String]) -> Result<()> {
    if list_ids.is_empty() {
        return Err(NewsroomError::InvalidRequest("no list IDs given".into()));
    }
    if list_ids.iter().any(|id| id.trim().is_empty()) {
        return Err(NewsroomError::InvalidRequest("empty list ID".into()));
    }
    Ok(())
}

/// Body of `POST /newsroom/api/v1/subscribe`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribePayload {
    /// Derived request key.
    pub key: String,
    /// Subscription details.
    pub subscription: SubscriptionFields,
}

/// The `subscription` object of a subscribe payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionFields {
    /// Universe acronym.
    pub universe_acronym: String,
    /// App identifier.
    pub topic_ext_website: String,
    /// Comma-joined list IDs.
    #[serde(rename = "sv_id")]
    pub sv_id: String,
    /// Subscriber email, normalized if configured.
    pub email: String,
    /// Preferred language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Comma-joined related list IDs.
    #[serde(rename = "relatedSv_Id", default, skip_serializing_if = "Option::is_none")]
    pub related_sv_id: Option<String>,
    /// Comma-joined topic identifiers.
    #[serde(rename = "topicExtId", default, skip_serializing_if = "Option::is_none")]
    pub topic_ext_id: Option<String>,
}

/// Query of `GET /newsroom/api/v1/unsubscribe`, for a single list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsubscribeQuery {
    /// Subscriber email, normalized if configured.
    pub user_email: String,
    /// Derived request key.
    pub key: String,
    /// App identifier.
    pub app: String,
    /// The one list to leave.
    pub sv_id: String,
}

impl UnsubscribeQuery {
    /// Parse from decoded query pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut fields = QueryFields::default();
        for (name, value) in pairs {
            fields.set(name.as_ref(), value.into());
        }
        Ok(Self {
            user_email: fields.required("user_email", fields.user_email.clone())?,
            key: fields.required("key", fields.key.clone())?,
            app: fields.app.clone().unwrap_or_default(),
            sv_id: fields.required("sv_id", fields.single_sv_id())?,
        })
    }
}

/// Query of `GET /newsroom/api/v1/subscriptions`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionsQuery {
    /// Subscriber email, normalized if configured.
    pub user_email: String,
    /// Derived request key.
    pub key: String,
    /// Universe acronym.
    pub universe_acronym: String,
    /// App identifier.
    pub app: String,
    /// List IDs to restrict the lookup to, sent comma-joined in a single
    /// `sv_id` parameter (`sv_id=1111,2222`). The API documentation shows
    /// repeated `sv_id[]` parameters instead. The mock service parses both
    /// forms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sv_id: Option<String>,
}

impl SubscriptionsQuery {
    /// Parse from decoded query pairs. Accepts both a comma-joined `sv_id`
    /// and repeated `sv_id[]` parameters.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut fields = QueryFields::default();
        for (name, value) in pairs {
            fields.set(name.as_ref(), value.into());
        }
        let sv_id = if fields.sv_ids.is_empty() {
            None
        } else {
            Some(fields.sv_ids.join(","))
        };
        Ok(Self {
            user_email: fields.required("user_email", fields.user_email.clone())?,
            key: fields.required("key", fields.key.clone())?,
            universe_acronym: fields
                .required("universe_acronym", fields.universe_acronym.clone())?,
            app: fields.app.clone().unwrap_or_default(),
            sv_id,
        })
    }

    /// The requested list IDs, if the lookup is restricted.
    pub fn list_ids(&self) -> Option<Vec<String>> {
        self.sv_id.as_deref().map(split_list_ids)
    }
}

#[derive(Default)]
struct QueryFields {
    user_email: Option<String>,
    key: Option<String>,
    app: Option<String>,
    universe_acronym: Option<String>,
    sv_ids: Vec<String>,
}

impl QueryFields {
    fn set(&mut self, name: &str, value: String) {
        match name {
            "user_email" => self.user_email = Some(value),
            "key" => self.key = Some(value),
            "app" => self.app = Some(value),
            "universe_acronym" => self.universe_acronym = Some(value),
            "sv_id" | "sv_id[]" => self.sv_ids.extend(split_list_ids(&value)),
            _ => {}
        }
    }

    fn single_sv_id(&self) -> Option<String> {
        match self.sv_ids.as_slice() {
            [one] => Some(one.clone()),
            _ => None,
        }
    }

    fn required(&self, name: &str, value: Option<String>) -> Result<String> {
        match value {
            Some(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(NewsroomError::InvalidRequest(format!(
                "missing query parameter `{}`",
                name
            ))),
        }
    }
}

/// Build the subscribe payload for `request`.
pub fn build_subscribe_payload(
    request: &SubscriptionRequest,
    config: &ClientConfiguration,
) -> SubscribePayload {
    SubscribePayload {
        key: derive_key_for(config, &request.email),
        subscription: SubscriptionFields {
            universe_acronym: config.universe_acronym.clone(),
            topic_ext_website: config.app_id.clone(),
            sv_id: join_list_ids(&request.list_ids),
            email: normalize_email(&request.email, config.normalize_email),
            language: request.language.clone(),
            related_sv_id: join_non_empty(&request.related_list_ids),
            topic_ext_id: join_non_empty(&request.topic_ext_ids),
        },
    }
}

/// Build one unsubscribe query per distinct list ID, preserving order.
pub fn build_unsubscribe_queries(
    email: &str,
    list_ids: &[String],
    config: &ClientConfiguration,
) -> Vec<UnsubscribeQuery> {
    let key = derive_key_for(config, email);
    let user_email = normalize_email(email, config.normalize_email);
    dedup_ids(list_ids.iter().cloned())
        .into_iter()
        .map(|sv_id| UnsubscribeQuery {
            user_email: user_email.clone(),
            key: key.clone(),
            app: config.app_id.clone(),
            sv_id,
        })
        .collect()
}

/// Build the subscriptions lookup query.
///
/// `sv_id` is comma-joined, see [`SubscriptionsQuery::sv_id`].
pub fn build_subscriptions_query(
    email: &str,
    list_ids: &[String],
    config: &ClientConfiguration,
) -> SubscriptionsQuery {
    SubscriptionsQuery {
        user_email: normalize_email(email, config.normalize_email),
        key: derive_key_for(config, email),
        universe_acronym: config.universe_acronym.clone(),
        app: config.app_id.clone(),
        sv_id: join_non_empty(list_ids),
    }
}

/// Join list IDs with commas, as the API expects. Later duplicates are
/// dropped.
pub fn join_list_ids(ids: &[String]) -> String {
    dedup_ids(ids.iter().map(String::as_str)).join(",")
}

fn join_non_empty(ids: &[String]) -> Option<String> {
    if ids.is_empty() {
        None
    } else {
        Some(join_list_ids(ids))
    }
}

/// Split a comma-joined list ID field. Blank entries are dropped.
pub fn split_list_ids(joined: &str) -> Vec<String> {
    dedup_ids(
        joined
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string),
    )
}

fn dedup_ids<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for id in ids {
        let id = id.into();
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
