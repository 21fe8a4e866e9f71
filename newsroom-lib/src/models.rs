//! Subscription data as returned by the Newsroom API.

use serde::{Deserialize, Deserializer, Serialize};

/// Status of a subscription as reported by the remote service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionStatus {
    /// Confirmed, active subscription.
    Valid,
    /// Any other status string (pending, blocked, ...).
    Other,
}

impl SubscriptionStatus {
    /// Map the API's status string.
    pub fn from_api(status: Option<&str>) -> Self {
        match status {
            Some(s) if s.eq_ignore_ascii_case("valid") => Self::Valid,
            _ => Self::Other,
        }
    }
}

/// Result of a successful subscribe call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscriber email as known to the remote.
    pub email: String,
    /// Universe the list belongs to.
    pub universe_acronym: String,
    /// The requested list this result is about.
    pub list_id: String,
    /// Human readable list name.
    pub list_name: Option<String>,
    /// False when the email was already subscribed to the list.
    pub is_new_subscription: bool,
    /// Message meant for the subscriber.
    pub feedback_message: String,
    /// Language the subscription was registered with.
    pub language: Option<String>,
    /// Subscription status.
    pub status: SubscriptionStatus,
    /// Link the subscriber can use to leave the list.
    pub unsubscription_link: Option<String>,
    /// Link to the subscriber's Newsroom profile.
    pub profile_link: Option<String>,
}

impl Subscription {
    /// Build from an API entry whose `newsletterId` is `list_id`.
    ///
    /// Email and universe fall back to the values the request was sent with
    /// when the entry omits them.
    pub fn from_api(entry: ApiSubscription, list_id: &str, email: &str, universe: &str) -> Self {
        Self {
            email: entry.email.unwrap_or_else(|| email.to_string()),
            universe_acronym: entry
                .universe_acronym
                .unwrap_or_else(|| universe.to_string()),
            list_id: list_id.to_string(),
            list_name: entry.newsletter_name,
            is_new_subscription: entry.is_new_subscription.unwrap_or(false),
            feedback_message: entry.feedback_message.unwrap_or_default(),
            language: entry.language,
            status: SubscriptionStatus::from_api(entry.status.as_deref()),
            unsubscription_link: entry.unsubscription_link,
            profile_link: entry.profile_link,
        }
    }
}

/// One element of the JSON arrays returned by the subscribe and
/// subscriptions endpoints.
///
/// Every field is optional: the remote omits fields freely and sends list
/// IDs either as strings or as numbers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSubscription {
    /// List identifier (sv_id).
    #[serde(default, deserialize_with = "deserialize_list_id")]
    pub newsletter_id: Option<String>,
    /// List name.
    #[serde(default)]
    pub newsletter_name: Option<String>,
    /// Universe acronym.
    #[serde(default)]
    pub universe_acronym: Option<String>,
    /// Subscriber email.
    #[serde(default)]
    pub email: Option<String>,
    /// Whether this call created the subscription.
    #[serde(default)]
    pub is_new_subscription: Option<bool>,
    /// Feedback message.
    #[serde(default)]
    pub feedback_message: Option<String>,
    /// Subscription language.
    #[serde(default)]
    pub language: Option<String>,
    /// Status string, `Valid` for active subscriptions.
    #[serde(default)]
    pub status: Option<String>,
    /// Unsubscription link.
    #[serde(default)]
    pub unsubscription_link: Option<String>,
    /// Profile link.
    #[serde(default)]
    pub profile_link: Option<String>,
}

fn deserialize_list_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
