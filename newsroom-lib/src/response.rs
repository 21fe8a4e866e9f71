//! Interpretation of Newsroom API responses.
//!
//! Both the HTTP client and the in-process mock messenger hand a status code
//! and a raw body to these functions, so the two paths report identical
//! results and errors.

use crate::models::{ApiSubscription, Subscription};
use crate::request::SubscriptionRequest;
use crate::{NewsroomError, Result};

const HTTP_OK: u16 = 200;

/// Interpret the answer to a subscribe call.
///
/// `email` is the address as it was sent (normalized if configured) and
/// `universe` the universe the request targeted; both are used when the
/// remote leaves them out of its entry.
pub(crate) fn interpret_subscribe(
    status: u16,
    body: &str,
    request: &SubscriptionRequest,
    email: &str,
    universe: &str,
) -> Result<Subscription> {
    if status == HTTP_OK {
        let entries = parse_subscription_entries(body)?;
        return select_subscription(entries, request, email, universe);
    }

    if (400..500).contains(&status) {
        return Err(NewsroomError::invalid_response(format!(
            "subscribe rejected with status {}: {}",
            status,
            body.trim()
        )));
    }

    Err(NewsroomError::ServiceUnavailable(format!(
        "subscribe failed with status {}",
        status
    )))
}

/// Interpret the answer to a single-list unsubscribe call.
pub(crate) fn interpret_unsubscribe(status: u16) -> bool {
    status == HTTP_OK
}

/// Interpret the answer to a subscriptions lookup.
///
/// A JSON `null` or an empty body means "no subscriptions".
pub(crate) fn interpret_subscriptions(status: u16, body: &str) -> Result<bool> {
    if status != HTTP_OK {
        return Err(NewsroomError::ServiceUnavailable(format!(
            "subscriptions lookup failed with status {}",
            status
        )));
    }

    if body.trim().is_empty() {
        return Ok(false);
    }

    let entries: Option<Vec<serde_json::Value>> = serde_json::from_str(body).map_err(|e| {
        NewsroomError::invalid_response_from("subscriptions lookup returned invalid JSON", e)
    })?;

    Ok(entries.is_some_and(|entries| !entries.is_empty()))
}

/// Decode the JSON array of a subscribe response.
pub fn parse_subscription_entries(body: &str) -> Result<Vec<ApiSubscription>> {
    if body.trim().is_empty() {
        return Err(NewsroomError::invalid_response("empty subscribe response"));
    }

    let entries: Option<Vec<ApiSubscription>> = serde_json::from_str(body)
        .map_err(|e| NewsroomError::invalid_response_from("unparseable subscribe response", e))?;

    entries.ok_or_else(|| NewsroomError::invalid_response("subscribe response is null"))
}

/// Pick the entry to report for `request`.
///
/// Requested list IDs are tried in the order the caller gave them; the
/// first one present in `entries` wins, wherever it sits in the response.
/// Related list IDs are never reported.
pub fn select_subscription(
    entries: Vec<ApiSubscription>,
    request: &SubscriptionRequest,
    email: &str,
    universe: &str,
) -> Result<Subscription> {
    for list_id in &request.list_ids {
        let found = entries
            .iter()
            .position(|entry| entry.newsletter_id.as_deref() == Some(list_id.as_str()));
        if let Some(index) = found {
            let entry = entries.into_iter().nth(index).unwrap_or_default();
            return Ok(Subscription::from_api(entry, list_id, email, universe));
        }
    }

    Err(NewsroomError::invalid_response(format!(
        "response holds no entry for requested lists {}",
        request.list_ids.join(",")
    )))
}
