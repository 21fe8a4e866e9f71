//! Subscribe command

use anyhow::Result;
use newsroom_lib::SubscriptionRequest;

use super::Session;
use crate::ui;

pub async fn run(
    session: &Session,
    email: &str,
    lists: Vec<String>,
    related: Vec<String>,
    language: Option<String>,
    topics: Vec<String>,
    verbose: bool,
) -> Result<()> {
    let mut request = SubscriptionRequest::new(email, lists)
        .with_related_list_ids(related)
        .with_topic_ext_ids(topics);
    if let Some(language) = language {
        request = request.with_language(language);
    }

    ui::header("Subscribe");
    ui::key_value("Email", email);
    ui::key_value("Lists", &request.list_ids.join(", "));
    if !request.related_list_ids.is_empty() {
        ui::key_value("Related", &request.related_list_ids.join(", "));
    }
    if session.is_mock() {
        ui::info("Using the local mock service");
    }

    let Some(subscription) = session.subscribe(&request).await? else {
        ui::warning("Subscription failed (see log for details)");
        return Ok(());
    };

    if subscription.is_new_subscription {
        ui::success(&format!("Subscribed to list {}", subscription.list_id));
    } else {
        ui::info(&format!("Already subscribed to list {}", subscription.list_id));
    }
    if !subscription.feedback_message.is_empty() {
        ui::key_value("Message", &subscription.feedback_message);
    }

    if verbose {
        ui::separator();
        if let Some(name) = &subscription.list_name {
            ui::key_value("List name", name);
        }
        if let Some(language) = &subscription.language {
            ui::key_value("Language", language);
        }
        ui::key_value("Status", &format!("{:?}", subscription.status));
        if let Some(link) = &subscription.unsubscription_link {
            ui::key_value("Unsubscribe", link);
        }
        if let Some(link) = &subscription.profile_link {
            ui::key_value("Profile", link);
        }
    }

    Ok(())
}
