//! Status command - check subscriptions of an email

use anyhow::Result;
use colored::Colorize;

use super::Session;
use crate::ui;

pub async fn run(session: &Session, email: &str, lists: &[String], _verbose: bool) -> Result<()> {
    let subscribed = session.is_subscribed(email, lists).await?;

    let scope = if lists.is_empty() {
        format!("any list of {}", session.config().universe_acronym)
    } else {
        lists.join(", ")
    };

    ui::header("Subscription Status");
    ui::key_value("Email", email);
    ui::key_value("Lists", &scope);
    if subscribed {
        ui::key_value("Subscribed", &"yes".green().bold().to_string());
    } else {
        ui::key_value("Subscribed", &"no".yellow().to_string());
    }

    Ok(())
}
