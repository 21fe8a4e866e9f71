//! Unsubscribe command

use anyhow::{bail, Result};

use super::Session;
use crate::ui;

pub async fn run(session: &Session, email: &str, lists: &[String], _verbose: bool) -> Result<()> {
    ui::header("Unsubscribe");
    ui::key_value("Email", email);
    ui::key_value("Lists", &lists.join(", "));

    match session.unsubscribe(email, lists).await? {
        Some(true) => ui::success("Unsubscribed from all lists"),
        Some(false) if session.is_lenient() => {
            ui::warning("The service did not confirm every unsubscription")
        }
        Some(false) => bail!("The service did not confirm every unsubscription"),
        None => ui::warning("Client is not configured, nothing was sent"),
    }

    Ok(())
}
