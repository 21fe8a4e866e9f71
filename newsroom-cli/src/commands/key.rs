//! Key command - print the request key for an email

use anyhow::{bail, Result};
use newsroom_lib::{derive_key_for, ClientConfiguration};

use crate::ui;

pub fn run(config: &ClientConfiguration, email: &str, verbose: bool) -> Result<()> {
    if config.secret.is_empty() {
        bail!("No secret configured. Set NEWSROOM_SECRET or pass --config.");
    }

    let key = derive_key_for(config, email);

    if verbose {
        ui::header("Request Key");
        ui::key_value("Email", email);
        ui::key_value("Digest", config.digest.as_str());
        ui::key_value("Normalized", &config.normalize_email.to_string());
        ui::key_value("Key", &key);
    } else {
        println!("{}", key);
    }

    Ok(())
}
