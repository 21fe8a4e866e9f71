//! Canned texts returned by the mock service.

/// Name of the simulated newsletter service, used in feedback messages.
pub const SERVICE_NAME: &str = "Test Newsletter Service";

/// Feedback for a subscribe call on a list the email already belongs to.
pub const ALREADY_REGISTERED: &str =
    "A subscription for this service is already registered for this email address";

/// Body of a successful unsubscribe.
pub const UNSUBSCRIBED: &str = "User unsubscribed!";

/// Body of an unsubscribe for an unknown subscriber/list pair.
pub const NOT_FOUND: &str = "Not found";

const THANKS: &[(&str, &str)] = &[
    ("en", "Thanks for Signing Up to the service: "),
    ("de", "Vielen Dank für Ihre Anmeldung beim Dienst: "),
    ("es", "Gracias por suscribirse al servicio: "),
    ("fr", "Merci de vous être inscrit au service : "),
    ("it", "Grazie per esservi iscritti al servizio: "),
];

/// "Thanks for signing up" in `language`, English when no translation exists.
///
/// Region subtags are ignored, so `fr-BE` gets the French text.
pub fn thanks_message(language: Option<&str>) -> String {
    let primary = language
        .and_then(|lang| lang.split(['-', '_']).next())
        .map(|lang| lang.trim().to_lowercase())
        .unwrap_or_default();

    let prefix = THANKS
        .iter()
        .find(|(code, _)| *code == primary)
        .map(|(_, text)| *text)
        .unwrap_or(THANKS[0].1);

    format!("{}{}", prefix, SERVICE_NAME)
}
