//! Client configuration.
//!
//! # Environment Variables
//!
//! [`ClientConfiguration::from_env`] reads:
//! - `NEWSROOM_UNIVERSE` - universe acronym
//! - `NEWSROOM_APP_ID` - app identifier within the universe
//! - `NEWSROOM_SECRET` - shared secret used to derive request keys
//! - `NEWSROOM_DIGEST` - `md5` (default) or `sha256`
//! - `NEWSROOM_NORMALIZE_EMAIL` - `true`/`1` to lower-case emails before hashing
//! - `NEWSROOM_BASE_URL` - API host (default: `https://ec.europa.eu`)
//! - `NEWSROOM_TIMEOUT_SECS` - request timeout in seconds (default: 30)
//!
//! Missing identifiers are left empty. The client reports them as
//! [`NewsroomError::NotConfigured`] when an operation is attempted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{NewsroomError, Result};

/// Default Newsroom API host.
pub const DEFAULT_BASE_URL: &str = "https://ec.europa.eu";

/// Digest used to derive the request key from email and secret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// MD5, the algorithm most universes are provisioned with.
    #[default]
    Md5,
    /// SHA-256.
    Sha256,
}

impl DigestAlgorithm {
    /// Name as used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = NewsroomError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            other => Err(NewsroomError::UnsupportedDigest(other.to_string())),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the client needs to talk to one Newsroom universe.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfiguration {
    /// Universe acronym (tenant identifier).
    #[serde(default)]
    pub universe_acronym: String,

    /// App identifier within the universe.
    #[serde(default)]
    pub app_id: String,

    /// Shared secret. Never logged.
    #[serde(default)]
    pub secret: String,

    /// Digest used for key derivation.
    #[serde(default)]
    pub digest: DigestAlgorithm,

    /// Lower-case emails before hashing and sending.
    #[serde(default)]
    pub normalize_email: bool,

    /// API host, without the `/newsroom/api/v1` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds, applied by the HTTP transport.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl ClientConfiguration {
    /// Create a configuration with default digest (MD5), no normalization and
    /// the default API host.
    pub fn new(
        universe_acronym: impl Into<String>,
        app_id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            universe_acronym: universe_acronym.into(),
            app_id: app_id.into(),
            secret: secret.into(),
            digest: DigestAlgorithm::default(),
            normalize_email: false,
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }

    /// Set the digest algorithm.
    pub fn with_digest(mut self, digest: DigestAlgorithm) -> Self {
        self.digest = digest;
        self
    }

    /// Enable or disable email normalization.
    pub fn with_normalize_email(mut self, normalize: bool) -> Self {
        self.normalize_email = normalize;
        self
    }

    /// Set the API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Names of required fields that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.universe_acronym.trim().is_empty() {
            missing.push("universe_acronym");
        }
        if self.app_id.trim().is_empty() {
            missing.push("app_id");
        }
        if self.secret.is_empty() {
            missing.push("secret");
        }
        missing
    }

    /// True when universe, app id and secret are all set.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Fail with [`NewsroomError::NotConfigured`] unless complete.
    pub fn require_complete(&self) -> Result<()> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(NewsroomError::NotConfigured { missing })
        }
    }

    /// Load configuration from `NEWSROOM_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(
            lookup("NEWSROOM_UNIVERSE").unwrap_or_default(),
            lookup("NEWSROOM_APP_ID").unwrap_or_default(),
            lookup("NEWSROOM_SECRET").unwrap_or_default(),
        );

        if let Some(digest) = lookup("NEWSROOM_DIGEST") {
            config = config.with_digest(digest.parse()?);
        }

        if let Some(flag) = lookup("NEWSROOM_NORMALIZE_EMAIL") {
            config = config.with_normalize_email(parse_flag(&flag));
        }

        if let Some(url) = lookup("NEWSROOM_BASE_URL") {
            config = config.with_base_url(url);
        }

        if let Some(timeout) = lookup("NEWSROOM_TIMEOUT_SECS") {
            let secs = timeout.trim().parse::<u64>().map_err(|e| {
                NewsroomError::InvalidConfiguration(format!(
                    "NEWSROOM_TIMEOUT_SECS={:?}: {}",
                    timeout, e
                ))
            })?;
            config = config.with_timeout(secs);
            config.require_valid_timeout()?;
        }

        Ok(config)
    }

    /// Fail with [`NewsroomError::InvalidConfiguration`] on a zero timeout.
    pub fn require_valid_timeout(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            Err(NewsroomError::InvalidConfiguration(
                "timeout_secs must be positive".into(),
            ))
        } else {
            Ok(())
        }
    }
}

fn parse_flag(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl fmt::Debug for ClientConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfiguration")
            .field("universe_acronym", &self.universe_acronym)
            .field("app_id", &self.app_id)
            .field("secret", &if self.secret.is_empty() { "" } else { "***" })
            .field("digest", &self.digest)
            .field("normalize_email", &self.normalize_email)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_digest_parsing() {
        assert_eq!("md5".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Md5);
        assert_eq!("SHA256".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha256);
        assert_eq!("sha-256".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha256);

        let err = "sha1".parse::<DigestAlgorithm>().unwrap_err();
        assert!(matches!(err, NewsroomError::UnsupportedDigest(ref name) if name == "sha1"));
    }

    #[test]
    fn test_missing_fields() {
        let config = ClientConfiguration::new("", "app", "");
        assert_eq!(config.missing_fields(), vec!["universe_acronym", "secret"]);
        assert!(!config.is_complete());
        assert!(matches!(
            config.require_complete(),
            Err(NewsroomError::NotConfigured { .. })
        ));

        let config = ClientConfiguration::new("TESTU", "app", "s3cret");
        assert!(config.is_complete());
        assert!(config.require_complete().is_ok());
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("NEWSROOM_UNIVERSE", "TESTU"),
            ("NEWSROOM_APP_ID", "site"),
            ("NEWSROOM_SECRET", "s3cret"),
            ("NEWSROOM_DIGEST", "sha256"),
            ("NEWSROOM_NORMALIZE_EMAIL", "true"),
            ("NEWSROOM_TIMEOUT_SECS", "5"),
        ]
        .into_iter()
        .collect();

        let config =
            ClientConfiguration::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
                .unwrap();
        assert_eq!(config.universe_acronym, "TESTU");
        assert_eq!(config.digest, DigestAlgorithm::Sha256);
        assert!(config.normalize_email);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_from_lookup_rejects_unknown_digest() {
        let result = ClientConfiguration::from_lookup(|name| match name {
            "NEWSROOM_DIGEST" => Some("crc32".to_string()),
            _ => None,
        });
        assert!(matches!(result, Err(NewsroomError::UnsupportedDigest(_))));
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        for value in ["abc", "-5", "", "0"] {
            let result = ClientConfiguration::from_lookup(|name| match name {
                "NEWSROOM_TIMEOUT_SECS" => Some(value.to_string()),
                _ => None,
            });
            assert!(
                matches!(result, Err(NewsroomError::InvalidConfiguration(_))),
                "timeout {:?} was accepted",
                value
            );
        }

        let config = ClientConfiguration::from_lookup(|name| match name {
            "NEWSROOM_TIMEOUT_SECS" => Some(" 12 ".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.timeout_secs, 12);
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let config = ClientConfiguration::new("TESTU", "site", "k").with_timeout(0);
        assert!(matches!(
            config.require_valid_timeout(),
            Err(NewsroomError::InvalidConfiguration(_))
        ));
        assert!(ClientConfiguration::new("TESTU", "site", "k")
            .require_valid_timeout()
            .is_ok());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ClientConfiguration = serde_json::from_str(
            r#"{"universe_acronym": "TESTU", "app_id": "site", "secret": "k"}"#,
        )
        .unwrap();
        assert_eq!(config.digest, DigestAlgorithm::Md5);
        assert!(!config.normalize_email);
        assert_eq!(config.timeout_secs, 30);

        let result = serde_json::from_str::<ClientConfiguration>(r#"{"digest": "whirlpool"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = ClientConfiguration::new("TESTU", "site", "phpunit-test-private-key");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("phpunit-test-private-key"));
        assert!(rendered.contains("***"));
    }
}
