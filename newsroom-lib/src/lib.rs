//! Newsroom newsletter subscription client.
//!
//! Subscribes, unsubscribes and looks up email subscriptions to mailing lists
//! of a Newsroom universe. Requests are authenticated with a key derived from
//! the subscriber email and the universe's shared secret.
//!
//! # Features
//!
//! - **Key derivation**: MD5 or SHA-256 digest of email + secret, optional
//!   email lower-casing
//! - **HTTP client**: [`NewsroomClient`] maps every transport or remote
//!   failure to a typed [`NewsroomError`]
//! - **Messenger capability**: [`NewsroomMessenger`] with a strict mode (the
//!   trait) and a lenient mode ([`LenientMessenger`])
//! - **Mock service**: [`mock::SubscriptionStateStore`], usable in-process or
//!   over HTTP (feature `mock-server`)
//!
//! # Example
//!
//! ```ignore
//! use newsroom_lib::{ClientConfiguration, NewsroomClient, SubscriptionRequest};
//!
//! let config = ClientConfiguration::from_env()?;
//! let client = NewsroomClient::new(config)?;
//!
//! let request = SubscriptionRequest::new("someone@example.com", ["1111", "2222"])
//!     .with_language("fr");
//! let subscription = client.subscribe(&request).await?;
//! assert_eq!(subscription.list_id, "1111");
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod key;
pub mod messenger;
pub mod mock;
pub mod models;
pub mod prelude;
pub mod request;
mod response;

pub use client::NewsroomClient;
pub use config::{ClientConfiguration, DigestAlgorithm, DEFAULT_BASE_URL};
pub use errors::{NewsroomError, NewsroomErrorCode};
pub use key::{derive_key, derive_key_for};
pub use messenger::{create_messenger, LenientMessenger, MessengerBackend, NewsroomMessenger};
pub use models::{ApiSubscription, Subscription, SubscriptionStatus};
pub use request::SubscriptionRequest;
pub use response::{parse_subscription_entries, select_subscription};

/// Common result alias for Newsroom operations.
pub type Result<T> = std::result::Result<T, NewsroomError>;
