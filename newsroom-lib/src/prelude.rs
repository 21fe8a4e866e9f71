//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use newsroom_lib::prelude::*;
//! ```

// Configuration and keys
pub use crate::config::{ClientConfiguration, DigestAlgorithm};
pub use crate::key::{derive_key, derive_key_for};

// Error handling
pub use crate::errors::{NewsroomError, NewsroomErrorCode};
pub use crate::Result;

// Requests and results
pub use crate::models::{Subscription, SubscriptionStatus};
pub use crate::request::SubscriptionRequest;

// Messengers
pub use crate::client::NewsroomClient;
pub use crate::messenger::{create_messenger, LenientMessenger, MessengerBackend, NewsroomMessenger};

// Mock service
pub use crate::mock::{MockMessenger, SubscriptionStateStore};
#[cfg(feature = "mock-server")]
pub use crate::mock::MockNewsroomServer;
