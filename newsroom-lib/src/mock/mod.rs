//! Simulation of the Newsroom service for tests and local development.
//!
//! - [`SubscriptionStateStore`]: the simulated server-side state, with
//!   handlers mirroring the three API endpoints
//! - [`MockMessenger`]: a [`NewsroomMessenger`](crate::NewsroomMessenger)
//!   calling a store in-process
//! - `MockNewsroomServer`: a store served over HTTP through wiremock
//!   (opt-in feature `mock-server`)
//!
//! Stores are plain values shared through `Arc`. Each test builds its own,
//! and [`SubscriptionStateStore::reset`] returns one to empty.

mod messages;
mod messenger;
#[cfg(feature = "mock-server")]
mod server;
mod store;

pub use messages::{thanks_message, ALREADY_REGISTERED, NOT_FOUND, SERVICE_NAME, UNSUBSCRIBED};
pub use messenger::MockMessenger;
#[cfg(feature = "mock-server")]
pub use server::MockNewsroomServer;
pub use store::{
    MockBody, MockOperation, MockResponse, RecordedRequest, StoreSnapshot, SubscriptionRecord,
    SubscriptionStateStore, UniverseState,
};
