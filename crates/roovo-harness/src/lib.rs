//! Deterministic simulation harness for the Roovo client.
//!
//! In-memory implementations of the [`roovo_app::Environment`] and
//! [`roovo_app::Driver`] traits, so the production [`roovo_app::Runtime`]
//! runs unchanged against a scripted backend.
//!
//! # Simulated Backend
//!
//! [`SimBackend`] stands in for the REST API and the push subscription. It
//! assigns server ids, echoes inserts to every subscribed client, and can be
//! told to fail sends or history loads and to deliver inserts twice.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks behavioral properties against snapshots of
//! each client's App. Use [`InvariantRegistry::standard()`] for the common
//! set.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_backend;
pub mod sim_driver;
pub mod sim_env;

pub use invariants::{
    ClientSnapshot, Invariant, InvariantRegistry, InvariantResult, RouteMatchesLocation,
    SubscriptionScopedToView, SystemSnapshot, UniqueRenderedIds, Violation,
};
pub use sim_backend::{ClientId, SharedSimBackend, SimBackend, create_shared_backend};
pub use sim_driver::{Request, SimDriver, SimDriverError};
pub use sim_env::{SimEnv, SimInstant};
