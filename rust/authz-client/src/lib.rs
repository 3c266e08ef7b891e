//! Client for an external authorization service.
//!
//! [`PolicyClient`] formulates policy decision queries of the form "may
//! *subject* perform *action* on *resource* under *conditions*?", signs each
//! one with a fresh bearer credential from `authz-credentials`, and turns the
//! service's answer into a [`PolicyDecision`] or a typed
//! [`EvaluationError`].

mod client;
pub mod config;
mod decision;
mod error;
mod request;

pub use client::{CORRELATION_ID_HEADER, PolicyClient};
pub use config::ClientConfig;
pub use decision::PolicyDecision;
pub use error::{EvaluationError, TransportError};
pub use request::{PolicyRequest, SimulationRequest};

pub use tokio_util::sync::CancellationToken;
