//! Transport-level building blocks shared by Cisne services.
//!
//! Response envelope, request extractors that reject with the envelope,
//! env-driven config loading, tracing setup, health probes and request ids.

pub mod config;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod health;
pub mod middleware;
pub mod tracing;
