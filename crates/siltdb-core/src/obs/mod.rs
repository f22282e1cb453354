//! Observability: in-memory statement counters.
//!
//! This module never inspects statement text or engine internals; the
//! executing layers report what they ran.

pub(crate) mod metrics;

pub use metrics::{StatementCounters, report, reset};
