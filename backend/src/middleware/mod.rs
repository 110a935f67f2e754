//! Actix middleware applied to every request.
//!
//! Currently only [`Trace`], which assigns the per-request trace identifier
//! echoed in the `trace-id` header and in error bodies.

pub mod trace;

pub use trace::Trace;
