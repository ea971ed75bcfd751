//! Request middleware.
//!
//! [`Trace`] scopes each request with a trace identifier; [`Recover`] turns
//! handler panics into redacted `500` responses.

pub mod recover;
pub mod trace;

pub use recover::Recover;
pub use trace::Trace;
