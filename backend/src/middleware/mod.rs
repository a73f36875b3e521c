//! Request middleware.
//!
//! [`Trace`] gives each request a trace identifier, echoes it in the
//! response headers and logs one event per completed request.

pub mod trace;

pub use trace::Trace;
