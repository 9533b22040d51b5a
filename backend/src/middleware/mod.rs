//! Request middleware.
//!
//! Purpose: request lifecycle concerns shared by every route, currently
//! trace identifier propagation. The session gate lives with the HTTP
//! adapter in `inbound::http::access`.

pub mod trace;

pub use trace::Trace;
