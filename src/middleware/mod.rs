//! HTTP middleware.
//!
//! Currently just session authentication; every protected route passes
//! through [`session::require_session`].

pub mod session;
