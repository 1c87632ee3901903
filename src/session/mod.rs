//! Authenticated session handling
//!
//! The session context is produced by the external login step and handed by
//! reference to every protocol call.

pub mod context;

pub use context::SessionContext;
