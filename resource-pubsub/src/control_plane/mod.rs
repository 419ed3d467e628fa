//! Control-plane layer.
//!
//! Owns connection identity and lifecycle: credential keying, credential-derived
//! connect options, and the single-flight registry that hands every topic
//! session of a credential the same live connection.

pub(crate) mod connect_options;
pub(crate) mod connection_registry;
pub(crate) mod credential;
