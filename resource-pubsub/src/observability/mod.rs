//! Structured logging vocabulary.
//!
//! Library code emits `tracing` events only; installing a subscriber is left to
//! the embedding application or test harness.

pub mod events;
pub mod fields;
