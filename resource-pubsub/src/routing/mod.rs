//! Routing layer.
//!
//! Holds the per-credential subscription ledger the control plane replays after
//! every fresh connect.

pub(crate) mod subscription_ledger;
