//! Canonical structured event names used across `resource-pubsub`.

// Connection registry events.
pub const CONNECTION_REUSE: &str = "connection_reuse";
pub const CONNECTION_JOIN_PENDING: &str = "connection_join_pending";
pub const CONNECTION_STALE: &str = "connection_stale";
pub const CONNECT_START: &str = "connect_start";
pub const CONNECT_OK: &str = "connect_ok";
pub const CONNECT_FAILED: &str = "connect_failed";
pub const CONNECT_ABANDONED: &str = "connect_abandoned";
pub const CONNECTION_CLOSED: &str = "connection_closed";
pub const CONNECTION_CLOSED_SUPERSEDED: &str = "connection_closed_superseded";
pub const REPLAY_SUBSCRIBE_OK: &str = "replay_subscribe_ok";
pub const REPLAY_SUBSCRIBE_FAILED: &str = "replay_subscribe_failed";
pub const RELAY_RECV_LAGGED: &str = "relay_recv_lagged";

// Subscription ledger events.
pub const LEDGER_RECORD_SUBSCRIBED: &str = "ledger_record_subscribed";
pub const LEDGER_RECORD_UNSUBSCRIBED: &str = "ledger_record_unsubscribed";

// Topic session events.
pub const SUBSCRIBE_REJECTED: &str = "subscribe_rejected";
pub const SUBSCRIBE_OK: &str = "subscribe_ok";
pub const SUBSCRIBE_FAILED: &str = "subscribe_failed";
pub const UNSUBSCRIBE_OK: &str = "unsubscribe_ok";
pub const UNSUBSCRIBE_FAILED: &str = "unsubscribe_failed";
pub const PUBLISH_OK: &str = "publish_ok";
pub const PUBLISH_FAILED: &str = "publish_failed";

// Message dispatch events.
pub const DISPATCH_MESSAGE: &str = "dispatch_message";
pub const DISPATCH_RAW_FALLBACK: &str = "dispatch_raw_fallback";
pub const DISPATCH_TRANSPORT_ERROR: &str = "dispatch_transport_error";
pub const DISPATCH_RECV_LAGGED: &str = "dispatch_recv_lagged";
pub const DISPATCH_CONNECTION_LOST: &str = "dispatch_connection_lost";
pub const DISPATCH_STOPPED: &str = "dispatch_stopped";

// Write redirect events.
pub const REDIRECT_CANCELLED_REQUEST: &str = "redirect_cancelled_request";
pub const REDIRECT_REQUEST_FAILED: &str = "redirect_request_failed";
pub const REDIRECT_BYPASSED: &str = "redirect_bypassed";

// Settings events.
pub const SETTINGS_UPDATED: &str = "settings_updated";
pub const SETTINGS_REJECTED: &str = "settings_rejected";
