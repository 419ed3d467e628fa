#![allow(dead_code)]

use integration_test_utils::MockConnector;
use resource_pubsub::{
    message_callback, Callbacks, ConnectionState, CredentialKey, DecodedMessage, MessageCallback,
    PubSubContext, PubSubError,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

pub(crate) const CREDENTIAL: &str = "operator-api-key";
const WAIT_TIMEOUT: Duration = Duration::from_secs(2);
const POLL_INTERVAL: Duration = Duration::from_millis(5);

pub(crate) type Reported = Arc<Mutex<Vec<PubSubError>>>;

pub(crate) fn make_context() -> (PubSubContext, Arc<MockConnector>) {
    integration_test_utils::init_logging();
    let connector = MockConnector::open();
    (PubSubContext::new(connector.clone()), connector)
}

pub(crate) fn credential() -> CredentialKey {
    CredentialKey::new(CREDENTIAL)
}

/// Callbacks whose error hook records every reported error.
pub(crate) fn error_sink() -> (Callbacks, Reported) {
    let reported: Reported = Arc::new(Mutex::new(Vec::new()));
    let sink = reported.clone();
    let callbacks = Callbacks::new().on_error(move |err| {
        sink.lock().expect("lock reported").push(err.clone());
    });
    (callbacks, reported)
}

pub(crate) fn reported(errors: &Reported) -> Vec<PubSubError> {
    errors.lock().expect("lock reported").clone()
}

pub(crate) fn message_sink() -> (MessageCallback, mpsc::UnboundedReceiver<DecodedMessage>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let callback = message_callback(move |message| {
        let _ = sender.send(message);
    });
    (callback, receiver)
}

pub(crate) async fn next_message(
    receiver: &mut mpsc::UnboundedReceiver<DecodedMessage>,
) -> DecodedMessage {
    tokio::time::timeout(WAIT_TIMEOUT, receiver.recv())
        .await
        .expect("message should arrive in time")
        .expect("message channel should stay open")
}

/// Passes when nothing arrives, including when the callback was dropped.
pub(crate) async fn assert_no_message(receiver: &mut mpsc::UnboundedReceiver<DecodedMessage>) {
    if let Ok(Some(message)) =
        tokio::time::timeout(Duration::from_millis(50), receiver.recv()).await
    {
        panic!("no message expected, got {message:?}");
    }
}

pub(crate) async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(WAIT_TIMEOUT, async {
        while !condition() {
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    })
    .await
    .expect("condition should become true in time");
}

pub(crate) async fn wait_for_state(
    context: &PubSubContext,
    credential: &CredentialKey,
    expected: ConnectionState,
) {
    tokio::time::timeout(WAIT_TIMEOUT, async {
        while context.connection_state(credential).await != expected {
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("connection state should become {expected:?}"));
}
