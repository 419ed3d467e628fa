/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Single-flight connection registry keyed by credential.
//!
//! Each credential owns at most one slot. A slot is either `Connecting`, holding
//! the waiters of the in-flight attempt, or `Connected`. An absent slot is the
//! idle state; failed attempts and closed connections return the slot to idle so
//! the next caller starts a fresh attempt.
//!
//! Events of every connection a credential ever gets are relayed into one
//! per-credential broadcast, so subscribers keep listening across reconnects.

use crate::control_plane::connect_options::connect_options_for;
use crate::control_plane::credential::CredentialKey;
use crate::error::PubSubError;
use crate::observability::events;
use crate::routing::subscription_ledger::SubscriptionLedger;
use crate::settings::PubSubSettings;
use crate::transport::{ConnectionEvent, ConnectionHandle, TransportConnector, TransportError};
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, oneshot, Mutex};
use tracing::{debug, info, warn};

const COMPONENT: &str = "connection_registry";

/// Buffered events per credential; slower subscribers observe [`RelayedEvent::Dropped`]
/// or a lagged receive beyond this.
pub(crate) const RELAY_CAPACITY: usize = 256;

type ConnectResult = Result<ConnectionHandle, PubSubError>;
type ConnectWaiter = oneshot::Sender<ConnectResult>;

enum ConnectionSlot {
    Connecting {
        generation: u64,
        waiters: Vec<ConnectWaiter>,
    },
    Connected {
        generation: u64,
        connection: ConnectionHandle,
    },
}

enum SlotLookup {
    Live(ConnectionHandle),
    Pending,
    Stale(u64),
    Missing,
}

/// Event relayed to the subscribers of a credential, whichever connection produced it.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum RelayedEvent {
    Connection(ConnectionEvent),
    /// The relay fell behind its connection and lost `skipped` events.
    Dropped(u64),
}

type RelaySenders = HashMap<CredentialKey, broadcast::Sender<RelayedEvent>>;

/// Observable state of one credential's slot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectionState {
    Idle,
    Connecting { waiters: usize },
    Connected,
}

#[derive(Clone)]
pub(crate) struct ConnectionRegistry {
    connector: Arc<dyn TransportConnector>,
    settings: Arc<ArcSwap<PubSubSettings>>,
    ledger: Arc<SubscriptionLedger>,
    slots: Arc<Mutex<HashMap<CredentialKey, ConnectionSlot>>>,
    relays: Arc<StdMutex<RelaySenders>>,
    next_generation: Arc<AtomicU64>,
}

impl ConnectionRegistry {
    pub(crate) fn new(
        connector: Arc<dyn TransportConnector>,
        settings: Arc<ArcSwap<PubSubSettings>>,
        ledger: Arc<SubscriptionLedger>,
    ) -> Self {
        Self {
            connector,
            settings,
            ledger,
            slots: Arc::new(Mutex::new(HashMap::new())),
            relays: Arc::new(StdMutex::new(HashMap::new())),
            next_generation: Arc::new(AtomicU64::new(1)),
        }
    }

    fn lookup(slots: &HashMap<CredentialKey, ConnectionSlot>, credential: &CredentialKey) -> SlotLookup {
        match slots.get(credential) {
            Some(ConnectionSlot::Connected { connection, .. }) if connection.is_connected() => {
                SlotLookup::Live(connection.clone())
            }
            Some(ConnectionSlot::Connected { generation, .. }) => SlotLookup::Stale(*generation),
            Some(ConnectionSlot::Connecting { .. }) => SlotLookup::Pending,
            None => SlotLookup::Missing,
        }
    }

    /// Returns the live connection for `credential`, joining or starting a
    /// connect attempt when there is none.
    ///
    /// Concurrent callers for the same credential share one attempt and receive
    /// the same connection or the same error.
    pub(crate) async fn acquire_connection(&self, credential: &CredentialKey) -> ConnectResult {
        let (waiter, outcome) = oneshot::channel();

        let started_generation = {
            let mut slots = self.slots.lock().await;
            match Self::lookup(&slots, credential) {
                SlotLookup::Live(connection) => {
                    debug!(
                        event = events::CONNECTION_REUSE,
                        component = COMPONENT,
                        credential = %credential,
                        client_id = connection.client_id(),
                        "reusing live connection"
                    );
                    return Ok(connection);
                }
                SlotLookup::Pending => {
                    if let Some(ConnectionSlot::Connecting { waiters, generation }) =
                        slots.get_mut(credential)
                    {
                        waiters.push(waiter);
                        debug!(
                            event = events::CONNECTION_JOIN_PENDING,
                            component = COMPONENT,
                            credential = %credential,
                            generation = *generation,
                            waiters = waiters.len(),
                            "joined pending connection attempt"
                        );
                    }
                    None
                }
                SlotLookup::Stale(stale_generation) => {
                    debug!(
                        event = events::CONNECTION_STALE,
                        component = COMPONENT,
                        credential = %credential,
                        generation = stale_generation,
                        "replacing connection that is no longer connected"
                    );
                    Some(self.start_attempt(&mut slots, credential, waiter))
                }
                SlotLookup::Missing => Some(self.start_attempt(&mut slots, credential, waiter)),
            }
        };

        if let Some(generation) = started_generation {
            // The attempt runs detached so a dropped caller cannot strand the other waiters.
            tokio::spawn(self.clone().establish(credential.clone(), generation));
        }

        match outcome.await {
            Ok(result) => result,
            Err(_) => Err(PubSubError::Connection(TransportError::new(
                "connection attempt abandoned",
            ))),
        }
    }

    fn start_attempt(
        &self,
        slots: &mut HashMap<CredentialKey, ConnectionSlot>,
        credential: &CredentialKey,
        waiter: ConnectWaiter,
    ) -> u64 {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        slots.insert(
            credential.clone(),
            ConnectionSlot::Connecting {
                generation,
                waiters: vec![waiter],
            },
        );
        generation
    }

    /// Returns the live connection for `credential` without starting a connect.
    pub(crate) async fn current_connection(
        &self,
        credential: &CredentialKey,
    ) -> Option<ConnectionHandle> {
        let slots = self.slots.lock().await;
        match Self::lookup(&slots, credential) {
            SlotLookup::Live(connection) => Some(connection),
            _ => None,
        }
    }

    /// Receiver for the events of `credential`'s current and future connections.
    ///
    /// A `Closed` event is relayed once the closed connection has left the
    /// registry, so the next acquire reconnects and replays the ledger.
    pub(crate) fn listen(&self, credential: &CredentialKey) -> broadcast::Receiver<RelayedEvent> {
        self.relay_sender(credential).subscribe()
    }

    fn relay_sender(&self, credential: &CredentialKey) -> broadcast::Sender<RelayedEvent> {
        self.relays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(credential.clone())
            .or_insert_with(|| broadcast::channel(RELAY_CAPACITY).0)
            .clone()
    }

    pub(crate) async fn connection_state(&self, credential: &CredentialKey) -> ConnectionState {
        let slots = self.slots.lock().await;
        match slots.get(credential) {
            Some(ConnectionSlot::Connecting { waiters, .. }) => ConnectionState::Connecting {
                waiters: waiters.len(),
            },
            Some(ConnectionSlot::Connected { .. }) => ConnectionState::Connected,
            None => ConnectionState::Idle,
        }
    }

    async fn establish(self, credential: CredentialKey, generation: u64) {
        let settings = self.settings.load_full();
        let options = connect_options_for(&credential, &settings);
        let client_id = options.client_id.clone();

        info!(
            event = events::CONNECT_START,
            component = COMPONENT,
            credential = %credential,
            client_id = client_id.as_str(),
            generation,
            server_url = settings.server_url.as_str(),
            "connecting"
        );

        let outcome = match self.connector.connect(&settings.server_url, options).await {
            Ok(transport) => {
                let connection = ConnectionHandle::new(transport);
                // Listen before replaying so nothing sent on a replayed topic is missed.
                let connection_events = connection.transport().events();
                self.replay_subscriptions(&credential, &connection).await;
                info!(
                    event = events::CONNECT_OK,
                    component = COMPONENT,
                    credential = %credential,
                    client_id = client_id.as_str(),
                    generation,
                    "connected"
                );
                Ok((connection, connection_events))
            }
            Err(err) => {
                warn!(
                    event = events::CONNECT_FAILED,
                    component = COMPONENT,
                    credential = %credential,
                    client_id = client_id.as_str(),
                    generation,
                    err = %err,
                    "unable to connect"
                );
                Err(PubSubError::Connection(err))
            }
        };

        let waiters = {
            let mut slots = self.slots.lock().await;
            let owns_slot = matches!(
                slots.get(&credential),
                Some(ConnectionSlot::Connecting { generation: current, .. }) if *current == generation
            );

            if !owns_slot {
                warn!(
                    event = events::CONNECT_ABANDONED,
                    component = COMPONENT,
                    credential = %credential,
                    client_id = client_id.as_str(),
                    generation,
                    reason = "slot_superseded",
                    "connect attempt no longer owns its registry slot"
                );
                return;
            }

            let waiters = match slots.remove(&credential) {
                Some(ConnectionSlot::Connecting { waiters, .. }) => waiters,
                _ => Vec::new(),
            };
            if let Ok((connection, _)) = &outcome {
                slots.insert(
                    credential.clone(),
                    ConnectionSlot::Connected {
                        generation,
                        connection: connection.clone(),
                    },
                );
            }
            waiters
        };

        let result = match outcome {
            Ok((connection, connection_events)) => {
                tokio::spawn(self.clone().relay_events(
                    credential,
                    generation,
                    connection.client_id().to_string(),
                    connection_events,
                ));
                Ok(connection)
            }
            Err(err) => Err(err),
        };

        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }
    }

    /// Best-effort resubscribe of every recorded topic on a fresh connection.
    async fn replay_subscriptions(&self, credential: &CredentialKey, connection: &ConnectionHandle) {
        for topic in self.ledger.list_subscribed(credential) {
            match connection.transport().subscribe(&topic).await {
                Ok(()) => debug!(
                    event = events::REPLAY_SUBSCRIBE_OK,
                    component = COMPONENT,
                    credential = %credential,
                    client_id = connection.client_id(),
                    topic = topic.as_str(),
                    "replayed subscription"
                ),
                Err(err) => warn!(
                    event = events::REPLAY_SUBSCRIBE_FAILED,
                    component = COMPONENT,
                    credential = %credential,
                    client_id = connection.client_id(),
                    topic = topic.as_str(),
                    err = %err,
                    "unable to replay subscription"
                ),
            }
        }
    }

    /// Relays this connection's events to the credential's listeners and returns
    /// the slot to idle once the transport closes it.
    async fn relay_events(
        self,
        credential: CredentialKey,
        generation: u64,
        client_id: String,
        mut connection_events: broadcast::Receiver<ConnectionEvent>,
    ) {
        let relay = self.relay_sender(&credential);

        loop {
            match connection_events.recv().await {
                Ok(ConnectionEvent::Closed) | Err(RecvError::Closed) => break,
                Ok(event) => {
                    let _ = relay.send(RelayedEvent::Connection(event));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        event = events::RELAY_RECV_LAGGED,
                        component = COMPONENT,
                        credential = %credential,
                        client_id = client_id.as_str(),
                        generation,
                        skipped,
                        "relay lagged behind connection events"
                    );
                    let _ = relay.send(RelayedEvent::Dropped(skipped));
                }
            }
        }

        let mut slots = self.slots.lock().await;
        let owns_slot = matches!(
            slots.get(&credential),
            Some(ConnectionSlot::Connected { generation: current, .. }) if *current == generation
        );

        if owns_slot {
            slots.remove(&credential);
            drop(slots);
            info!(
                event = events::CONNECTION_CLOSED,
                component = COMPONENT,
                credential = %credential,
                client_id = client_id.as_str(),
                generation,
                "connection closed, next acquire reconnects"
            );
            let _ = relay.send(RelayedEvent::Connection(ConnectionEvent::Closed));
        } else {
            debug!(
                event = events::CONNECTION_CLOSED_SUPERSEDED,
                component = COMPONENT,
                credential = %credential,
                client_id = client_id.as_str(),
                generation,
                "closed connection was already replaced"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConnectionRegistry, ConnectionState, RelayedEvent};
    use crate::control_plane::credential::CredentialKey;
    use crate::error::PubSubError;
    use crate::routing::subscription_ledger::SubscriptionLedger;
    use crate::settings::PubSubSettings;
    use crate::transport::{
        ConnectOptions, ConnectionEvent, InboundMessage, TransportConnection, TransportConnector,
        TransportError,
    };
    use arc_swap::ArcSwap;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex as StdMutex};
    use std::time::Duration;
    use tokio::sync::{broadcast, Semaphore};

    const OPEN_GATE_PERMITS: usize = 1024;

    /// Connection that records subscribes and refuses topics under `/refused`.
    struct StubConnection {
        options: ConnectOptions,
        connected: AtomicBool,
        events: broadcast::Sender<ConnectionEvent>,
        subscribed: StdMutex<Vec<String>>,
    }

    impl StubConnection {
        fn subscribed(&self) -> Vec<String> {
            self.subscribed.lock().expect("lock subscribed").clone()
        }

        fn close(&self) {
            self.connected.store(false, Ordering::SeqCst);
            let _ = self.events.send(ConnectionEvent::Closed);
        }
    }

    #[async_trait]
    impl TransportConnection for StubConnection {
        fn client_id(&self) -> &str {
            &self.options.client_id
        }

        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        async fn subscribe(&self, topic: &str) -> Result<(), TransportError> {
            if topic.starts_with("/refused") {
                return Err(TransportError::new("subscribe refused"));
            }
            self.subscribed
                .lock()
                .expect("lock subscribed")
                .push(topic.to_string());
            Ok(())
        }

        async fn unsubscribe(&self, _topic: &str) -> Result<(), TransportError> {
            Ok(())
        }

        async fn publish(&self, _topic: &str, _payload: Vec<u8>) -> Result<(), TransportError> {
            Ok(())
        }

        fn events(&self) -> broadcast::Receiver<ConnectionEvent> {
            self.events.subscribe()
        }
    }

    struct StubConnector {
        gate: Semaphore,
        connect_calls: AtomicUsize,
        failure: StdMutex<Option<TransportError>>,
        connections: StdMutex<Vec<Arc<StubConnection>>>,
    }

    impl StubConnector {
        fn with_permits(permits: usize) -> Arc<Self> {
            Arc::new(Self {
                gate: Semaphore::new(permits),
                connect_calls: AtomicUsize::new(0),
                failure: StdMutex::new(None),
                connections: StdMutex::new(Vec::new()),
            })
        }

        fn open() -> Arc<Self> {
            Self::with_permits(OPEN_GATE_PERMITS)
        }

        fn held() -> Arc<Self> {
            Self::with_permits(0)
        }

        fn release(&self) {
            self.gate.add_permits(OPEN_GATE_PERMITS);
        }

        fn fail_next_connect(&self, error: TransportError) {
            *self.failure.lock().expect("lock failure") = Some(error);
        }

        fn connect_calls(&self) -> usize {
            self.connect_calls.load(Ordering::SeqCst)
        }

        fn connection(&self, index: usize) -> Arc<StubConnection> {
            self.connections.lock().expect("lock connections")[index].clone()
        }
    }

    #[async_trait]
    impl TransportConnector for StubConnector {
        async fn connect(
            &self,
            _server_url: &str,
            options: ConnectOptions,
        ) -> Result<Arc<dyn TransportConnection>, TransportError> {
            self.connect_calls.fetch_add(1, Ordering::SeqCst);
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| TransportError::new("gate closed"))?;

            if let Some(error) = self.failure.lock().expect("lock failure").take() {
                return Err(error);
            }

            let (events, _) = broadcast::channel(16);
            let connection = Arc::new(StubConnection {
                options,
                connected: AtomicBool::new(true),
                events,
                subscribed: StdMutex::new(Vec::new()),
            });
            self.connections
                .lock()
                .expect("lock connections")
                .push(connection.clone());
            Ok(connection)
        }
    }

    fn make_registry(
        connector: Arc<StubConnector>,
        ledger: Arc<SubscriptionLedger>,
    ) -> ConnectionRegistry {
        ConnectionRegistry::new(
            connector,
            Arc::new(ArcSwap::from_pointee(PubSubSettings::default())),
            ledger,
        )
    }

    async fn wait_for_state(
        registry: &ConnectionRegistry,
        credential: &CredentialKey,
        expected: ConnectionState,
    ) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while registry.connection_state(credential).await != expected {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("registry should reach expected state");
    }

    #[tokio::test]
    async fn concurrent_acquire_shares_single_connect_attempt() {
        let connector = StubConnector::held();
        let registry = make_registry(connector.clone(), Arc::new(SubscriptionLedger::new()));
        let credential = CredentialKey::new("shared-key");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                let credential = credential.clone();
                tokio::spawn(async move { registry.acquire_connection(&credential).await })
            })
            .collect();

        wait_for_state(&registry, &credential, ConnectionState::Connecting { waiters: 8 }).await;
        connector.release();

        let mut connections = Vec::new();
        for handle in handles {
            connections.push(
                handle
                    .await
                    .expect("acquire task should not panic")
                    .expect("acquire should succeed"),
            );
        }

        assert_eq!(connector.connect_calls(), 1);
        assert!(connections
            .iter()
            .all(|connection| connection.same_connection(&connections[0])));
        assert_eq!(
            registry.connection_state(&credential).await,
            ConnectionState::Connected
        );
    }

    #[tokio::test]
    async fn concurrent_acquire_shares_connect_error() {
        let connector = StubConnector::held();
        connector.fail_next_connect(TransportError::new("bad credentials"));
        let registry = make_registry(connector.clone(), Arc::new(SubscriptionLedger::new()));
        let credential = CredentialKey::new("revoked-key");

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let registry = registry.clone();
                let credential = credential.clone();
                tokio::spawn(async move { registry.acquire_connection(&credential).await })
            })
            .collect();

        wait_for_state(&registry, &credential, ConnectionState::Connecting { waiters: 3 }).await;
        connector.release();

        for handle in handles {
            let result = handle.await.expect("acquire task should not panic");
            assert_eq!(
                result.expect_err("connect should fail"),
                PubSubError::Connection(TransportError::new("bad credentials"))
            );
        }
        assert_eq!(connector.connect_calls(), 1);
    }

    #[tokio::test]
    async fn failed_connect_clears_slot_so_next_acquire_retries() {
        let connector = StubConnector::open();
        connector.fail_next_connect(TransportError::new("broker unavailable"));
        let registry = make_registry(connector.clone(), Arc::new(SubscriptionLedger::new()));
        let credential = CredentialKey::new("key-a");

        assert!(registry.acquire_connection(&credential).await.is_err());
        assert_eq!(
            registry.connection_state(&credential).await,
            ConnectionState::Idle
        );

        assert!(registry.acquire_connection(&credential).await.is_ok());
        assert_eq!(connector.connect_calls(), 2);
    }

    #[tokio::test]
    async fn live_connection_is_reused_without_connecting() {
        let connector = StubConnector::open();
        let registry = make_registry(connector.clone(), Arc::new(SubscriptionLedger::new()));
        let credential = CredentialKey::new("key-a");

        let first = registry
            .acquire_connection(&credential)
            .await
            .expect("first acquire");
        let second = registry
            .acquire_connection(&credential)
            .await
            .expect("second acquire");

        assert!(first.same_connection(&second));
        assert_eq!(connector.connect_calls(), 1);
        assert!(registry.current_connection(&credential).await.is_some());
    }

    #[tokio::test]
    async fn credentials_get_independent_connections() {
        let connector = StubConnector::open();
        let registry = make_registry(connector.clone(), Arc::new(SubscriptionLedger::new()));

        let first = registry
            .acquire_connection(&CredentialKey::new("key-a"))
            .await
            .expect("acquire key-a");
        let second = registry
            .acquire_connection(&CredentialKey::new("key-b"))
            .await
            .expect("acquire key-b");

        assert!(!first.same_connection(&second));
        assert_eq!(connector.connect_calls(), 2);
        let key_b = connector.connection(1);
        let options = &key_b.options;
        assert_eq!(options.password, "key-b");
        assert_eq!(options.username, "authorization");
    }

    #[tokio::test]
    async fn close_returns_slot_to_idle_and_reconnect_replays_ledger() {
        let connector = StubConnector::open();
        let ledger = Arc::new(SubscriptionLedger::new());
        let registry = make_registry(connector.clone(), ledger.clone());
        let credential = CredentialKey::new("key-a");

        let first = registry
            .acquire_connection(&credential)
            .await
            .expect("first acquire");
        ledger.record_subscribed(&credential, "/thngs/T1/properties");
        ledger.record_subscribed(&credential, "/thngs/T1/actions/all");

        connector.connection(0).close();
        wait_for_state(&registry, &credential, ConnectionState::Idle).await;
        assert!(registry.current_connection(&credential).await.is_none());

        let second = registry
            .acquire_connection(&credential)
            .await
            .expect("reconnect");

        assert!(!first.same_connection(&second));
        assert_ne!(first.client_id(), second.client_id());
        assert_eq!(connector.connect_calls(), 2);
        assert_eq!(
            connector.connection(1).subscribed(),
            vec![
                "/thngs/T1/actions/all".to_string(),
                "/thngs/T1/properties".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn disconnected_slot_without_close_event_is_replaced() {
        let connector = StubConnector::open();
        let registry = make_registry(connector.clone(), Arc::new(SubscriptionLedger::new()));
        let credential = CredentialKey::new("key-a");

        registry
            .acquire_connection(&credential)
            .await
            .expect("first acquire");
        connector
            .connection(0)
            .connected
            .store(false, Ordering::SeqCst);

        assert!(registry.current_connection(&credential).await.is_none());
        let second = registry
            .acquire_connection(&credential)
            .await
            .expect("second acquire");

        assert!(second.is_connected());
        assert_eq!(connector.connect_calls(), 2);
    }

    #[tokio::test]
    async fn replay_failures_do_not_fail_the_connect() {
        let connector = StubConnector::open();
        let ledger = Arc::new(SubscriptionLedger::new());
        let credential = CredentialKey::new("key-a");
        ledger.record_subscribed(&credential, "/refused/topic");
        ledger.record_subscribed(&credential, "/thngs/T1/properties");
        let registry = make_registry(connector.clone(), ledger.clone());

        let connection = registry.acquire_connection(&credential).await;

        assert!(connection.is_ok());
        assert_eq!(
            connector.connection(0).subscribed(),
            vec!["/thngs/T1/properties".to_string()]
        );
        assert!(ledger.is_subscribed(&credential, "/refused/topic"));
    }

    #[tokio::test]
    async fn listener_follows_the_credential_across_reconnects() {
        let connector = StubConnector::open();
        let registry = make_registry(connector.clone(), Arc::new(SubscriptionLedger::new()));
        let credential = CredentialKey::new("key-a");
        let mut relayed = registry.listen(&credential);

        registry
            .acquire_connection(&credential)
            .await
            .expect("first acquire");
        connector.connection(0).close();

        let closed = tokio::time::timeout(Duration::from_secs(2), relayed.recv())
            .await
            .expect("close should be relayed")
            .expect("relay open");
        assert_eq!(closed, RelayedEvent::Connection(ConnectionEvent::Closed));
        assert_eq!(
            registry.connection_state(&credential).await,
            ConnectionState::Idle
        );

        registry
            .acquire_connection(&credential)
            .await
            .expect("reconnect");
        let message = ConnectionEvent::Message(InboundMessage::new("/thngs/T1/properties", "21"));
        connector
            .connection(1)
            .events
            .send(message.clone())
            .expect("relay should be listening");

        let forwarded = tokio::time::timeout(Duration::from_secs(2), relayed.recv())
            .await
            .expect("message should be relayed")
            .expect("relay open");
        assert_eq!(forwarded, RelayedEvent::Connection(message));
    }
}
