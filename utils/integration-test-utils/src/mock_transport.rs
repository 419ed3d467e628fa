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

use async_trait::async_trait;
use resource_pubsub::{
    ConnectOptions, ConnectionEvent, InboundMessage, TransportConnection, TransportConnector,
    TransportError, TransportOperation,
};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, Semaphore};
use tracing::debug;

const OPEN_GATE_PERMITS: usize = 1024;
const EVENT_CAPACITY: usize = 64;

/// One call made against a [`MockConnection`], in call order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportCall {
    Subscribe(String),
    Unsubscribe(String),
    Publish(String, Vec<u8>),
}

pub struct MockConnection {
    client_id: String,
    options: ConnectOptions,
    connected: AtomicBool,
    calls: Mutex<Vec<TransportCall>>,
    failing: Mutex<HashSet<TransportOperation>>,
    events: broadcast::Sender<ConnectionEvent>,
}

impl MockConnection {
    pub fn new(options: ConnectOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client_id: options.client_id.clone(),
            options,
            connected: AtomicBool::new(true),
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            events,
        }
    }

    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().expect("lock calls").clone()
    }

    pub fn published(&self) -> Vec<(String, Vec<u8>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::Publish(topic, body) => Some((topic, body)),
                _ => None,
            })
            .collect()
    }

    pub fn subscribed_topics(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::Subscribe(topic) => Some(topic),
                _ => None,
            })
            .collect()
    }

    /// Makes every later call of `operation` fail.
    pub fn fail(&self, operation: TransportOperation) {
        self.failing
            .lock()
            .expect("lock failing")
            .insert(operation);
    }

    /// Sends an inbound message; returns how many listeners received it.
    pub fn deliver(&self, topic: &str, body: impl Into<Vec<u8>>) -> usize {
        self.events
            .send(ConnectionEvent::Message(InboundMessage::new(topic, body)))
            .unwrap_or(0)
    }

    pub fn emit_error(&self, message: &str) -> usize {
        self.events
            .send(ConnectionEvent::Error(TransportError::new(message)))
            .unwrap_or(0)
    }

    /// Drops the connection and announces the close to every listener.
    pub fn close(&self) {
        self.connected.store(false, Ordering::SeqCst);
        let _ = self.events.send(ConnectionEvent::Closed);
    }

    /// Drops the connection without emitting any event.
    pub fn disconnect_silently(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    fn record(
        &self,
        operation: TransportOperation,
        call: TransportCall,
    ) -> Result<(), TransportError> {
        debug!("{}: {operation} {call:?}", self.client_id);
        if self
            .failing
            .lock()
            .expect("lock failing")
            .contains(&operation)
        {
            return Err(TransportError::new(format!("{operation} refused by broker")));
        }
        self.calls.lock().expect("lock calls").push(call);
        Ok(())
    }
}

#[async_trait]
impl TransportConnection for MockConnection {
    fn client_id(&self) -> &str {
        &self.client_id
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn subscribe(&self, topic: &str) -> Result<(), TransportError> {
        self.record(
            TransportOperation::Subscribe,
            TransportCall::Subscribe(topic.to_string()),
        )
    }

    async fn unsubscribe(&self, topic: &str) -> Result<(), TransportError> {
        self.record(
            TransportOperation::Unsubscribe,
            TransportCall::Unsubscribe(topic.to_string()),
        )
    }

    async fn publish(&self, topic: &str, body: Vec<u8>) -> Result<(), TransportError> {
        self.record(
            TransportOperation::Publish,
            TransportCall::Publish(topic.to_string(), body),
        )
    }

    fn events(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events.subscribe()
    }
}

/// Connector handing out [`MockConnection`]s, with a gate to hold attempts open.
pub struct MockConnector {
    gate: Semaphore,
    connect_calls: AtomicUsize,
    failures: Mutex<VecDeque<TransportError>>,
    drop_next: AtomicBool,
    connections: Mutex<Vec<Arc<MockConnection>>>,
}

impl MockConnector {
    /// Connects immediately.
    pub fn open() -> Arc<Self> {
        Arc::new(Self::with_permits(OPEN_GATE_PERMITS))
    }

    /// Parks every connect attempt until [`MockConnector::release`] is called.
    pub fn held() -> Arc<Self> {
        Arc::new(Self::with_permits(0))
    }

    fn with_permits(permits: usize) -> Self {
        Self {
            gate: Semaphore::new(permits),
            connect_calls: AtomicUsize::new(0),
            failures: Mutex::new(VecDeque::new()),
            drop_next: AtomicBool::new(false),
            connections: Mutex::new(Vec::new()),
        }
    }

    pub fn release(&self) {
        self.gate.add_permits(OPEN_GATE_PERMITS);
    }

    /// The next connect attempt fails with `error`.
    pub fn fail_next_connect(&self, error: TransportError) {
        self.failures
            .lock()
            .expect("lock failures")
            .push_back(error);
    }

    /// The next connect succeeds, but its connection is already dropped when handed out.
    pub fn drop_next_connection_on_connect(&self) {
        self.drop_next.store(true, Ordering::SeqCst);
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn connections(&self) -> Vec<Arc<MockConnection>> {
        self.connections.lock().expect("lock connections").clone()
    }

    pub fn connection(&self, index: usize) -> Arc<MockConnection> {
        self.connections
            .lock()
            .expect("lock connections")
            .get(index)
            .cloned()
            .unwrap_or_else(|| panic!("no connection at index {index}"))
    }

    pub fn latest_connection(&self) -> Arc<MockConnection> {
        self.connections
            .lock()
            .expect("lock connections")
            .last()
            .cloned()
            .expect("at least one connection")
    }
}

#[async_trait]
impl TransportConnector for MockConnector {
    async fn connect(
        &self,
        server_url: &str,
        options: ConnectOptions,
    ) -> Result<Arc<dyn TransportConnection>, TransportError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        debug!("connecting {} to {server_url}", options.client_id);

        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| TransportError::new("connector gate closed"))?;

        if let Some(error) = self.failures.lock().expect("lock failures").pop_front() {
            return Err(error);
        }

        let connection = Arc::new(MockConnection::new(options));
        if self.drop_next.swap(false, Ordering::SeqCst) {
            connection.disconnect_silently();
        }
        self.connections
            .lock()
            .expect("lock connections")
            .push(connection.clone());
        Ok(connection)
    }
}
