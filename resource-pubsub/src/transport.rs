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

//! Publish/subscribe transport seam.
//!
//! The crate never speaks a wire protocol itself. Embedders implement
//! [`TransportConnector`] and [`TransportConnection`] over their client library
//! of choice and hand the connector to [`PubSubContext`][crate::PubSubContext].

use async_trait::async_trait;
use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Failure reported by the transport collaborator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for TransportError {}

/// Options handed to [`TransportConnector::connect`] for one connection attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub client_id: String,
    pub username: String,
    pub password: String,
    pub keep_alive: Duration,
    pub reconnect_period: Duration,
}

impl Debug for ConnectOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectOptions")
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("keep_alive", &self.keep_alive)
            .field("reconnect_period", &self.reconnect_period)
            .finish_non_exhaustive()
    }
}

/// One message received from the transport.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InboundMessage {
    pub topic: String,
    pub body: Vec<u8>,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            body: body.into(),
        }
    }
}

/// Asynchronous notifications emitted by a live connection.
#[derive(Clone, Debug, PartialEq)]
pub enum ConnectionEvent {
    Message(InboundMessage),
    Error(TransportError),
    /// The transport gave up on the connection without an explicit error.
    Closed,
}

/// Transport call kinds, used to label [`PubSubError::Operation`][crate::PubSubError].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TransportOperation {
    Subscribe,
    Unsubscribe,
    Publish,
}

impl Display for TransportOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TransportOperation::Subscribe => write!(f, "subscribe"),
            TransportOperation::Unsubscribe => write!(f, "unsubscribe"),
            TransportOperation::Publish => write!(f, "publish"),
        }
    }
}

/// Establishes transport connections.
#[async_trait]
pub trait TransportConnector: Send + Sync {
    /// Connects to `server_url`. Resolves once the transport reports the
    /// connection as established, or fails with the connect/authentication error.
    async fn connect(
        &self,
        server_url: &str,
        options: ConnectOptions,
    ) -> Result<Arc<dyn TransportConnection>, TransportError>;
}

/// An established transport connection.
///
/// Implementations must deliver inbound messages, asynchronous errors and the
/// close notification to every receiver handed out by [`events`](Self::events).
#[async_trait]
pub trait TransportConnection: Send + Sync {
    fn client_id(&self) -> &str;

    fn is_connected(&self) -> bool;

    async fn subscribe(&self, topic: &str) -> Result<(), TransportError>;

    async fn unsubscribe(&self, topic: &str) -> Result<(), TransportError>;

    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError>;

    fn events(&self) -> broadcast::Receiver<ConnectionEvent>;
}

/// Shared handle to a registry-owned connection.
#[derive(Clone)]
pub struct ConnectionHandle {
    connection: Arc<dyn TransportConnection>,
}

impl ConnectionHandle {
    pub(crate) fn new(connection: Arc<dyn TransportConnection>) -> Self {
        Self { connection }
    }

    pub fn client_id(&self) -> &str {
        self.connection.client_id()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// `true` when both handles point at the same underlying connection.
    pub fn same_connection(&self, other: &ConnectionHandle) -> bool {
        Arc::ptr_eq(&self.connection, &other.connection)
    }

    pub fn transport(&self) -> &Arc<dyn TransportConnection> {
        &self.connection
    }
}

impl Debug for ConnectionHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("client_id", &self.client_id())
            .field("connected", &self.is_connected())
            .finish()
    }
}
