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

//! Inbound message decoding and the per-subscription dispatch loop.

use crate::callbacks::{ErrorCallback, MessageCallback};
use crate::control_plane::connection_registry::RelayedEvent;
use crate::control_plane::credential::CredentialKey;
use crate::error::PubSubError;
use crate::observability::{events, fields};
use crate::resource::Resource;
use crate::transport::ConnectionEvent;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast::{error::RecvError, Receiver};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Level};

const COMPONENT: &str = "message_dispatch";

/// Body handed to a [`MessageCallback`].
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedMessage {
    /// JSON body converted by the resource's `parse` hook.
    Decoded(Value),
    /// Body that is not JSON, or that the resource could not parse.
    Raw(Vec<u8>),
}

impl DecodedMessage {
    pub fn as_decoded(&self) -> Option<&Value> {
        match self {
            DecodedMessage::Decoded(value) => Some(value),
            DecodedMessage::Raw(_) => None,
        }
    }

    /// The raw body as text, lossily converted.
    pub fn as_text(&self) -> Option<String> {
        match self {
            DecodedMessage::Decoded(_) => None,
            DecodedMessage::Raw(body) => Some(String::from_utf8_lossy(body).into_owned()),
        }
    }
}

/// Best-effort structured decode: JSON first, then the resource's `parse` hook.
pub fn decode_message(resource: &dyn Resource, body: &[u8]) -> DecodedMessage {
    serde_json::from_slice::<Value>(body)
        .and_then(|value| resource.parse(value))
        .map(DecodedMessage::Decoded)
        .unwrap_or_else(|_| DecodedMessage::Raw(body.to_vec()))
}

/// Running dispatch loop of one subscription. Dropping the handle stops it.
///
/// The loop listens on its credential's relay, so it outlives connection
/// generations: a close is reported and delivery resumes after the reconnect.
pub(crate) struct DispatchHandle {
    task: JoinHandle<()>,
}

impl DispatchHandle {
    pub(crate) fn spawn(
        resource: Arc<dyn Resource>,
        credential: CredentialKey,
        relayed: Receiver<RelayedEvent>,
        on_message: MessageCallback,
        on_error: Option<ErrorCallback>,
    ) -> Self {
        let task = tokio::spawn(dispatch_loop(
            resource, credential, relayed, on_message, on_error,
        ));
        Self { task }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for DispatchHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn report(on_error: Option<&ErrorCallback>, error: PubSubError) {
    if let Some(on_error) = on_error {
        on_error(&error);
    }
}

async fn dispatch_loop(
    resource: Arc<dyn Resource>,
    credential: CredentialKey,
    mut relayed: Receiver<RelayedEvent>,
    on_message: MessageCallback,
    on_error: Option<ErrorCallback>,
) {
    let topic = resource.path().to_string();

    loop {
        let skipped = match relayed.recv().await {
            Ok(RelayedEvent::Connection(ConnectionEvent::Message(message))) => {
                if message.topic != topic {
                    continue;
                }

                let decoded = decode_message(resource.as_ref(), &message.body);
                if tracing::enabled!(Level::DEBUG) {
                    let event = match decoded {
                        DecodedMessage::Decoded(_) => events::DISPATCH_MESSAGE,
                        DecodedMessage::Raw(_) => events::DISPATCH_RAW_FALLBACK,
                    };
                    debug!(
                        event,
                        component = COMPONENT,
                        credential = %credential,
                        topic = topic.as_str(),
                        body_len = message.body.len(),
                        "dispatching inbound message"
                    );
                }
                on_message(decoded);
                continue;
            }
            Ok(RelayedEvent::Connection(ConnectionEvent::Error(err))) => {
                warn!(
                    event = events::DISPATCH_TRANSPORT_ERROR,
                    component = COMPONENT,
                    credential = %credential,
                    topic = topic.as_str(),
                    err = %err,
                    "transport error on subscribed connection"
                );
                report(on_error.as_ref(), PubSubError::Connection(err));
                continue;
            }
            Ok(RelayedEvent::Connection(ConnectionEvent::Closed)) => {
                info!(
                    event = events::DISPATCH_CONNECTION_LOST,
                    component = COMPONENT,
                    credential = %credential,
                    topic = topic.as_str(),
                    "connection closed; waiting for reconnect"
                );
                report(on_error.as_ref(), PubSubError::ConnectionClosed);
                continue;
            }
            Ok(RelayedEvent::Dropped(skipped)) | Err(RecvError::Lagged(skipped)) => skipped,
            Err(RecvError::Closed) => {
                info!(
                    event = events::DISPATCH_STOPPED,
                    component = COMPONENT,
                    credential = %credential,
                    topic = topic.as_str(),
                    reason = fields::REASON_BROADCAST_CLOSED,
                    "relay closed; stopping dispatch loop"
                );
                break;
            }
        };

        warn!(
            event = events::DISPATCH_RECV_LAGGED,
            component = COMPONENT,
            credential = %credential,
            topic = topic.as_str(),
            skipped,
            "inbound events dropped"
        );
        report(on_error.as_ref(), PubSubError::MessagesDropped { skipped });
    }
}
