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

//! Subscribe, unsubscribe and publish for one resource topic.

use crate::callbacks::{Callbacks, MessageCallback};
use crate::context::PubSubContext;
use crate::control_plane::credential::CredentialKey;
use crate::data_plane::message_dispatch::DispatchHandle;
use crate::error::PubSubError;
use crate::observability::{events, fields};
use crate::resource::Resource;
use crate::transport::{ConnectionHandle, TransportOperation};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

const COMPONENT: &str = "topic_session";

/// One pub/sub relationship between a resource path and its credential's connection.
///
/// The session owns the dispatch loop of its active subscription; dropping the
/// session stops message delivery to its callback. Ledger entries outlive the
/// session and keep being replayed on reconnect until unsubscribed.
pub struct TopicSession {
    context: PubSubContext,
    credential: CredentialKey,
    resource: Arc<dyn Resource>,
    dispatch: Mutex<Option<DispatchHandle>>,
}

impl TopicSession {
    pub(crate) fn new(
        context: PubSubContext,
        credential: CredentialKey,
        resource: Arc<dyn Resource>,
    ) -> Self {
        Self {
            context,
            credential,
            resource,
            dispatch: Mutex::new(None),
        }
    }

    pub fn topic(&self) -> &str {
        self.resource.path()
    }

    pub fn credential(&self) -> &CredentialKey {
        &self.credential
    }

    pub fn resource(&self) -> &Arc<dyn Resource> {
        &self.resource
    }

    /// `true` while a dispatch loop is delivering messages to the subscribe callback.
    pub fn is_dispatching(&self) -> bool {
        self.lock_dispatch()
            .as_ref()
            .is_some_and(|dispatch| !dispatch.is_finished())
    }

    fn lock_dispatch(&self) -> MutexGuard<'_, Option<DispatchHandle>> {
        self.dispatch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace_dispatch(&self, next: Option<DispatchHandle>, reason: &str) {
        let previous = std::mem::replace(&mut *self.lock_dispatch(), next);
        if previous.is_some() {
            debug!(
                event = events::DISPATCH_STOPPED,
                component = COMPONENT,
                credential = %self.credential,
                topic = self.topic(),
                reason,
                "stopping previous dispatch loop"
            );
        }
    }

    /// Subscribes to the resource topic and routes its messages to `on_message`.
    ///
    /// A missing `on_message` is rejected before any connection is requested.
    /// Transport errors, closes and dropped messages that arrive after the
    /// subscription succeeded are reported to the error callback of `callbacks`.
    /// Delivery resumes on the replayed subscription once the credential reconnects.
    pub async fn subscribe(
        &self,
        on_message: Option<MessageCallback>,
        callbacks: Callbacks,
    ) -> Result<ConnectionHandle, PubSubError> {
        let topic = self.topic();

        let Some(on_message) = on_message else {
            warn!(
                event = events::SUBSCRIBE_REJECTED,
                component = COMPONENT,
                credential = %self.credential,
                topic,
                reason = "missing_message_callback",
                "subscribe called without a message callback"
            );
            return Err(callbacks.fail(PubSubError::InvalidArgument(
                "message callback missing".to_string(),
            )));
        };

        let connection = match self
            .context
            .registry()
            .acquire_connection(&self.credential)
            .await
        {
            Ok(connection) => connection,
            Err(err) => {
                warn!(
                    event = events::SUBSCRIBE_FAILED,
                    component = COMPONENT,
                    credential = %self.credential,
                    topic,
                    client_id = fields::NONE,
                    err = %err,
                    "unable to acquire connection for subscribe"
                );
                return Err(callbacks.fail(err));
            }
        };

        // Listen before subscribing so messages sent right after the ack are seen.
        let relayed = self.context.registry().listen(&self.credential);

        // A close that landed before the listener existed is not relayed to it.
        if !connection.is_connected() {
            warn!(
                event = events::SUBSCRIBE_FAILED,
                component = COMPONENT,
                credential = %self.credential,
                topic,
                client_id = connection.client_id(),
                reason = "not_connected",
                "connection dropped before subscribe"
            );
            return Err(callbacks.fail(PubSubError::NotConnected));
        }

        if let Err(err) = connection.transport().subscribe(topic).await {
            warn!(
                event = events::SUBSCRIBE_FAILED,
                component = COMPONENT,
                credential = %self.credential,
                topic,
                client_id = connection.client_id(),
                err = %err,
                "transport rejected subscribe"
            );
            return Err(callbacks.fail(PubSubError::operation(
                TransportOperation::Subscribe,
                err,
            )));
        }

        self.context
            .ledger()
            .record_subscribed(&self.credential, topic);

        let dispatch = DispatchHandle::spawn(
            self.resource.clone(),
            self.credential.clone(),
            relayed,
            on_message,
            callbacks.error_callback(),
        );
        self.replace_dispatch(Some(dispatch), fields::REASON_REPLACED);

        info!(
            event = events::SUBSCRIBE_OK,
            component = COMPONENT,
            credential = %self.credential,
            topic,
            client_id = connection.client_id(),
            "subscribed"
        );
        callbacks.succeed(&connection);
        Ok(connection)
    }

    /// Unsubscribes the resource topic on the live connection.
    ///
    /// Never connects: without a live connection this fails with
    /// [`PubSubError::NotConnected`] and makes no transport call.
    pub async fn unsubscribe(&self, callbacks: Callbacks) -> Result<ConnectionHandle, PubSubError> {
        let topic = self.topic();

        let Some(connection) = self
            .context
            .registry()
            .current_connection(&self.credential)
            .await
        else {
            warn!(
                event = events::UNSUBSCRIBE_FAILED,
                component = COMPONENT,
                credential = %self.credential,
                topic,
                client_id = fields::NONE,
                reason = "not_connected",
                "unsubscribe without a live connection"
            );
            return Err(callbacks.fail(PubSubError::NotConnected));
        };

        if let Err(err) = connection.transport().unsubscribe(topic).await {
            warn!(
                event = events::UNSUBSCRIBE_FAILED,
                component = COMPONENT,
                credential = %self.credential,
                topic,
                client_id = connection.client_id(),
                err = %err,
                "transport rejected unsubscribe"
            );
            return Err(callbacks.fail(PubSubError::operation(
                TransportOperation::Unsubscribe,
                err,
            )));
        }

        self.context
            .ledger()
            .record_unsubscribed(&self.credential, topic);
        self.replace_dispatch(None, fields::REASON_UNSUBSCRIBED);

        info!(
            event = events::UNSUBSCRIBE_OK,
            component = COMPONENT,
            credential = %self.credential,
            topic,
            client_id = connection.client_id(),
            "unsubscribed"
        );
        callbacks.succeed(&connection);
        Ok(connection)
    }

    /// Publishes `payload` on the resource topic as compact JSON text.
    ///
    /// The payload passes through the resource's `jsonify` hook first.
    pub async fn publish(&self, payload: Value, callbacks: Callbacks) -> Result<(), PubSubError> {
        let topic = self.topic();

        let encoded = match serde_json::to_string(&self.resource.jsonify(payload)) {
            Ok(encoded) => encoded,
            Err(err) => {
                return Err(callbacks.fail(PubSubError::InvalidArgument(err.to_string())));
            }
        };

        let connection = match self
            .context
            .registry()
            .acquire_connection(&self.credential)
            .await
        {
            Ok(connection) => connection,
            Err(err) => {
                warn!(
                    event = events::PUBLISH_FAILED,
                    component = COMPONENT,
                    credential = %self.credential,
                    topic,
                    client_id = fields::NONE,
                    err = %err,
                    "unable to acquire connection for publish"
                );
                return Err(callbacks.fail(err));
            }
        };

        if !connection.is_connected() {
            warn!(
                event = events::PUBLISH_FAILED,
                component = COMPONENT,
                credential = %self.credential,
                topic,
                client_id = connection.client_id(),
                reason = "not_connected",
                "connection dropped before publish"
            );
            return Err(callbacks.fail(PubSubError::NotConnected));
        }

        let body_len = encoded.len();
        if let Err(err) = connection
            .transport()
            .publish(topic, encoded.into_bytes())
            .await
        {
            warn!(
                event = events::PUBLISH_FAILED,
                component = COMPONENT,
                credential = %self.credential,
                topic,
                client_id = connection.client_id(),
                err = %err,
                "transport rejected publish"
            );
            return Err(callbacks.fail(PubSubError::operation(
                TransportOperation::Publish,
                err,
            )));
        }

        debug!(
            event = events::PUBLISH_OK,
            component = COMPONENT,
            credential = %self.credential,
            topic,
            client_id = connection.client_id(),
            body_len,
            "published"
        );
        callbacks.succeed(&connection);
        Ok(())
    }
}
