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

//! Redirects a resource write (create/update) into a publish on the resource topic.
//!
//! The regular [`ResourceWriter`] still builds and normalizes the request; an
//! interceptor captures the outgoing body and cancels the request before it
//! reaches the network, and the captured body is published instead.

use crate::callbacks::Callbacks;
use crate::data_plane::topic_session::TopicSession;
use crate::error::PubSubError;
use crate::observability::events;
use crate::resource::{
    InterceptAction, OutgoingRequest, RequestError, RequestInterceptor, ResourceWriter,
    WriteStrategy,
};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

const COMPONENT: &str = "write_redirect";
const REASON_CANCEL_IGNORED: &str = "cancel_ignored";
const REASON_INTERCEPTOR_SKIPPED: &str = "interceptor_skipped";

#[derive(Default)]
struct PublishRedirect {
    captured: Mutex<Option<Value>>,
}

impl PublishRedirect {
    fn take(&self) -> Option<Value> {
        self.captured
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl RequestInterceptor for PublishRedirect {
    fn intercept(&self, request: &OutgoingRequest) -> InterceptAction {
        *self.captured.lock().unwrap_or_else(PoisonError::into_inner) = Some(request.data.clone());
        InterceptAction::Cancel
    }
}

/// Runs `strategy` through `writer`, cancels the outgoing request and publishes
/// its normalized body on the session's topic instead.
///
/// A missing payload is written as an empty JSON object. The cancellation is
/// expected and never reported; any other writer failure is reported as
/// [`PubSubError::Request`]. A writer that completes the request, whether it
/// skipped the interceptor or ignored its cancel, yields
/// [`PubSubError::NotRedirected`] and nothing is published.
pub async fn perform_write_or_publish(
    session: &TopicSession,
    writer: &dyn ResourceWriter,
    strategy: WriteStrategy,
    payload: Option<Value>,
    callbacks: Callbacks,
) -> Result<(), PubSubError> {
    let payload = payload.unwrap_or_else(|| Value::Object(Map::new()));
    let redirect = Arc::new(PublishRedirect::default());

    match writer.write(strategy, payload, redirect.clone()).await {
        Ok(_) => {
            let reason = match redirect.take() {
                Some(_) => REASON_CANCEL_IGNORED,
                None => REASON_INTERCEPTOR_SKIPPED,
            };
            warn!(
                event = events::REDIRECT_BYPASSED,
                component = COMPONENT,
                credential = %session.credential(),
                topic = session.topic(),
                strategy = %strategy,
                reason,
                "writer completed the request instead of cancelling it"
            );
            return Err(callbacks.fail(PubSubError::NotRedirected));
        }
        Err(RequestError::Cancelled) => {
            debug!(
                event = events::REDIRECT_CANCELLED_REQUEST,
                component = COMPONENT,
                credential = %session.credential(),
                topic = session.topic(),
                strategy = %strategy,
                "request cancelled for publish redirect"
            );
        }
        Err(err) => {
            warn!(
                event = events::REDIRECT_REQUEST_FAILED,
                component = COMPONENT,
                credential = %session.credential(),
                topic = session.topic(),
                strategy = %strategy,
                err = %err,
                "write failed before it could be redirected"
            );
            return Err(callbacks.fail(PubSubError::Request(err)));
        }
    }

    let Some(captured) = redirect.take() else {
        warn!(
            event = events::REDIRECT_BYPASSED,
            component = COMPONENT,
            credential = %session.credential(),
            topic = session.topic(),
            strategy = %strategy,
            reason = REASON_INTERCEPTOR_SKIPPED,
            "request cancelled without consulting the redirect interceptor"
        );
        return Err(callbacks.fail(PubSubError::NotRedirected));
    };

    session.publish(captured, callbacks).await
}

impl TopicSession {
    /// Publishes `payload` through the write the resource would normally use:
    /// `create` for actions, `update` for everything else.
    pub async fn redirect_to_publish(
        &self,
        writer: &dyn ResourceWriter,
        payload: Option<Value>,
        callbacks: Callbacks,
    ) -> Result<(), PubSubError> {
        let strategy = WriteStrategy::for_kind(self.resource().kind());
        perform_write_or_publish(self, writer, strategy, payload, callbacks).await
    }
}
