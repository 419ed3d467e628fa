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

//! Optional completion callbacks.
//!
//! Every operation both returns its `Result` and reports through these hooks, so
//! callers can pick whichever style suits them.

use crate::data_plane::message_dispatch::DecodedMessage;
use crate::error::PubSubError;
use crate::transport::ConnectionHandle;
use std::sync::Arc;

/// Invoked once per inbound message on the subscribed topic.
pub type MessageCallback = Arc<dyn Fn(DecodedMessage) + Send + Sync>;

pub type SuccessCallback = Box<dyn FnOnce(&ConnectionHandle) + Send>;

/// May fire more than once: subscriptions forward later transport errors here.
pub type ErrorCallback = Arc<dyn Fn(&PubSubError) + Send + Sync>;

#[derive(Default)]
pub struct Callbacks {
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, callback: impl FnOnce(&ConnectionHandle) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&PubSubError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }

    pub(crate) fn error_callback(&self) -> Option<ErrorCallback> {
        self.on_error.clone()
    }

    pub(crate) fn succeed(self, connection: &ConnectionHandle) {
        if let Some(on_success) = self.on_success {
            on_success(connection);
        }
    }

    /// Reports `error` to the error callback and hands it back for the `Err` path.
    pub(crate) fn fail(&self, error: PubSubError) -> PubSubError {
        if let Some(on_error) = self.on_error.as_ref() {
            on_error(&error);
        }
        error
    }
}

/// Wraps a closure as a [`MessageCallback`].
pub fn message_callback(callback: impl Fn(DecodedMessage) + Send + Sync + 'static) -> MessageCallback {
    Arc::new(callback)
}

#[cfg(test)]
mod tests {
    use super::Callbacks;
    use crate::error::PubSubError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn fail_reports_to_error_callback_and_returns_error() {
        let reported = Arc::new(AtomicUsize::new(0));
        let counter = reported.clone();
        let callbacks = Callbacks::new().on_error(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let returned = callbacks.fail(PubSubError::NotConnected);

        assert_eq!(returned, PubSubError::NotConnected);
        assert_eq!(reported.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fail_without_error_callback_only_returns_error() {
        let callbacks = Callbacks::new();

        assert_eq!(
            callbacks.fail(PubSubError::ConnectionClosed),
            PubSubError::ConnectionClosed
        );
    }
}
