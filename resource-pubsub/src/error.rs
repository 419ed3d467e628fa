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

use crate::resource::RequestError;
use crate::transport::{TransportError, TransportOperation};
use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Failures surfaced by subscribe, unsubscribe, publish and write redirection.
///
/// `Clone` so a single connect failure can be handed to every waiter of the
/// same attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum PubSubError {
    /// Bad settings object or a missing message callback.
    InvalidArgument(String),
    /// The operation needs a live connection and none exists.
    NotConnected,
    /// Connect or authentication failure.
    Connection(TransportError),
    /// The transport rejected a subscribe, unsubscribe or publish.
    Operation {
        operation: TransportOperation,
        source: TransportError,
    },
    /// The intercepted write failed for a reason other than its cancellation.
    Request(RequestError),
    /// The write was not turned into a publish: the writer never consulted the
    /// redirect interceptor, or sent the request despite its cancellation.
    NotRedirected,
    /// The connection behind an active subscription was closed. The subscription
    /// resumes once the credential reconnects.
    ConnectionClosed,
    /// A subscriber fell behind the inbound event buffer and `skipped` events
    /// never reached its message callback.
    MessagesDropped { skipped: u64 },
}

impl PubSubError {
    pub(crate) fn operation(operation: TransportOperation, source: TransportError) -> Self {
        PubSubError::Operation { operation, source }
    }
}

impl Display for PubSubError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PubSubError::InvalidArgument(reason) => write!(f, "invalid argument: {reason}"),
            PubSubError::NotConnected => write!(f, "transport client is not connected"),
            PubSubError::Connection(err) => write!(f, "unable to connect: {err}"),
            PubSubError::Operation { operation, source } => {
                write!(f, "{operation} rejected by transport: {source}")
            }
            PubSubError::Request(err) => write!(f, "intercepted write failed: {err}"),
            PubSubError::NotRedirected => write!(f, "write was not redirected to publish"),
            PubSubError::ConnectionClosed => write!(f, "transport connection closed"),
            PubSubError::MessagesDropped { skipped } => {
                write!(f, "{skipped} inbound messages dropped by a lagging subscriber")
            }
        }
    }
}

impl Error for PubSubError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PubSubError::Connection(err) => Some(err),
            PubSubError::Operation { source, .. } => Some(source),
            PubSubError::Request(err) => Some(err),
            _ => None,
        }
    }
}
