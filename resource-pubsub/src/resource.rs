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

//! Resource and request collaborator seams.

use async_trait::async_trait;
use serde_json::Value;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Semantic class of a resource.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ResourceKind {
    /// Action resources accept new entries through `create`.
    Action,
    #[default]
    Other,
}

/// A resource addressable both through request/response and through pub/sub.
pub trait Resource: Send + Sync {
    /// Topic path of the resource, e.g. `/thngs/T1/properties`.
    fn path(&self) -> &str;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Other
    }

    /// Converts a decoded inbound body into the resource's native representation.
    fn parse(&self, body: Value) -> Result<Value, serde_json::Error> {
        Ok(body)
    }

    /// Normalizes an outgoing payload before it is encoded for publishing.
    fn jsonify(&self, payload: Value) -> Value {
        payload
    }
}

/// Which request/response write a resource would normally perform.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum WriteStrategy {
    Create,
    Update,
}

impl WriteStrategy {
    /// Actions publish on create, every other resource publishes on update.
    pub fn for_kind(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Action => WriteStrategy::Create,
            ResourceKind::Other => WriteStrategy::Update,
        }
    }
}

impl Display for WriteStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            WriteStrategy::Create => write!(f, "create"),
            WriteStrategy::Update => write!(f, "update"),
        }
    }
}

/// A request about to leave the request/response pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct OutgoingRequest {
    pub strategy: WriteStrategy,
    pub path: String,
    /// Normalized body as it would be sent over the network.
    pub data: Value,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InterceptAction {
    Proceed,
    Cancel,
}

/// Hook consulted by a [`ResourceWriter`] before the request reaches the network.
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, request: &OutgoingRequest) -> InterceptAction;
}

/// Failure of a request/response write.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RequestError {
    /// An interceptor cancelled the request before it was sent.
    Cancelled,
    Failed(String),
}

impl Display for RequestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Cancelled => write!(f, "request cancelled"),
            RequestError::Failed(reason) => write!(f, "request failed: {reason}"),
        }
    }
}

impl Error for RequestError {}

/// The request/response collaborator that normally performs create/update.
///
/// Implementations normalize `payload`, build the outgoing request and consult
/// `interceptor` before any network activity. A `Cancel` answer must surface as
/// [`RequestError::Cancelled`].
#[async_trait]
pub trait ResourceWriter: Send + Sync {
    async fn write(
        &self,
        strategy: WriteStrategy,
        payload: Value,
        interceptor: Arc<dyn RequestInterceptor>,
    ) -> Result<Value, RequestError>;
}
