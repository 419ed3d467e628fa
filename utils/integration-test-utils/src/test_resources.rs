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
    InterceptAction, OutgoingRequest, RequestError, RequestInterceptor, Resource, ResourceKind,
    ResourceWriter, WriteStrategy,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};

pub struct TestResource {
    path: String,
    kind: ResourceKind,
}

impl TestResource {
    pub fn new(path: &str, kind: ResourceKind) -> Arc<Self> {
        Arc::new(Self {
            path: path.to_string(),
            kind,
        })
    }

    pub fn thng_properties(thng: &str) -> Arc<Self> {
        Self::new(&format!("/thngs/{thng}/properties"), ResourceKind::Other)
    }

    pub fn thng_actions(thng: &str) -> Arc<Self> {
        Self::new(&format!("/thngs/{thng}/actions/all"), ResourceKind::Action)
    }
}

impl Resource for TestResource {
    fn path(&self) -> &str {
        &self.path
    }

    fn kind(&self) -> ResourceKind {
        self.kind
    }
}

#[derive(Clone, Debug)]
pub enum WriterBehavior {
    /// Builds the request and honors the interceptor's answer.
    Intercept,
    /// Fails before any interceptor runs.
    FailWith(RequestError),
    /// Completes without consulting the interceptor.
    SkipInterceptor,
    /// Consults the interceptor, then sends the request whatever it answered.
    IgnoreCancel,
}

/// Stand-in for a request/response client; records every write it is asked for.
pub struct InterceptingWriter {
    path: String,
    behavior: WriterBehavior,
    writes: Mutex<Vec<(WriteStrategy, Value)>>,
    sent: Mutex<Vec<OutgoingRequest>>,
}

impl InterceptingWriter {
    pub fn new(path: &str, behavior: WriterBehavior) -> Self {
        Self {
            path: path.to_string(),
            behavior,
            writes: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn for_resource(resource: &dyn Resource) -> Self {
        Self::new(resource.path(), WriterBehavior::Intercept)
    }

    pub fn writes(&self) -> Vec<(WriteStrategy, Value)> {
        self.writes.lock().expect("lock writes").clone()
    }

    /// Requests the interceptor let through to the "network".
    pub fn sent(&self) -> Vec<OutgoingRequest> {
        self.sent.lock().expect("lock sent").clone()
    }
}

#[async_trait]
impl ResourceWriter for InterceptingWriter {
    async fn write(
        &self,
        strategy: WriteStrategy,
        payload: Value,
        interceptor: Arc<dyn RequestInterceptor>,
    ) -> Result<Value, RequestError> {
        self.writes
            .lock()
            .expect("lock writes")
            .push((strategy, payload.clone()));

        match &self.behavior {
            WriterBehavior::FailWith(error) => Err(error.clone()),
            WriterBehavior::SkipInterceptor => Ok(payload),
            WriterBehavior::Intercept | WriterBehavior::IgnoreCancel => {
                let request = OutgoingRequest {
                    strategy,
                    path: self.path.clone(),
                    data: payload,
                };
                let action = interceptor.intercept(&request);
                if action == InterceptAction::Cancel
                    && matches!(self.behavior, WriterBehavior::Intercept)
                {
                    return Err(RequestError::Cancelled);
                }
                let data = request.data.clone();
                self.sent.lock().expect("lock sent").push(request);
                Ok(data)
            }
        }
    }
}
