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

//! # resource-pubsub
//!
//! `resource-pubsub` lets resources that are normally read and written through a
//! request/response API also be subscribed to and published on over a pub/sub
//! transport.
//!
//! Typical usage is centered on [`PubSubContext`] and the [`TopicSession`] it
//! hands out for one resource and one credential. All sessions of a credential
//! share a single connection, and topics subscribed on that connection are
//! resubscribed automatically after it reconnects.
//!
//! ## Redirecting writes
//!
//! A create/update can be published instead of sent: the regular
//! [`ResourceWriter`] still normalizes the payload, the request is cancelled
//! before it leaves the process, and its body is published on the resource topic.
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use resource_pubsub::{
//!     Callbacks, InterceptAction, OutgoingRequest, PubSubContext, RequestError,
//!     RequestInterceptor, Resource, ResourceKind, ResourceWriter, WriteStrategy,
//! };
//! use serde_json::{json, Value};
//!
//! # pub mod mock_transport {
//! #     use std::sync::{Arc, Mutex};
//! #     use async_trait::async_trait;
//! #     use resource_pubsub::{
//! #         ConnectOptions, ConnectionEvent, TransportConnection, TransportConnector,
//! #         TransportError,
//! #     };
//! #     use tokio::sync::broadcast;
//! #
//! #     pub struct MockConnection {
//! #         pub published: Mutex<Vec<(String, Vec<u8>)>>,
//! #         events: broadcast::Sender<ConnectionEvent>,
//! #     }
//! #
//! #     #[async_trait]
//! #     impl TransportConnection for MockConnection {
//! #         fn client_id(&self) -> &str { "doc_00000000" }
//! #         fn is_connected(&self) -> bool { true }
//! #         async fn subscribe(&self, _topic: &str) -> Result<(), TransportError> { Ok(()) }
//! #         async fn unsubscribe(&self, _topic: &str) -> Result<(), TransportError> { Ok(()) }
//! #         async fn publish(&self, topic: &str, body: Vec<u8>) -> Result<(), TransportError> {
//! #             self.published.lock().unwrap().push((topic.to_string(), body));
//! #             Ok(())
//! #         }
//! #         fn events(&self) -> broadcast::Receiver<ConnectionEvent> {
//! #             self.events.subscribe()
//! #         }
//! #     }
//! #
//! #     pub struct MockConnector {
//! #         pub connection: Arc<MockConnection>,
//! #     }
//! #
//! #     impl MockConnector {
//! #         pub fn new() -> Self {
//! #             let (events, _) = broadcast::channel(16);
//! #             let connection = Arc::new(MockConnection { published: Mutex::new(Vec::new()), events });
//! #             Self { connection }
//! #         }
//! #     }
//! #
//! #     #[async_trait]
//! #     impl TransportConnector for MockConnector {
//! #         async fn connect(
//! #             &self,
//! #             _server_url: &str,
//! #             _options: ConnectOptions,
//! #         ) -> Result<Arc<dyn TransportConnection>, TransportError> {
//! #             Ok(self.connection.clone())
//! #         }
//! #     }
//! # }
//!
//! struct ThngProperties;
//!
//! impl Resource for ThngProperties {
//!     fn path(&self) -> &str {
//!         "/thngs/T1/properties"
//!     }
//! }
//!
//! /// Stands in for the request/response client.
//! struct RestWriter;
//!
//! #[async_trait]
//! impl ResourceWriter for RestWriter {
//!     async fn write(
//!         &self,
//!         strategy: WriteStrategy,
//!         payload: Value,
//!         interceptor: Arc<dyn RequestInterceptor>,
//!     ) -> Result<Value, RequestError> {
//!         let request = OutgoingRequest {
//!             strategy,
//!             path: "/thngs/T1/properties".to_string(),
//!             data: payload,
//!         };
//!         match interceptor.intercept(&request) {
//!             InterceptAction::Cancel => Err(RequestError::Cancelled),
//!             InterceptAction::Proceed => Ok(request.data),
//!         }
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let connector = Arc::new(mock_transport::MockConnector::new());
//! let context = PubSubContext::new(connector.clone());
//! context.setup(&json!({ "keepAlive": 30 })).unwrap();
//!
//! let session = context.topic_session("operator-key", Arc::new(ThngProperties));
//! assert_eq!(WriteStrategy::for_kind(ResourceKind::Other), WriteStrategy::Update);
//!
//! session
//!     .redirect_to_publish(&RestWriter, Some(json!({ "foo": "bar" })), Callbacks::new())
//!     .await
//!     .unwrap();
//!
//! let published = connector.connection.published.lock().unwrap();
//! assert_eq!(published.len(), 1);
//! assert_eq!(published[0].0, "/thngs/T1/properties");
//! assert_eq!(published[0].1, br#"{"foo":"bar"}"#.to_vec());
//! # });
//! ```
//!
//! ## Internal architecture map
//!
//! - API facade: [`PubSubContext`], [`TopicSession`] and the redirect operations
//! - Control plane: credential keying, connect options, the single-flight
//!   connection registry and its per-credential event relay
//! - Routing: the per-credential subscription ledger replayed after reconnects
//! - Data plane: topic sessions and the message dispatch loops
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events.
//! Library code emits events and does not unconditionally initialize a global
//! subscriber. Binaries and tests are responsible for one-time
//! `tracing_subscriber` initialization at process boundaries.

mod callbacks;
pub use callbacks::{message_callback, Callbacks, ErrorCallback, MessageCallback, SuccessCallback};

mod context;
pub use context::PubSubContext;

mod control_plane;
pub use control_plane::connect_options::AUTHORIZATION_USERNAME;
pub use control_plane::connection_registry::ConnectionState;
pub use control_plane::credential::CredentialKey;

mod data_plane;
pub use data_plane::message_dispatch::{decode_message, DecodedMessage};
pub use data_plane::topic_session::TopicSession;

mod error;
pub use error::PubSubError;

#[doc(hidden)]
pub mod observability;

mod resource;
pub use resource::{
    InterceptAction, OutgoingRequest, RequestError, RequestInterceptor, Resource, ResourceKind,
    ResourceWriter, WriteStrategy,
};

mod routing;
pub use routing::subscription_ledger::SubscriptionLedger;

mod settings;
pub use settings::PubSubSettings;

mod transport;
pub use transport::{
    ConnectOptions, ConnectionEvent, ConnectionHandle, InboundMessage, TransportConnection,
    TransportConnector, TransportError, TransportOperation,
};

mod write_redirect;
pub use write_redirect::perform_write_or_publish;
