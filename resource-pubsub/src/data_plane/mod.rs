//! Data-plane layer.
//!
//! Owns the per-topic sessions and the dispatch loops that carry inbound
//! messages from a credential's connections to the subscriber of one exact topic.
//!
//! Dispatch loops survive reconnects. A connection's event buffer is sized by its
//! transport and the credential relay buffers 256 events; a subscriber that falls
//! further behind loses the overflow and is told through
//! [`PubSubError::MessagesDropped`](crate::PubSubError::MessagesDropped).
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use resource_pubsub::{
//!     message_callback, Callbacks, ConnectOptions, ConnectionEvent, PubSubContext, Resource,
//!     TransportConnection, TransportConnector, TransportError,
//! };
//! use tokio::sync::broadcast;
//!
//! # struct MockConnection {
//! #     events: broadcast::Sender<ConnectionEvent>,
//! # }
//! #
//! # #[async_trait]
//! # impl TransportConnection for MockConnection {
//! #     fn client_id(&self) -> &str {
//! #         "doc_00000000"
//! #     }
//! #     fn is_connected(&self) -> bool {
//! #         true
//! #     }
//! #     async fn subscribe(&self, _topic: &str) -> Result<(), TransportError> {
//! #         Ok(())
//! #     }
//! #     async fn unsubscribe(&self, _topic: &str) -> Result<(), TransportError> {
//! #         Ok(())
//! #     }
//! #     async fn publish(&self, _topic: &str, _body: Vec<u8>) -> Result<(), TransportError> {
//! #         Ok(())
//! #     }
//! #     fn events(&self) -> broadcast::Receiver<ConnectionEvent> {
//! #         self.events.subscribe()
//! #     }
//! # }
//! #
//! # struct MockConnector;
//! #
//! # #[async_trait]
//! # impl TransportConnector for MockConnector {
//! #     async fn connect(
//! #         &self,
//! #         _server_url: &str,
//! #         _options: ConnectOptions,
//! #     ) -> Result<Arc<dyn TransportConnection>, TransportError> {
//! #         let (events, _) = broadcast::channel(16);
//! #         Ok(Arc::new(MockConnection { events }))
//! #     }
//! # }
//! #
//! struct Actions;
//!
//! impl Resource for Actions {
//!     fn path(&self) -> &str {
//!         "/thngs/T1/actions/all"
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let context = PubSubContext::new(Arc::new(MockConnector));
//! let session = context.topic_session("operator-key", Arc::new(Actions));
//!
//! // Subscribing records the topic so it is replayed after every reconnect.
//! session
//!     .subscribe(Some(message_callback(|_message| {})), Callbacks::new())
//!     .await
//!     .unwrap();
//! assert!(context.ledger().is_subscribed(session.credential(), session.topic()));
//!
//! session.unsubscribe(Callbacks::new()).await.unwrap();
//! assert!(!context.ledger().is_subscribed(session.credential(), session.topic()));
//! # });
//! ```

pub(crate) mod message_dispatch;
pub(crate) mod topic_session;
