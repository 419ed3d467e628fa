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

//! Owner of the settings, connection registry and subscription ledger.

use crate::control_plane::connection_registry::{ConnectionRegistry, ConnectionState};
use crate::control_plane::credential::CredentialKey;
use crate::data_plane::topic_session::TopicSession;
use crate::error::PubSubError;
use crate::observability::events;
use crate::resource::Resource;
use crate::routing::subscription_ledger::SubscriptionLedger;
use crate::settings::PubSubSettings;
use crate::transport::{ConnectionHandle, TransportConnector};
use arc_swap::ArcSwap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

const COMPONENT: &str = "pubsub_context";

/// Shared state of one pub/sub integration.
///
/// Cloning is cheap and every clone sees the same connections, ledger and
/// settings. Independent contexts never share connections.
#[derive(Clone)]
pub struct PubSubContext {
    settings: Arc<ArcSwap<PubSubSettings>>,
    ledger: Arc<SubscriptionLedger>,
    registry: ConnectionRegistry,
}

impl PubSubContext {
    pub fn new(connector: Arc<dyn TransportConnector>) -> Self {
        Self::with_settings(connector, PubSubSettings::default())
    }

    pub fn with_settings(connector: Arc<dyn TransportConnector>, settings: PubSubSettings) -> Self {
        let settings = Arc::new(ArcSwap::from_pointee(settings));
        let ledger = Arc::new(SubscriptionLedger::new());
        let registry = ConnectionRegistry::new(connector, settings.clone(), ledger.clone());
        Self {
            settings,
            ledger,
            registry,
        }
    }

    /// Snapshot of the settings used for the next connect attempt.
    pub fn settings(&self) -> Arc<PubSubSettings> {
        self.settings.load_full()
    }

    /// Merges `options` over the current settings and stores the result.
    ///
    /// Existing connections keep the options they were opened with.
    pub fn setup(&self, options: &Value) -> Result<PubSubSettings, PubSubError> {
        let merged = match self.settings.load().merged_with(options) {
            Ok(merged) => merged,
            Err(err) => {
                warn!(
                    event = events::SETTINGS_REJECTED,
                    component = COMPONENT,
                    err = %err,
                    "rejected settings update"
                );
                return Err(err);
            }
        };

        self.settings.store(Arc::new(merged.clone()));
        info!(
            event = events::SETTINGS_UPDATED,
            component = COMPONENT,
            server_url = merged.server_url.as_str(),
            keep_alive_secs = merged.keep_alive,
            reconnect_period_ms = merged.reconnect_period,
            client_id_prefix = merged.client_id_prefix.as_str(),
            "settings updated"
        );
        Ok(merged)
    }

    /// Live connection for `credential`, connecting once for all concurrent callers.
    pub async fn acquire_connection(
        &self,
        credential: &CredentialKey,
    ) -> Result<ConnectionHandle, PubSubError> {
        self.registry.acquire_connection(credential).await
    }

    pub async fn connection_state(&self, credential: &CredentialKey) -> ConnectionState {
        self.registry.connection_state(credential).await
    }

    pub fn ledger(&self) -> &SubscriptionLedger {
        &self.ledger
    }

    pub fn topic_session(
        &self,
        credential: impl Into<CredentialKey>,
        resource: Arc<dyn Resource>,
    ) -> TopicSession {
        TopicSession::new(self.clone(), credential.into(), resource)
    }

    pub(crate) fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }
}
