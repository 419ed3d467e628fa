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

//! Transport settings shared by every connection of a context.

use crate::error::PubSubError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "mqtts://mqtt.evrythng.com:8883/mqtt";
pub const DEFAULT_RECONNECT_PERIOD_MS: u64 = 1000;
pub const DEFAULT_KEEP_ALIVE_SECS: u64 = 10;
pub const DEFAULT_CLIENT_ID_PREFIX: &str = "pubsub";

/// Recognized options, using the camelCase keys embedders already pass around.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct PubSubSettings {
    /// Transport endpoint.
    #[serde(alias = "apiUrl")]
    pub server_url: String,
    /// Delay between transport reconnect attempts, in milliseconds.
    pub reconnect_period: u64,
    /// Longest idle period before the broker drops the client, in seconds.
    pub keep_alive: u64,
    /// Prefix of generated per-connection client identifiers.
    pub client_id_prefix: String,
}

impl Default for PubSubSettings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            reconnect_period: DEFAULT_RECONNECT_PERIOD_MS,
            keep_alive: DEFAULT_KEEP_ALIVE_SECS,
            client_id_prefix: DEFAULT_CLIENT_ID_PREFIX.to_string(),
        }
    }
}

impl PubSubSettings {
    pub fn reconnect_period(&self) -> Duration {
        Duration::from_millis(self.reconnect_period)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive)
    }

    /// Returns a copy of these settings with the keys of `overrides` applied.
    ///
    /// `overrides` must be a JSON object; unknown keys and mistyped values are
    /// rejected and leave `self` untouched.
    pub fn merged_with(&self, overrides: &Value) -> Result<Self, PubSubError> {
        let Value::Object(overrides) = overrides else {
            return Err(PubSubError::InvalidArgument(
                "setup should be called with an options object".to_string(),
            ));
        };

        let mut merged = serde_json::to_value(self)
            .map_err(|err| PubSubError::InvalidArgument(err.to_string()))?;
        if let Value::Object(current) = &mut merged {
            for (key, value) in overrides {
                // Keep the canonical key so the alias cannot end up duplicated.
                let key = if key == "apiUrl" { "serverUrl" } else { key };
                current.insert(key.to_string(), value.clone());
            }
        }

        serde_json::from_value(merged).map_err(|err| PubSubError::InvalidArgument(err.to_string()))
    }

    /// Loads a complete settings file written in JSON5.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        Ok(json5::from_str(&contents)?)
    }
}
