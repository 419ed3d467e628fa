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

//! Canonical structured field keys and value-format helpers.

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";
pub const CREDENTIAL: &str = "credential";
pub const CLIENT_ID: &str = "client_id";
pub const GENERATION: &str = "generation";
pub const TOPIC: &str = "topic";
pub const WAITERS: &str = "waiters";
pub const BODY_LEN: &str = "body_len";
pub const STRATEGY: &str = "strategy";
pub const SKIPPED: &str = "skipped";
pub const REASON: &str = "reason";
pub const ERR: &str = "err";

pub const NONE: &str = "none";
pub const REASON_BROADCAST_CLOSED: &str = "broadcast_closed";
pub const REASON_UNSUBSCRIBED: &str = "unsubscribed";
pub const REASON_REPLACED: &str = "replaced";

const VISIBLE_SECRET_CHARS: usize = 4;
const SECRET_MASK: &str = "****";

/// Renders a secret with only its leading characters visible.
///
/// Secrets no longer than the visible prefix are fully masked.
pub fn redact_secret(secret: &str) -> String {
    if secret.chars().count() <= VISIBLE_SECRET_CHARS {
        return SECRET_MASK.to_string();
    }
    let visible: String = secret.chars().take(VISIBLE_SECRET_CHARS).collect();
    format!("{visible}{SECRET_MASK}")
}
