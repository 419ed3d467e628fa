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

mod mock_transport;
pub use mock_transport::{MockConnection, MockConnector, TransportCall};

mod test_resources;
pub use test_resources::{InterceptingWriter, TestResource, WriterBehavior};

use tracing_subscriber::EnvFilter;

/// Installs a test subscriber once per process; later calls are no-ops.
///
/// Honors `RUST_LOG` and defaults to `resource_pubsub=debug`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("resource_pubsub=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
