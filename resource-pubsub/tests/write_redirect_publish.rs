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

mod support;

use integration_test_utils::{InterceptingWriter, TestResource, WriterBehavior};
use resource_pubsub::{
    perform_write_or_publish, Callbacks, PubSubError, RequestError, WriteStrategy,
};
use serde_json::json;
use support::{error_sink, make_context, reported, CREDENTIAL};

#[tokio::test(flavor = "multi_thread")]
async fn action_resources_redirect_create() {
    let (context, connector) = make_context();
    let resource = TestResource::thng_actions("T1");
    let writer = InterceptingWriter::for_resource(resource.as_ref());
    let session = context.topic_session(CREDENTIAL, resource);

    session
        .redirect_to_publish(&writer, Some(json!({ "type": "_scan" })), Callbacks::new())
        .await
        .expect("redirected create should publish");

    assert_eq!(
        writer.writes(),
        vec![(WriteStrategy::Create, json!({ "type": "_scan" }))]
    );
    assert!(writer.sent().is_empty());
    assert_eq!(
        connector.connection(0).published(),
        vec![(
            "/thngs/T1/actions/all".to_string(),
            br#"{"type":"_scan"}"#.to_vec()
        )]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn other_resources_redirect_update() {
    let (context, connector) = make_context();
    let resource = TestResource::thng_properties("T1");
    let writer = InterceptingWriter::for_resource(resource.as_ref());
    let session = context.topic_session(CREDENTIAL, resource);

    session
        .redirect_to_publish(&writer, Some(json!({ "foo": "bar" })), Callbacks::new())
        .await
        .expect("redirected update should publish");

    assert_eq!(
        writer.writes(),
        vec![(WriteStrategy::Update, json!({ "foo": "bar" }))]
    );
    assert!(writer.sent().is_empty());
    assert_eq!(
        connector.connection(0).published(),
        vec![(
            "/thngs/T1/properties".to_string(),
            br#"{"foo":"bar"}"#.to_vec()
        )]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_payload_publishes_empty_object() {
    let (context, connector) = make_context();
    let resource = TestResource::thng_properties("T1");
    let writer = InterceptingWriter::for_resource(resource.as_ref());
    let session = context.topic_session(CREDENTIAL, resource);

    perform_write_or_publish(&session, &writer, WriteStrategy::Update, None, Callbacks::new())
        .await
        .expect("redirected update should publish");

    assert_eq!(writer.writes(), vec![(WriteStrategy::Update, json!({}))]);
    assert_eq!(
        connector.connection(0).published(),
        vec![("/thngs/T1/properties".to_string(), b"{}".to_vec())]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn writer_failure_is_reported_and_nothing_is_published() {
    let (context, connector) = make_context();
    let writer = InterceptingWriter::new(
        "/thngs/T1/properties",
        WriterBehavior::FailWith(RequestError::Failed("422 invalid property".to_string())),
    );
    let session = context.topic_session(CREDENTIAL, TestResource::thng_properties("T1"));
    let (callbacks, errors) = error_sink();

    let result = session
        .redirect_to_publish(&writer, Some(json!({ "foo": "bar" })), callbacks)
        .await;

    let expected =
        PubSubError::Request(RequestError::Failed("422 invalid property".to_string()));
    assert_eq!(result, Err(expected.clone()));
    assert_eq!(reported(&errors), vec![expected]);
    assert_eq!(connector.connect_calls(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn cancellation_without_interception_is_not_redirected() {
    let (context, connector) = make_context();
    let writer = InterceptingWriter::new(
        "/thngs/T1/properties",
        WriterBehavior::FailWith(RequestError::Cancelled),
    );
    let session = context.topic_session(CREDENTIAL, TestResource::thng_properties("T1"));
    let (callbacks, errors) = error_sink();

    let result = session
        .redirect_to_publish(&writer, Some(json!({ "foo": "bar" })), callbacks)
        .await;

    assert_eq!(result, Err(PubSubError::NotRedirected));
    assert_eq!(reported(&errors), vec![PubSubError::NotRedirected]);
    assert_eq!(connector.connect_calls(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn writer_skipping_interceptor_is_not_redirected() {
    let (context, connector) = make_context();
    let writer = InterceptingWriter::new("/thngs/T1/properties", WriterBehavior::SkipInterceptor);
    let session = context.topic_session(CREDENTIAL, TestResource::thng_properties("T1"));

    let result = session
        .redirect_to_publish(&writer, Some(json!({ "foo": "bar" })), Callbacks::new())
        .await;

    assert_eq!(result, Err(PubSubError::NotRedirected));
    assert_eq!(connector.connect_calls(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn writer_ignoring_cancel_does_not_also_publish() {
    let (context, connector) = make_context();
    let writer = InterceptingWriter::new("/thngs/T1/properties", WriterBehavior::IgnoreCancel);
    let session = context.topic_session(CREDENTIAL, TestResource::thng_properties("T1"));
    let (callbacks, errors) = error_sink();

    let result = session
        .redirect_to_publish(&writer, Some(json!({ "foo": "bar" })), callbacks)
        .await;

    assert_eq!(result, Err(PubSubError::NotRedirected));
    assert_eq!(reported(&errors), vec![PubSubError::NotRedirected]);
    assert_eq!(writer.sent().len(), 1);
    assert_eq!(connector.connect_calls(), 0);
}
