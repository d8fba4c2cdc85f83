// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use bytes::Bytes;
use libdd_ecs_info::{
    ContainerInstanceInfo, EcsInfoError, ReadinessGate, RefreshScheduler, Requester,
    StaticHostIp, WaitOutcome,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

const PROD_METADATA: &str =
    r#"{"cluster":"prod","resourceArn":"arn:aws:ecs:us-west-2:1:container-instance/abc-123"}"#;

/// Fails the first `failures` requests, then answers with `body`.
struct FlakyAgent {
    failures: usize,
    body: &'static str,
    calls: AtomicUsize,
}

impl FlakyAgent {
    fn new(failures: usize, body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            failures,
            body,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Requester for FlakyAgent {
    async fn request(
        &self,
        _cancellation: &CancellationToken,
        _url: &str,
    ) -> Result<Bytes, EcsInfoError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(EcsInfoError::Transport("connection refused".to_owned()))
        } else {
            Ok(Bytes::from_static(self.body.as_bytes()))
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn start(
    agent: &Arc<FlakyAgent>,
    ready: &ReadinessGate,
    token: &CancellationToken,
) -> (Arc<ContainerInstanceInfo>, tokio::task::JoinHandle<()>) {
    let info = Arc::new(ContainerInstanceInfo::new(
        StaticHostIp::new("10.0.0.12"),
        agent.clone(),
        ready.clone(),
    ));
    let handle = info.start(
        RefreshScheduler::new(Duration::from_secs(10)),
        &Handle::current(),
        token.clone(),
    );
    (info, handle)
}

#[tokio::test(start_paused = true)]
async fn test_waiters_observe_published_values() {
    init_tracing();
    let agent = FlakyAgent::new(2, PROD_METADATA);
    let ready = ReadinessGate::new();
    let token = CancellationToken::new();
    let (info, handle) = start(&agent, &ready, &token);

    assert_eq!(info.cluster_name(), "");
    assert_eq!(info.container_instance_id(), "");

    let waiters: Vec<_> = (0..8)
        .map(|_| {
            let ready = ready.clone();
            let token = token.clone();
            let info = info.clone();
            tokio::spawn(async move {
                let outcome = ready.wait(&token).await;
                (outcome, info.metadata())
            })
        })
        .collect();

    for waiter in waiters {
        let (outcome, metadata) = waiter.await.unwrap();
        assert_eq!(outcome, WaitOutcome::Ready);
        assert_eq!(metadata.cluster_name, "prod");
        assert_eq!(metadata.container_instance_id, "abc-123");
    }

    handle.await.unwrap();
    assert_eq!(agent.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_transport_errors_keep_polling_at_the_period() {
    init_tracing();
    let agent = FlakyAgent::new(usize::MAX, PROD_METADATA);
    let ready = ReadinessGate::new();
    let token = CancellationToken::new();
    let (info, handle) = start(&agent, &ready, &token);

    tokio::time::sleep(Duration::from_secs(45)).await;
    // Polled at 0s, 10s, 20s, 30s and 40s.
    assert_eq!(agent.calls(), 5);
    assert!(!ready.is_signaled());
    assert!(!info.is_identified());
    assert!(!handle.is_finished());

    token.cancel();
    handle.await.unwrap();
    assert_eq!(agent.calls(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_no_refresh_after_identification() {
    init_tracing();
    let agent = FlakyAgent::new(0, PROD_METADATA);
    let ready = ReadinessGate::new();
    let token = CancellationToken::new();
    let (info, handle) = start(&agent, &ready, &token);

    handle.await.unwrap();
    assert!(ready.is_signaled());
    assert_eq!(agent.calls(), 1);

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(agent.calls(), 1);
    assert_eq!(info.cluster_name(), "prod");
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_releases_waiters() {
    init_tracing();
    let agent = FlakyAgent::new(usize::MAX, PROD_METADATA);
    let ready = ReadinessGate::new();
    let token = CancellationToken::new();
    let (_info, handle) = start(&agent, &ready, &token);

    let waiter = tokio::spawn({
        let ready = ready.clone();
        let token = token.clone();
        async move { ready.wait(&token).await }
    });

    tokio::time::sleep(Duration::from_secs(15)).await;
    token.cancel();

    assert_eq!(waiter.await.unwrap(), WaitOutcome::Cancelled);
    handle.await.unwrap();
    assert_eq!(agent.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_pre_signaled_gate_is_left_open_by_failures() {
    init_tracing();
    let agent = FlakyAgent::new(usize::MAX, PROD_METADATA);
    let ready = ReadinessGate::new();
    ready.signal();
    let token = CancellationToken::new();
    let (info, handle) = start(&agent, &ready, &token);

    tokio::time::sleep(Duration::from_secs(25)).await;
    assert!(ready.is_signaled());
    assert!(!info.is_identified());

    token.cancel();
    handle.await.unwrap();
}
