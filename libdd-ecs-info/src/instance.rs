// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Self-refreshing cache of the ECS cluster name and container instance id.

use arc_swap::ArcSwap;
use bytes::Bytes;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use tokio::{runtime::Handle, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    container_instance_id_from_arn, Config, EcsInfoError, HostIpProvider, HttpRequester,
    ReadinessGate, RefreshScheduler, Requester,
};

/// Port of the ECS agent introspection API.
pub const ECS_AGENT_PORT: u16 = 51678;

/// Build the URL of the ECS agent metadata endpoint on `host_ip`.
pub fn ecs_agent_endpoint(host_ip: &str) -> String {
    format!("http://{host_ip}:{ECS_AGENT_PORT}/v1/metadata")
}

/// The part of the agent's `/v1/metadata` document this crate uses.
///
/// Missing keys and `null` values decode to empty strings.
#[derive(Clone, Deserialize, Default, Debug, PartialEq, Eq)]
pub struct ContainerInstance {
    /// Name of the cluster the instance is registered in.
    #[serde(
        rename = "Cluster",
        alias = "cluster",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub cluster: String,
    /// ARN of the container instance.
    #[serde(
        rename = "ContainerInstanceArn",
        alias = "containerInstanceArn",
        alias = "resourceArn",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub container_instance_arn: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// The identity of the container instance as last published by a refresh.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct NodeMetadata {
    /// The ECS cluster name.
    pub cluster_name: String,
    /// The container instance id, derived from the container instance ARN.
    pub container_instance_id: String,
}

impl NodeMetadata {
    /// Both the cluster name and the container instance id are known.
    pub fn is_complete(&self) -> bool {
        !self.cluster_name.is_empty() && !self.container_instance_id.is_empty()
    }
}

/// Read side of the container instance identity, for components tagging telemetry with it.
pub trait ContainerInstanceInfoProvider: Send + Sync {
    /// The ECS cluster name, empty while unknown.
    fn cluster_name(&self) -> String;
    /// The container instance id, empty while unknown.
    fn container_instance_id(&self) -> String;
}

/// Holds the cluster name and container instance id of the host and refreshes them from the ECS
/// agent.
///
/// Both values are published together by a single atomic swap, so a reader never sees the
/// cluster name of one refresh with the id of another. The [`ReadinessGate`] is signaled after
/// the first refresh publishing both values.
///
/// # Example
/// ```no_run
/// # async fn example() -> Result<(), libdd_ecs_info::EcsInfoError> {
/// use libdd_ecs_info::{start_container_instance_info, Config, EnvHostIp, ReadinessGate};
/// use tokio_util::sync::CancellationToken;
///
/// let token = CancellationToken::new();
/// let (info, _handle) = start_container_instance_info(
///     &Config::from_env(),
///     EnvHostIp::new(),
///     ReadinessGate::new(),
///     &tokio::runtime::Handle::current(),
///     token.clone(),
/// )?;
///
/// info.ready_gate().wait(&token).await;
/// println!("Running in cluster {}", info.cluster_name());
/// # Ok(())
/// # }
/// ```
pub struct ContainerInstanceInfo {
    host_ip_provider: Box<dyn HostIpProvider>,
    requester: Box<dyn Requester>,
    metadata: ArcSwap<NodeMetadata>,
    ready: ReadinessGate,
}

impl std::fmt::Debug for ContainerInstanceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerInstanceInfo")
            .field("metadata", &**self.metadata.load())
            .field("ready", &self.ready.is_signaled())
            .finish_non_exhaustive()
    }
}

impl ContainerInstanceInfo {
    /// Return an empty cache querying the agent on the host given by `host_ip_provider` through
    /// `requester`, and signaling `ready` once identified.
    pub fn new(
        host_ip_provider: impl HostIpProvider + 'static,
        requester: impl Requester + 'static,
        ready: ReadinessGate,
    ) -> Self {
        Self {
            host_ip_provider: Box::new(host_ip_provider),
            requester: Box::new(requester),
            metadata: ArcSwap::from_pointee(NodeMetadata::default()),
            ready,
        }
    }

    /// Poll the agent once and publish what it reports.
    ///
    /// Failures are logged, never returned: a failed request is decoded as an empty body, an
    /// undecodable body as an empty document, and a malformed ARN as an empty id. Whatever results
    /// replaces the previously published values.
    pub async fn refresh(&self, cancellation: &CancellationToken) {
        let endpoint = ecs_agent_endpoint(&self.host_ip_provider.instance_ip());
        debug!(endpoint.url = %endpoint, "Fetching container instance metadata from the ECS agent");

        let payload = match self.requester.request(cancellation, &endpoint).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!(endpoint.url = %endpoint, error = %err, "Failed to call the ECS agent endpoint");
                Bytes::new()
            }
        };

        let container_instance = decode_container_instance(&payload);
        let container_instance_id =
            match container_instance_id_from_arn(&container_instance.container_instance_arn) {
                Ok(id) => id,
                Err(err) => {
                    warn!(error = %err, "Failed to get the container instance id from its ARN");
                    String::new()
                }
            };

        let published = Arc::new(NodeMetadata {
            cluster_name: container_instance.cluster,
            container_instance_id,
        });
        self.metadata.store(published.clone());

        if published.is_complete() && self.ready.signal() {
            info!(
                ecs.cluster = %published.cluster_name,
                ecs.container_instance_id = %published.container_instance_id,
                "ECS container instance identified"
            );
        }
    }

    /// The ECS cluster name, empty until known.
    pub fn cluster_name(&self) -> String {
        self.metadata.load().cluster_name.clone()
    }

    /// The container instance id, empty until known.
    pub fn container_instance_id(&self) -> String {
        self.metadata.load().container_instance_id.clone()
    }

    /// Both values as published by the same refresh.
    pub fn metadata(&self) -> NodeMetadata {
        NodeMetadata::clone(&self.metadata.load())
    }

    /// Whether both the cluster name and the container instance id are known. Once this holds,
    /// [`ContainerInstanceInfo::start`] stops refreshing.
    pub fn is_identified(&self) -> bool {
        self.metadata.load().is_complete()
    }

    /// The gate signaled once the container instance is identified.
    pub fn ready_gate(&self) -> &ReadinessGate {
        &self.ready
    }

    /// Spawn a task on `runtime` refreshing the cache with `scheduler` until identified or
    /// cancelled.
    pub fn start(
        self: &Arc<Self>,
        scheduler: RefreshScheduler,
        runtime: &Handle,
        cancellation: CancellationToken,
    ) -> JoinHandle<()> {
        let info = Arc::clone(self);
        runtime.spawn(async move {
            scheduler
                .run(
                    |token| {
                        let info = Arc::clone(&info);
                        async move { info.refresh(&token).await }
                    },
                    || info.is_identified(),
                    cancellation,
                )
                .await;
        })
    }
}

impl ContainerInstanceInfoProvider for ContainerInstanceInfo {
    fn cluster_name(&self) -> String {
        ContainerInstanceInfo::cluster_name(self)
    }

    fn container_instance_id(&self) -> String {
        ContainerInstanceInfo::container_instance_id(self)
    }
}

fn decode_container_instance(payload: &[u8]) -> ContainerInstance {
    match serde_json::from_slice(payload).map_err(EcsInfoError::from) {
        Ok(container_instance) => container_instance,
        Err(err) => {
            warn!(
                error = %err,
                response = %String::from_utf8_lossy(payload),
                "Failed to decode the ECS agent response"
            );
            ContainerInstance::default()
        }
    }
}

/// Create a [`ContainerInstanceInfo`] polling the agent over HTTP as configured by `config`, and
/// start refreshing it on `runtime`.
///
/// Returns the shared cache along with the handle of the refresh task. The task ends once the
/// container instance is identified or `cancellation` fires.
pub fn start_container_instance_info(
    config: &Config,
    host_ip_provider: impl HostIpProvider + 'static,
    ready: ReadinessGate,
    runtime: &Handle,
    cancellation: CancellationToken,
) -> Result<(Arc<ContainerInstanceInfo>, JoinHandle<()>), EcsInfoError> {
    let requester = HttpRequester::from_config(config)?;
    let info = Arc::new(ContainerInstanceInfo::new(
        host_ip_provider,
        requester,
        ready,
    ));
    let handle = info.start(config.scheduler(), runtime, cancellation);
    Ok((info, handle))
}
