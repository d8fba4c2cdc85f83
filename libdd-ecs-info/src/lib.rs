// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! `libdd-ecs-info` discovers the ECS cluster name and container instance id of the host by
//! polling the ECS agent introspection endpoint (`http://{host}:51678/v1/metadata`), so that
//! telemetry emitted from the host can be tagged with them.
//!
//! The pieces compose as follows:
//! - [`ContainerInstanceInfo`] performs one poll per [`ContainerInstanceInfo::refresh`] and
//!   publishes the cluster name and id together.
//! - [`RefreshScheduler`] drives the refresh on a fixed period until the instance is identified
//!   or the cancellation token fires.
//! - [`ReadinessGate`] lets any number of consumers wait for the first identification.
//! - [`container_instance_id_from_arn`] extracts the id from either container instance ARN
//!   format.
//!
//! # Quick start
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), libdd_ecs_info::EcsInfoError> {
//! use libdd_ecs_info::{
//!     start_container_instance_info, Config, ReadinessGate, StaticHostIp, WaitOutcome,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let ready = ReadinessGate::new();
//! let (info, _refresh) = start_container_instance_info(
//!     &Config::default(),
//!     StaticHostIp::new("10.0.0.12"),
//!     ready.clone(),
//!     &tokio::runtime::Handle::current(),
//!     token.clone(),
//! )?;
//!
//! if ready.wait(&token).await == WaitOutcome::Ready {
//!     println!(
//!         "cluster={} container_instance={}",
//!         info.cluster_name(),
//!         info.container_instance_id()
//!     );
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;

mod arn;
mod error;
mod host;
mod instance;
mod ready;
mod requester;
mod scheduler;

pub use arn::container_instance_id_from_arn;
pub use config::{Config, ConfigBuilder};
pub use error::EcsInfoError;
pub use host::{EnvHostIp, HostIpProvider, StaticHostIp, ECS_AGENT_HOST_ENV};
pub use instance::{
    ecs_agent_endpoint, start_container_instance_info, ContainerInstance, ContainerInstanceInfo,
    ContainerInstanceInfoProvider, NodeMetadata, ECS_AGENT_PORT,
};
pub use ready::{ReadinessGate, WaitOutcome};
pub use requester::{HttpRequester, Requester};
pub use scheduler::RefreshScheduler;
