// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Providers for the address of the host running the ECS agent.

use std::borrow::Cow;
use std::sync::Arc;

/// Default variable read by [`EnvHostIp`].
pub const ECS_AGENT_HOST_ENV: &str = "ECS_AGENT_HOST";

const DEFAULT_HOST_IP: &str = "127.0.0.1";

/// Supplies the IP address of the host the ECS agent listens on.
///
/// Called once per refresh cycle, so implementations may return a different address over time.
pub trait HostIpProvider: Send + Sync {
    /// The host IP address, without scheme or port.
    fn instance_ip(&self) -> String;
}

impl<T: HostIpProvider + ?Sized> HostIpProvider for Arc<T> {
    fn instance_ip(&self) -> String {
        (**self).instance_ip()
    }
}

impl<T: HostIpProvider + ?Sized> HostIpProvider for Box<T> {
    fn instance_ip(&self) -> String {
        (**self).instance_ip()
    }
}

/// A fixed host address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticHostIp(String);

impl StaticHostIp {
    /// Always return `ip`.
    pub fn new(ip: impl Into<String>) -> Self {
        Self(ip.into())
    }
}

impl HostIpProvider for StaticHostIp {
    fn instance_ip(&self) -> String {
        self.0.clone()
    }
}

/// Reads the host address from an environment variable on every call, falling back to a default
/// when the variable is unset or empty.
#[derive(Debug, Clone)]
pub struct EnvHostIp {
    var: Cow<'static, str>,
    fallback: String,
}

impl Default for EnvHostIp {
    fn default() -> Self {
        Self {
            var: Cow::Borrowed(ECS_AGENT_HOST_ENV),
            fallback: DEFAULT_HOST_IP.to_owned(),
        }
    }
}

impl EnvHostIp {
    /// Read `ECS_AGENT_HOST`, falling back to `127.0.0.1`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `var` instead of `ECS_AGENT_HOST`.
    pub fn with_var(mut self, var: impl Into<Cow<'static, str>>) -> Self {
        self.var = var.into();
        self
    }

    /// Use `fallback` when the variable is not set.
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }
}

impl HostIpProvider for EnvHostIp {
    fn instance_ip(&self) -> String {
        std::env::var(self.var.as_ref())
            .ok()
            .filter(|ip| !ip.is_empty())
            .unwrap_or_else(|| self.fallback.clone())
    }
}
