// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Configuration types for `libdd-ecs-info`.

use std::{env, time::Duration};

use crate::{EcsInfoError, RefreshScheduler};

/// Default time between two polls of the ECS agent.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);
/// Default timeout of a single request to the ECS agent.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Default cap on the size of an ECS agent response.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 5 * 1024 * 1024;

/// Settings of the container instance refresher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    refresh_interval: Duration,
    initial_delay: Duration,
    request_timeout: Duration,
    max_response_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            initial_delay: Duration::ZERO,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

struct FromEnv {}

impl FromEnv {
    const DD_ECS_INFO_REFRESH_INTERVAL: &'static str = "DD_ECS_INFO_REFRESH_INTERVAL";
    const DD_ECS_INFO_REQUEST_TIMEOUT_MS: &'static str = "DD_ECS_INFO_REQUEST_TIMEOUT_MS";

    /// Interval in seconds, fractions allowed.
    fn refresh_interval() -> Option<Duration> {
        let secs = env::var(Self::DD_ECS_INFO_REFRESH_INTERVAL)
            .ok()?
            .trim()
            .parse::<f64>()
            .ok()?;
        if secs.is_nan() || secs <= 0.0 {
            return None;
        }
        Duration::try_from_secs_f64(secs).ok()
    }

    fn request_timeout() -> Option<Duration> {
        let ms = env::var(Self::DD_ECS_INFO_REQUEST_TIMEOUT_MS)
            .ok()?
            .trim()
            .parse::<u64>()
            .ok()?;
        (ms > 0).then_some(Duration::from_millis(ms))
    }
}

impl Config {
    /// Returns a builder starting from the defaults.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Build a config from the defaults overridden by `DD_ECS_INFO_REFRESH_INTERVAL` (seconds) and
    /// `DD_ECS_INFO_REQUEST_TIMEOUT_MS`. Values that can't be parsed or aren't positive are
    /// ignored.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            refresh_interval: FromEnv::refresh_interval().unwrap_or(default.refresh_interval),
            request_timeout: FromEnv::request_timeout().unwrap_or(default.request_timeout),
            ..default
        }
    }

    /// Time between two polls while the container instance is not identified.
    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Time before the first poll.
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Timeout of a single request to the agent.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Largest accepted agent response, in bytes.
    pub fn max_response_bytes(&self) -> usize {
        self.max_response_bytes
    }

    /// A scheduler following this config's interval and initial delay.
    pub fn scheduler(&self) -> RefreshScheduler {
        RefreshScheduler::new(self.refresh_interval).with_initial_delay(self.initial_delay)
    }
}

/// Builder for [`Config`].
///
/// Obtain via [`Config::builder`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    refresh_interval: Option<Duration>,
    initial_delay: Option<Duration>,
    request_timeout: Option<Duration>,
    max_response_bytes: Option<usize>,
}

impl ConfigBuilder {
    /// Set the time between two polls.
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    /// Set the time before the first poll.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = Some(delay);
        self
    }

    /// Set the timeout of a single request.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the largest accepted response.
    pub fn max_response_bytes(mut self, limit: usize) -> Self {
        self.max_response_bytes = Some(limit);
        self
    }

    /// Build the [`Config`].
    ///
    /// Returns [`EcsInfoError::InvalidConfig`] if the refresh interval, the request timeout or
    /// the response limit is zero.
    pub fn build(self) -> Result<Config, EcsInfoError> {
        let default = Config::default();
        let config = Config {
            refresh_interval: self.refresh_interval.unwrap_or(default.refresh_interval),
            initial_delay: self.initial_delay.unwrap_or(default.initial_delay),
            request_timeout: self.request_timeout.unwrap_or(default.request_timeout),
            max_response_bytes: self.max_response_bytes.unwrap_or(default.max_response_bytes),
        };
        if config.refresh_interval.is_zero() {
            return Err(EcsInfoError::InvalidConfig(
                "refresh_interval must be positive".to_owned(),
            ));
        }
        if config.request_timeout.is_zero() {
            return Err(EcsInfoError::InvalidConfig(
                "request_timeout must be positive".to_owned(),
            ));
        }
        if config.max_response_bytes == 0 {
            return Err(EcsInfoError::InvalidConfig(
                "max_response_bytes must be positive".to_owned(),
            ));
        }
        Ok(config)
    }
}
