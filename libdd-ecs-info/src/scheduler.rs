// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Periodic driver for refresh operations.

use std::future::Future;
use std::time::Duration;
use tokio::{select, time::sleep};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Runs a refresh operation on a fixed period until a stop condition holds or the cancellation
/// token fires.
///
/// The operation owns its error handling: it returns `()` and whatever goes wrong inside it only
/// delays success until the next period. Once stopped the scheduler is done for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshScheduler {
    period: Duration,
    initial_delay: Duration,
}

impl RefreshScheduler {
    /// Return a scheduler invoking the operation right away and then every `period`.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            initial_delay: Duration::ZERO,
        }
    }

    /// Delay the first invocation by `initial_delay`.
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    /// The time between the end of an invocation and the start of the next one. A zero period
    /// still yields to the runtime between two invocations.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// The time before the first invocation.
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Drive `operation` until `should_stop` returns `true` after an invocation, or until
    /// `cancellation` fires.
    ///
    /// `should_stop` is evaluated after every invocation, never before the first one. A cancelled
    /// token prevents any further invocation, including the first one.
    ///
    /// # Warning
    /// This method only returns once stopped and should be run within a dedicated task.
    pub async fn run<Op, Fut, Stop>(
        &self,
        mut operation: Op,
        should_stop: Stop,
        cancellation: CancellationToken,
    ) where
        Op: FnMut(CancellationToken) -> Fut,
        Fut: Future<Output = ()>,
        Stop: Fn() -> bool,
    {
        if !self.wait(self.initial_delay, &cancellation).await {
            return;
        }
        loop {
            operation(cancellation.clone()).await;
            if should_stop() {
                debug!("Stop condition reached, no further refresh scheduled");
                return;
            }
            if !self.wait(self.period, &cancellation).await {
                return;
            }
        }
    }

    /// Sleep for `duration`. Returns `false` if the token fired first.
    async fn wait(&self, duration: Duration, cancellation: &CancellationToken) -> bool {
        if cancellation.is_cancelled() {
            debug!("Refresh cancelled");
            return false;
        }
        if duration.is_zero() {
            // A zero period must not starve the runtime.
            tokio::task::yield_now().await;
            return !cancellation.is_cancelled();
        }
        select! {
            biased;
            _ = cancellation.cancelled() => {
                debug!("Refresh cancelled");
                false
            }
            _ = sleep(duration) => true,
        }
    }
}
