// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! One-shot readiness signal shared between the refresher and its consumers.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// How a [`ReadinessGate::wait`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The gate has been signaled.
    Ready,
    /// The cancellation token fired before the gate was signaled.
    Cancelled,
}

#[derive(Debug, Default)]
struct GateState {
    signaled: AtomicBool,
    notify: Notify,
}

/// A gate that opens exactly once and never closes again.
///
/// Clones share the same state, so the refresher can keep one handle while consumers hold others.
/// [`ReadinessGate::signal`] may be called any number of times from any number of tasks; only the
/// first call opens the gate and wakes the waiters.
#[derive(Debug, Clone, Default)]
pub struct ReadinessGate {
    state: Arc<GateState>,
}

impl ReadinessGate {
    /// Create a closed gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the gate and wake every waiter.
    ///
    /// Returns `true` if this call opened the gate, `false` if it was already open.
    pub fn signal(&self) -> bool {
        let opened = self
            .state
            .signaled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if opened {
            self.state.notify.notify_waiters();
        }
        opened
    }

    /// Whether the gate has been opened.
    pub fn is_signaled(&self) -> bool {
        self.state.signaled.load(Ordering::Acquire)
    }

    /// Wait until the gate is opened or `cancellation` fires.
    ///
    /// An open gate wins over a cancelled token.
    pub async fn wait(&self, cancellation: &CancellationToken) -> WaitOutcome {
        let notified = self.state.notify.notified();
        tokio::pin!(notified);
        // Register before reading the flag so a signal landing in between is not lost.
        notified.as_mut().enable();
        if self.is_signaled() {
            return WaitOutcome::Ready;
        }
        tokio::select! {
            biased;
            _ = notified => WaitOutcome::Ready,
            _ = cancellation.cancelled() => WaitOutcome::Cancelled,
        }
    }
}
