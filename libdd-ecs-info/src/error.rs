// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error types for `libdd-ecs-info`.

use thiserror::Error;

/// Errors that can occur while discovering the ECS container instance.
///
/// None of these ever leave a refresh cycle: they are logged and the cycle publishes empty
/// values for whatever could not be determined.
#[derive(Debug, Error)]
pub enum EcsInfoError {
    /// The connection to the ECS agent could not be established or was interrupted.
    #[error("connection to the ECS agent failed: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout.
    #[error("request to the ECS agent timed out")]
    TimedOut,

    /// The request was abandoned because its cancellation token fired.
    #[error("request to the ECS agent was cancelled")]
    Cancelled,

    /// The ECS agent answered with a non-success status code.
    #[error("ECS agent responded with status {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// The response body is larger than the configured limit.
    #[error("ECS agent response exceeds {limit} bytes")]
    ResponseTooLarge {
        /// The configured limit in bytes.
        limit: usize,
    },

    /// The response body is not a valid container instance document.
    #[error("failed to decode ECS agent response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The container instance ARN matches neither of the two legal shapes.
    #[error("can't get ECS container instance id from container instance ARN: {0}")]
    MalformedArn(String),

    /// The configuration was invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EcsInfoError {
    /// Whether the error was raised while talking to the agent, as opposed to while interpreting
    /// its answer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::TimedOut
                | Self::Cancelled
                | Self::Status { .. }
                | Self::ResponseTooLarge { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_arn_display_carries_input() {
        let err = EcsInfoError::MalformedArn("arn:aws:ecs".to_owned());
        assert_eq!(
            err.to_string(),
            "can't get ECS container instance id from container instance ARN: arn:aws:ecs"
        );
    }

    #[test]
    fn status_display() {
        let err = EcsInfoError::Status { status: 503 };
        assert_eq!(err.to_string(), "ECS agent responded with status 503");
    }

    #[test]
    fn decode_errors_are_not_transport_errors() {
        let err: EcsInfoError = serde_json::from_slice::<serde_json::Value>(b"")
            .unwrap_err()
            .into();
        assert!(matches!(err, EcsInfoError::Decode(_)));
        assert!(!err.is_transport());
        assert!(!EcsInfoError::MalformedArn(String::new()).is_transport());
    }

    #[test]
    fn transport_classification() {
        assert!(EcsInfoError::Transport("refused".to_owned()).is_transport());
        assert!(EcsInfoError::TimedOut.is_transport());
        assert!(EcsInfoError::Cancelled.is_transport());
        assert!(EcsInfoError::Status { status: 404 }.is_transport());
        assert!(EcsInfoError::ResponseTooLarge { limit: 1 }.is_transport());
    }
}
