// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Transport used to query the ECS agent.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::{Config, EcsInfoError};

/// Fetches the raw body behind a URL.
///
/// The trait is dyn-compatible thanks to the `async_trait` macro, so the cache can hold a
/// `Box<dyn Requester>` and tests can substitute canned answers.
#[async_trait]
pub trait Requester: Send + Sync {
    /// GET `url` and return its body. Must give up with [`EcsInfoError::Cancelled`] once
    /// `cancellation` fires.
    async fn request(
        &self,
        cancellation: &CancellationToken,
        url: &str,
    ) -> Result<Bytes, EcsInfoError>;
}

#[async_trait]
impl<T: Requester + ?Sized> Requester for Arc<T> {
    async fn request(
        &self,
        cancellation: &CancellationToken,
        url: &str,
    ) -> Result<Bytes, EcsInfoError> {
        (**self).request(cancellation, url).await
    }
}

/// A [`Requester`] over plain HTTP backed by [`reqwest::Client`].
///
/// Non-2xx answers are errors and bodies larger than the configured limit are rejected before
/// being fully buffered.
#[derive(Debug, Clone)]
pub struct HttpRequester {
    client: reqwest::Client,
    max_response_bytes: usize,
}

impl HttpRequester {
    /// Construct a requester with the given per-request timeout and response size limit.
    pub fn new(timeout: Duration, max_response_bytes: usize) -> Result<Self, EcsInfoError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EcsInfoError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            client,
            max_response_bytes,
        })
    }

    /// Construct a requester from the timeout and size limit of `config`.
    pub fn from_config(config: &Config) -> Result<Self, EcsInfoError> {
        Self::new(config.request_timeout(), config.max_response_bytes())
    }

    async fn fetch(&self, url: &str) -> Result<Bytes, EcsInfoError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(EcsInfoError::Status {
                status: status.as_u16(),
            });
        }

        let too_large = EcsInfoError::ResponseTooLarge {
            limit: self.max_response_bytes,
        };
        if response
            .content_length()
            .is_some_and(|len| len > self.max_response_bytes as u64)
        {
            return Err(too_large);
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(map_reqwest_error)? {
            if body.len() + chunk.len() > self.max_response_bytes {
                return Err(too_large);
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body.freeze())
    }
}

#[async_trait]
impl Requester for HttpRequester {
    async fn request(
        &self,
        cancellation: &CancellationToken,
        url: &str,
    ) -> Result<Bytes, EcsInfoError> {
        tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(EcsInfoError::Cancelled),
            res = self.fetch(url) => res,
        }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> EcsInfoError {
    if e.is_timeout() {
        EcsInfoError::TimedOut
    } else {
        EcsInfoError::Transport(e.to_string())
    }
}
