// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP transport layer.
//!
//! The client only needs "GET this URL and give me the body". That seam is
//! the [`Transport`] trait, so the status and workspace logic can run against
//! a real gateway or an in-process double.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use crate::error::ClientError;

/// Minimal transport used by [`crate::StatusClient`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET request and return the raw body of a 2xx response.
    async fn get(&self, url: &str) -> Result<Vec<u8>, ClientError>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with an optional per-request timeout.
    pub fn new(timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| ClientError::Transport {
            url: String::new(),
            message: format!("failed to build HTTP client: {e}"),
        })?;

        Ok(Self::from_client(client))
    }

    /// Wrap an existing `reqwest` client.
    #[must_use]
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ClientError> {
        debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, &e))?;

        Ok(bytes.to_vec())
    }
}

fn transport_error(url: &str, err: &reqwest::Error) -> ClientError {
    let message = if err.is_timeout() {
        format!("timed out: {err}")
    } else {
        err.to_string()
    };

    ClientError::Transport {
        url: url.to_string(),
        message,
    }
}

/// Join a base URL and an endpoint with exactly one `/` between them.
#[must_use]
pub fn endpoint_url(base: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}
