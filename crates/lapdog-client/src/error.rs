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

//! Errors produced while talking to the API gateway.

use thiserror::Error;

/// Errors that can occur while fetching or decoding gateway responses.
///
/// The type is `Clone` because a single cached status outcome is handed to
/// every consumer of the status query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The request never produced a response (unreachable host, timeout,
    /// truncated body).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The gateway answered with a non-2xx status code.
    #[error("request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The body was not valid JSON or did not have the expected shape.
    #[error("invalid {endpoint} response: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },
}

impl ClientError {
    /// Build a decode error for the given endpoint from a serde failure.
    pub(crate) fn decode(endpoint: &'static str, err: &serde_json::Error) -> Self {
        Self::Decode {
            endpoint,
            message: err.to_string(),
        }
    }

    /// Whether the error came from the network layer rather than the payload.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::HttpStatus { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_names_endpoint() {
        let err = serde_json::from_str::<bool>("nope").unwrap_err();
        let decode = ClientError::decode("status", &err);

        assert!(decode.to_string().starts_with("invalid status response:"));
        assert!(!decode.is_transport());
    }

    #[test]
    fn test_http_status_is_transport() {
        let err = ClientError::HttpStatus {
            url: "http://localhost:4201/api/v1/status".to_string(),
            status: 502,
        };

        assert!(err.is_transport());
        assert_eq!(
            err.to_string(),
            "request to http://localhost:4201/api/v1/status returned HTTP 502"
        );
    }
}
