// Copyright 2025 Sushanth (https://github.com/sushanthpy)
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

//! HTTP plumbing shared by the provider adapters.

use crate::config::ProviderSettings;
use kgraph_core::{truncate_detail, GatewayError, GatewayResult, ProviderName};
use rand::random;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Build a client honoring the provider's timeout and pool settings.
pub fn build_client(settings: &ProviderSettings) -> GatewayResult<Client> {
    Client::builder()
        .timeout(settings.timeout())
        .pool_max_idle_per_host(settings.pool_max_idle_per_host)
        .build()
        .map_err(|e| GatewayError::Config(format!("failed to build HTTP client: {}", e)))
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    pub jitter: f64,
}

impl RetryPolicy {
    pub fn connect_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }

    pub fn none() -> Self {
        Self::connect_retries(0)
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let jitter_factor = 1.0 + (random::<f64>() - 0.5) * 2.0 * self.jitter;
        let clamped = (base * jitter_factor).min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(clamped.max(0.0))
    }
}

/// Send a request, retrying only when the connection could not be established.
///
/// Timeouts and HTTP error statuses are returned on the first occurrence.
pub async fn send_with_retry(
    provider: ProviderName,
    request: RequestBuilder,
    policy: &RetryPolicy,
    timeout_secs: u64,
) -> GatewayResult<Response> {
    let mut attempt = 0;
    loop {
        let Some(this_try) = request.try_clone() else {
            return request
                .send()
                .await
                .map_err(|e| classify(provider, e, timeout_secs));
        };

        match this_try.send().await {
            Ok(response) => return Ok(response),
            Err(e) if e.is_connect() && attempt < policy.max_retries => {
                let delay = policy.delay_for_attempt(attempt);
                attempt += 1;
                warn!(
                    provider = %provider,
                    attempt,
                    max_retries = policy.max_retries,
                    "Connection failed, retrying in {:?}: {}",
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(classify(provider, e, timeout_secs)),
        }
    }
}

/// Check the status and decode the body as JSON.
pub async fn read_json(
    provider: ProviderName,
    response: Response,
    timeout_secs: u64,
) -> GatewayResult<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        debug!(provider = %provider, status = status.as_u16(), "Provider returned error body: {}", body);
        return Err(GatewayError::Status {
            provider,
            status: status.as_u16(),
            body: truncate_detail(&body),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| classify(provider, e, timeout_secs))?;

    serde_json::from_str(&body).map_err(|e| GatewayError::ResponseFormat {
        provider,
        message: format!("response body is not JSON: {}", e),
    })
}

/// Map a reqwest failure onto the gateway taxonomy.
pub fn classify(provider: ProviderName, error: reqwest::Error, timeout_secs: u64) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout {
            provider,
            seconds: timeout_secs,
        }
    } else {
        GatewayError::Transport {
            provider,
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_grows_and_clamps() {
        let policy = RetryPolicy {
            jitter: 0.0,
            ..RetryPolicy::connect_retries(3)
        };
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(10), Duration::from_secs(2));
    }

    #[test]
    fn test_jitter_stays_in_band() {
        let policy = RetryPolicy::connect_retries(3);
        for _ in 0..100 {
            let delay = policy.delay_for_attempt(0).as_secs_f64();
            assert!((0.089..=0.111).contains(&delay), "delay {}", delay);
        }
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut settings = ProviderSettings::deepseek();
        settings.timeout_secs = 5;
        let client = build_client(&settings).unwrap();
        let policy = RetryPolicy {
            initial_delay: Duration::from_millis(1),
            ..RetryPolicy::connect_retries(2)
        };

        let request = client.get(format!("http://127.0.0.1:{}/", port));
        let err = send_with_retry(ProviderName::DeepSeek, request, &policy, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Transport { .. }));
    }
}
