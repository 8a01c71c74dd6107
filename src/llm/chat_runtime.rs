use std::thread::sleep;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub(crate) struct RetryConfig {
    pub timeout_secs: Option<u64>,
    pub retries: u32,
    pub retry_delay_ms: u64,
}

/// How a request authenticates against the provider.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Auth<'a> {
    Bearer(&'a str),
    Header {
        name: &'static str,
        value: &'a str,
        extra: &'a [(&'static str, &'static str)],
    },
}

impl Auth<'_> {
    fn apply(self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Bearer(token) => request.bearer_auth(token),
            Self::Header { name, value, extra } => extra
                .iter()
                .fold(request.header(name, value), |request, (key, val)| {
                    request.header(*key, *val)
                }),
        }
    }
}

#[derive(Debug)]
pub(crate) enum RequestFailure {
    Request(reqwest::Error),
    Api { status: StatusCode, body: String },
}

pub(crate) fn send_chat_request_with_retry<T: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    auth: Auth<'_>,
    payload: &T,
    config: RetryConfig,
) -> Result<Response, RequestFailure> {
    let max_attempts = config.retries.saturating_add(1);
    let mut attempt = 0;

    loop {
        let mut request = auth.apply(client.post(url)).json(payload);

        if let Some(timeout_secs) = config.timeout_secs {
            request = request.timeout(Duration::from_secs(timeout_secs));
        }

        match request.send() {
            Ok(response) => {
                if response.status().is_success() {
                    return Ok(response);
                }

                let status = response.status();
                let body = response.text().unwrap_or_default();
                let can_retry = is_retryable_status(status) && attempt + 1 < max_attempts;

                if can_retry {
                    warn!(%status, attempt, "retrying chat request after API error");
                    sleep(retry_delay(attempt, config.retry_delay_ms));
                    attempt += 1;
                    continue;
                }

                return Err(RequestFailure::Api { status, body });
            }
            Err(source) => {
                let can_retry = is_retryable_request_error(&source) && attempt + 1 < max_attempts;

                if can_retry {
                    warn!(error = %source, attempt, "retrying chat request after transport error");
                    sleep(retry_delay(attempt, config.retry_delay_ms));
                    attempt += 1;
                    continue;
                }

                return Err(RequestFailure::Request(source));
            }
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable_request_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

fn retry_delay(attempt: u32, base_ms: u64) -> Duration {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    let delay_ms = base_ms.saturating_mul(factor).min(30_000);
    Duration::from_millis(delay_ms)
}
