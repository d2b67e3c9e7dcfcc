use std::future::Future;
use std::time::Duration;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::from_millis(500),
        }
    }
}

fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Retry a request on transport failures, 429 and 5xx, up to
/// `policy.max_retries` extra attempts with a fixed pause between them.
/// The final response or error is returned as-is; status handling stays
/// with the caller.
pub(crate) async fn send_with_retry<F, Fut>(
    policy: RetryPolicy,
    mut send: F,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut attempt = 0;
    loop {
        match send().await {
            Ok(response) => {
                if attempt >= policy.max_retries || !is_retryable_status(response.status()) {
                    return Ok(response);
                }
            }
            Err(error) => {
                if attempt >= policy.max_retries || !(error.is_timeout() || error.is_connect()) {
                    return Err(error);
                }
            }
        }
        attempt += 1;
        tokio::time::sleep(policy.backoff).await;
    }
}
