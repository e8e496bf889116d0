//! Per-call timeout and retry policy for collaborator calls

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::collaborators::CollaboratorError;

/// Bounds applied to every log and notification call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPolicy {
    /// Upper bound for one attempt
    pub timeout: Duration,
    /// Extra attempts after a retryable failure
    pub max_retries: u32,
    /// Upper bound of the random pause before a retry
    pub retry_jitter: Duration,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(3000),
            max_retries: 1,
            retry_jitter: Duration::from_millis(150),
        }
    }
}

/// Bound a single collaborator call, mapping expiry to `TimedOut`
pub async fn with_timeout<T, Fut>(
    service: &'static str,
    timeout: Duration,
    call: Fut,
) -> Result<T, CollaboratorError>
where
    Fut: Future<Output = Result<T, CollaboratorError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(CollaboratorError::TimedOut {
            service,
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}

impl DispatchPolicy {
    /// Run `op` with the timeout, retrying retryable failures
    ///
    /// Only failures where the request cannot have been processed are
    /// retried (see [`CollaboratorError::is_retryable`]).
    pub async fn run<T, F, Fut>(
        &self,
        service: &'static str,
        mut op: F,
    ) -> Result<T, CollaboratorError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CollaboratorError>>,
    {
        let mut retries = 0;
        loop {
            match with_timeout(service, self.timeout, op()).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && retries < self.max_retries => {
                    retries += 1;
                    let pause = self.jitter();
                    warn!(
                        "{} call failed ({}), retry {}/{} in {}ms",
                        service,
                        e,
                        retries,
                        self.max_retries,
                        pause.as_millis()
                    );
                    tokio::time::sleep(pause).await;
                },
                Err(e) => return Err(e),
            }
        }
    }

    fn jitter(&self) -> Duration {
        let max_ms = self.retry_jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }
}
