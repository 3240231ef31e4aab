use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Pause between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Fixed(Duration),
    /// `base * factor^(attempt - 1)`
    Exponential { base: Duration, factor: u32 },
}

/// Bounded retry: how many attempts, and how long to wait between them.
/// Which errors are worth retrying is decided per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error; `last` is the final one
    Exhausted { attempts: u32, last: E },
    /// A non-retryable error stopped the loop early
    Rejected(E),
}

impl RetryPolicy {
    pub const fn fixed(max_attempts: u32, pause: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed(pause),
        }
    }

    /// Pause after the given failed attempt (1-based)
    pub fn pause_after(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed(pause) => pause,
            Backoff::Exponential { base, factor } => {
                base * factor.saturating_pow(attempt.saturating_sub(1))
            }
        }
    }

    /// Run `op` until it succeeds, fails with an error `is_retryable` rejects,
    /// or `max_attempts` is reached. Attempts never overlap.
    pub async fn run<T, E, F, Fut, P>(&self, mut op: F, is_retryable: P) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if !is_retryable(&e) => return Err(RetryError::Rejected(e)),
                Err(e) if attempt >= max_attempts => {
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: e,
                    })
                }
                Err(e) => {
                    let pause = self.pause_after(attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        pause_ms = pause.as_millis() as u64,
                        error = %e,
                        "Attempt failed, retrying after pause"
                    );
                    tokio::time::sleep(pause).await;
                    attempt += 1;
                }
            }
        }
    }
}
