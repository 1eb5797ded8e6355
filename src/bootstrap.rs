//! Connection bootstrap with bounded exponential backoff.
//!
//! Builds the protocol client through a [`ClientConnector`], retrying
//! failed attempts with `2^i` second delays (1s, 2s, 4s, ...). No jitter
//! and no cap: attempt counts are small and the schedule must stay
//! predictable. Every attempt constructs a fresh client; a failed
//! instance is never reused.

use std::sync::Arc;
use std::time::Duration;

use crate::error::BootstrapError;
use crate::protocol::client::{AcpClient, ClientConnector};

/// Delay before retrying after the attempt with this zero-based index
/// fails.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt))
}

/// Establish a protocol client, retrying with exponential backoff.
///
/// Makes up to `attempts` construction attempts (clamped to at least
/// one). The final failure is wrapped with the service name and
/// propagated; callers treat it as fatal.
pub async fn connect_with_backoff(
    connector: &dyn ClientConnector,
    service: &str,
    attempts: u32,
) -> Result<Arc<dyn AcpClient>, BootstrapError> {
    let attempts = attempts.max(1);

    for attempt in 0..attempts {
        match connector.connect().await {
            Ok(client) => {
                tracing::info!(
                    service,
                    attempt = attempt + 1,
                    "connected to job exchange"
                );
                return Ok(client);
            }
            Err(err) => {
                // Last attempt: wrap and propagate without sleeping
                if attempt + 1 == attempts {
                    tracing::error!(
                        service,
                        attempts,
                        error = %err,
                        "giving up connecting to job exchange"
                    );
                    return Err(BootstrapError::AttemptsExhausted {
                        service: service.to_string(),
                        attempts,
                        reason: err.to_string(),
                    });
                }

                let delay = backoff_delay(attempt);
                tracing::warn!(
                    service,
                    attempt = attempt + 1,
                    attempts,
                    delay_secs = delay.as_secs(),
                    error = %err,
                    "connect attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }

    // The loop is guaranteed to return: the `attempt + 1 == attempts` check
    // returns on the final iteration.
    unreachable!("connect loop should always return from within its body")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_delay_doubles_per_attempt() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
        assert_eq!(backoff_delay(5), Duration::from_secs(32));
    }

    #[test]
    fn backoff_delay_saturates_instead_of_overflowing() {
        let huge = backoff_delay(200);
        assert_eq!(huge, Duration::from_secs(u64::MAX));
    }
}
