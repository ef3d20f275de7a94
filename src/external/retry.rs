use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Runs `op` up to `attempts` times with a fixed delay between tries.
///
/// Deliberately no backoff growth and no jitter: this helper exists for
/// exactly one flow (logging in right after registration, where the account
/// may not be readable yet) and anything smarter would hide real failures.
pub async fn retry_with_delay<T, E, F, Fut>(
    attempts: u32,
    delay: Duration,
    mut op: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut last_attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if last_attempt < attempts => {
                warn!(
                    "attempt {}/{} failed: {}; retrying in {:?}",
                    last_attempt, attempts, err, delay
                );
                tokio::time::sleep(delay).await;
                last_attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
