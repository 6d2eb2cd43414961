//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::error::NewstlerError;

/// Wrap a provider call with a deadline.
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, NewstlerError>>,
) -> Result<T, NewstlerError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(NewstlerError::Timeout(duration.as_millis() as u64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn slow_call_times_out() {
        let result: Result<(), _> = with_timeout(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(NewstlerError::Timeout(50))));
    }

    #[tokio::test]
    async fn fast_call_passes_through() {
        let result = with_timeout(Duration::from_secs(1), async { Ok::<_, NewstlerError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
