//! Racing collaborator calls against the caller's cancellation token.

use pubmed_core::{AppError, AppResult};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Run `fut` unless `cancel` fires first.
///
/// Cancellation wins ties so a token that is already cancelled never starts
/// the call. Upstream errors are tagged with `stage`.
pub async fn cancellable<T, F>(cancel: &CancellationToken, stage: &str, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    if cancel.is_cancelled() {
        return Err(AppError::Cancelled(stage.to_string()));
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!(stage, "Cancelled while waiting on collaborator");
            Err(AppError::Cancelled(stage.to_string()))
        }
        result = fut => result.map_err(|e| e.in_stage(stage)),
    }
}

/// Fail with `Cancelled(stage)` if the token has fired.
pub fn ensure_active(cancel: &CancellationToken, stage: &str) -> AppResult<()> {
    if cancel.is_cancelled() {
        Err(AppError::Cancelled(stage.to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_completes_when_not_cancelled() {
        let token = CancellationToken::new();
        let value = cancellable(&token, "search", async { Ok::<_, AppError>(42) })
            .await
            .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_skips_call() {
        let token = CancellationToken::new();
        token.cancel();

        let err = cancellable(&token, "fetch", async {
            panic!("future must not be polled");
            #[allow(unreachable_code)]
            Ok::<(), AppError>(())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Cancelled(ref stage) if stage == "fetch"));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_call() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let err = cancellable(&token, "synthesis", async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<(), AppError>(())
        })
        .await
        .unwrap_err();

        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_upstream_error_gets_stage() {
        let token = CancellationToken::new();
        let err = cancellable(&token, "search", async {
            Err::<(), _>(AppError::Literature("HTTP 502".to_string()))
        })
        .await
        .unwrap_err();

        assert!(err.to_string().contains("search: HTTP 502"));
    }

    #[test]
    fn test_ensure_active() {
        let token = CancellationToken::new();
        assert!(ensure_active(&token, "scoring").is_ok());
        token.cancel();
        assert!(ensure_active(&token, "scoring").unwrap_err().is_cancelled());
    }
}
