use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Sleeps for `duration` or until `token` is cancelled, whichever comes first.
///
/// Always resolves normally; callers check `token.is_cancelled()` afterwards.
pub async fn cancellable_sleep(duration: Duration, token: &CancellationToken) {
    if token.is_cancelled() || duration.is_zero() {
        return;
    }
    tokio::select! {
        _ = token.cancelled() => {}
        _ = tokio::time::sleep(duration) => {}
    }
}
