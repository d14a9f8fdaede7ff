use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Cancels `cancelation` on Ctrl-C so the countdown can record the running session as skipped
/// before exiting.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                info!("Can't listen for Ctrl-C {e}");
                return;
            }
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => {}
    };
}
