use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

/// Install a handler that cancels the returned token on SIGINT or SIGTERM.
///
/// Used to stop waiting on submitted jobs; the jobs themselves stay in the queue.
pub fn install_shutdown_handler() -> std::io::Result<CancellationToken> {
    let token = CancellationToken::new();
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let token_clone = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, no longer waiting for jobs");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, no longer waiting for jobs");
            }
        }

        token_clone.cancel();
    });

    Ok(token)
}
