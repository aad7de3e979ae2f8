//utils for graceful shutdown
use tokio::signal;
use tokio_util::sync::CancellationToken;

async fn terminate() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    }
    #[cfg(not(unix))]
    std::future::pending::<()>().await;
}

/// Token cancelled on Ctrl-C or SIGTERM.
pub fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let tc = token.clone();
    //spawn once to listen for either signal
    tokio::spawn(async move {
        tokio::select! {
            res = signal::ctrl_c() => {
                if let Err(e) = res {
                    tracing::warn!(error = %e, "ctrl-c handler unavailable");
                    return;
                }
            }
            _ = terminate() => {}
        }
        tracing::info!("shutdown requested");
        tc.cancel();
    });
    token
}
