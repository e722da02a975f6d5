use tokio::signal;

pub async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        crate::error::log_error(&e);
        // without a handler we can only be stopped from outside
        std::future::pending::<()>().await;
    }

    #[cfg(not(windows))]
    println!();
    tracing::info!("Ctrl+C recieved. Draining in-flight requests, this could take a while.");
}
