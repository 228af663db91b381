//! ledgerkv Server Binary
//!
//! Starts the HTTP server for ledgerkv.

use std::sync::Arc;

use clap::Parser;
use ledgerkv::http::router;
use ledgerkv::{Config, KeyValueService, SyncPolicy};
use tracing_subscriber::{fmt, EnvFilter};

/// ledgerkv Server
#[derive(Parser, Debug)]
#[command(name = "ledgerkv-server")]
#[command(about = "HTTP key-value store backed by an append-only transaction log")]
#[command(version)]
struct Args {
    /// Transaction log file
    #[arg(short = 'f', long, default_value = "./transactions.log")]
    log_file: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Writer queue capacity (pending mutations before producers block)
    #[arg(short, long, default_value = "16")]
    queue_capacity: usize,

    /// fsync after this many records (1 = every record)
    #[arg(short, long, default_value = "1")]
    sync_every: usize,
}

#[tokio::main]
async fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ledgerkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("ledgerkv Server v{}", ledgerkv::VERSION);
    tracing::info!("Transaction log: {}", args.log_file);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .log_path(&args.log_file)
        .listen_addr(&args.listen)
        .queue_capacity(args.queue_capacity)
        .sync_policy(sync_policy(args.sync_every))
        .build();

    // Replay the log and start the background writer
    let service = match KeyValueService::bootstrap(&config) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!("Failed to bootstrap service: {}", e);
            std::process::exit(1);
        }
    };

    // Surface a writer failure as soon as it happens. Requests keep
    // returning errors afterwards; this names the root cause once.
    let log_errors = service.log_errors();
    std::thread::spawn(move || {
        if let Ok(e) = log_errors.recv() {
            tracing::error!("Transaction log writer failed: {}", e);
        }
    });

    let app = router(Arc::clone(&service));

    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Serving on http://{}", config.listen_addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    // In-flight requests are done; flush and join the log writer.
    match Arc::try_unwrap(service) {
        Ok(service) => {
            if let Err(e) = service.shutdown() {
                tracing::error!("Shutdown error: {}", e);
                std::process::exit(1);
            }
        }
        Err(_) => tracing::warn!("Service still shared at shutdown, skipping log close"),
    }

    tracing::info!("Server stopped");
}

fn sync_policy(sync_every: usize) -> SyncPolicy {
    if sync_every <= 1 {
        SyncPolicy::EveryRecord
    } else {
        SyncPolicy::EveryNRecords { count: sync_every }
    }
}

/// Resolve when the process should stop accepting connections
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, initiating shutdown..."),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            // Without a signal handler there is nothing to wait for;
            // never resolve rather than shutting down immediately.
            std::future::pending::<()>().await;
        }
    }
}
