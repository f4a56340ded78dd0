//! CampusHub Console — headless notification watcher for the campus portal.
//!
//! Main entry point that wires all crates together: the REST client, the
//! push transport, and the notification center. The console logs every
//! feed change until interrupted.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use campushub_api::PortalClient;
use campushub_auth::CredentialStore;
use campushub_core::config::AppConfig;
use campushub_core::error::AppError;
use campushub_notify::{FeedSnapshot, NotificationCenter, NotificationGateway};
use campushub_realtime::PushTransport;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("CAMPUSHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main client run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CampusHub console v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Stored credentials ───────────────────────────────
    let credentials = CredentialStore::new()?;
    let stored = credentials.load();
    if stored.is_none() {
        tracing::warn!("No stored credentials; sign in before expecting any feed");
    }

    // ── Step 2: Portal API client ────────────────────────────────
    let api = Arc::new(PortalClient::new(&config.api, credentials)?);

    // ── Step 3: Notification center ──────────────────────────────
    let gateway = Arc::clone(&api) as Arc<dyn NotificationGateway>;
    let center = NotificationCenter::new(gateway, config.notifications.clone());

    // ── Step 4: Push transport ───────────────────────────────────
    let transport = Arc::new(PushTransport::new(
        Arc::clone(&api),
        config.realtime.clone(),
    ));
    let ingest_center = Arc::clone(&center);
    transport.add_handler(move |event| {
        ingest_center.ingest_push(event);
        Ok(())
    });
    transport.connect().await;
    if let Some(user_id) = stored.as_ref().and_then(|c| c.user_id) {
        transport.set_user(Some(user_id.to_string())).await;
    }

    // ── Step 5: Initial feed ─────────────────────────────────────
    center.refresh().await;

    // ── Step 6: Watch until interrupted ──────────────────────────
    let mut feed = center.watch();
    let mut connection = transport.watch_state();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                break;
            }
            changed = feed.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = feed.borrow_and_update().clone();
                print_feed(&snapshot);
            }
            changed = connection.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *connection.borrow_and_update();
                tracing::info!(state = ?state, "Push connection state changed");
            }
        }
    }

    // ── Step 7: Graceful shutdown ────────────────────────────────
    center.shutdown();
    transport.disconnect();

    tracing::info!("CampusHub console shut down gracefully");
    Ok(())
}

/// Log the current feed
fn print_feed(snapshot: &FeedSnapshot) {
    tracing::info!(
        unread = snapshot.unread_count,
        visible = snapshot.notifications.len(),
        pending = snapshot.pending_ids.len(),
        "Feed updated"
    );
    for notification in snapshot.notifications.iter().take(10) {
        tracing::info!(
            id = %notification.id,
            kind = %notification.kind,
            read = notification.is_read(),
            "{}",
            notification.title
        );
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
