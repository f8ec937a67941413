mod bootstrap;

use imgvault_api::AppState;
use imgvault_config::ConfigState;
use imgvault_events::{AppEvent, EventBus};
use imgvault_storage::{BackendSelector, StorageBackend};
use crate::bootstrap::{config, logging, router, server};
use anyhow::Result;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    logging::initialize();

    let events = EventBus::new(true);
    events.emit(AppEvent::Starting);

    let config_path = std::env::var("IMGVAULT_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = config::load(&config_path, &events).await?;

    server::initialize_folders(&config, &events).await?;

    // Runtime settings start from the file on every boot; admin changes are not persisted
    let settings = ConfigState::from_storage(&config.storage);
    let selector = Arc::new(BackendSelector::new(
        Arc::clone(&settings),
        config.storage.clone(),
        &config.security.signing_secret,
    ));

    match selector.get_instance().await {
        Ok(backend) => events.emit(AppEvent::BackendReady {
            kind: backend.kind().to_string(),
        }),
        Err(e) => {
            events.emit(AppEvent::Error {
                context: "Storage backend".to_string(),
                error: e.to_string(),
            });
            return Err(e.into());
        }
    }

    let app_state = AppState::new(
        Arc::clone(&selector),
        config.server.base_url.clone(),
        config.security.api_key.clone(),
        config.server.streaming_threshold_mb,
    );
    let app = router::build(&config, app_state);
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let listener = bind_server(&addr).await?;

    events.emit(AppEvent::Ready {
        addr: addr.to_string(),
        base_url: config.server.base_url.clone(),
    });

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received, initiating graceful shutdown...");
    };

    axum::serve(listener, app.into_make_service())
        .tcp_nodelay(config.server.tcp_nodelay)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    events.emit(AppEvent::Shutdown);
    Ok(())
}

async fn bind_server(addr: &str) -> Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::AddrInUse {
            let port = addr.rsplit(':').next().unwrap_or("unknown");
            tracing::error!("Port {} is already in use", port);
            tracing::error!("Another application is using this port");
            tracing::error!("Solutions:");
            tracing::error!("1. Stop the other application");
            tracing::error!("2. Change server.port in config.toml");
            #[cfg(target_os = "windows")]
            tracing::error!("3. Find process: netstat -ano | findstr :{}", port);
            #[cfg(not(target_os = "windows"))]
            tracing::error!("3. Find process: lsof -i :{}", port);
        } else {
            tracing::error!("Failed to bind server on {}: {}", addr, e);
        }
        anyhow::anyhow!("Failed to bind server: {}", e)
    })
}
