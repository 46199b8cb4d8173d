use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mailforge::config::Config;
use mailforge::database::TemplateStore;
use mailforge::uploads::BlobStore;
use mailforge::{setup_router, AppState};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailforge=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(
        addr = %config.server_addr(),
        database = %config.database_url,
        uploads = %config.uploads_dir.display(),
        layout = %config.layout_path.display(),
        "Loaded configuration"
    );

    let store = TemplateStore::connect(&config.database_url).await?;
    store.initialize().await?;
    tracing::info!("Template table ready");

    let blobs = BlobStore::new(&config.uploads_dir, &config.public_url);
    tokio::fs::create_dir_all(blobs.dir()).await?;

    let state = AppState {
        store: store.clone(),
        blobs,
        layout_path: config.layout_path.clone(),
    };
    let app = setup_router(state, config.max_upload_bytes);

    let addr = config.server_addr();
    tracing::info!("Server running at {}", config.public_url);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("Shut down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
