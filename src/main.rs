use coursewise::api::{create_router, AppState};
use coursewise::config::Config;
use coursewise::engine::ModelArtifactStore;
use coursewise::error::AppError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let state = AppState::new(ModelArtifactStore::new(&config.models_dir));

    // Serve even without artifacts; requests get 503 until /api/v1/train runs
    match state.store.load() {
        Ok(snapshot) => state.predictor.install(snapshot).await,
        Err(AppError::ModelsNotInitialized) => {
            tracing::warn!(
                models_dir = %config.models_dir,
                "No model snapshot found; recommendations unavailable until training runs"
            );
        }
        Err(e) => return Err(e.into()),
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Recommendation engine listening");
    axum::serve(listener, app).await?;

    Ok(())
}
