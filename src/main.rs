use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use movie_catalog::cli::{self, App};
use movie_catalog::config::AppConfig;
use movie_catalog::external::{CacheCleanupTask, CachedCatalog, KinopoiskClient};
use movie_catalog::services::{AuthGate, CatalogBrowser, FavoritesStore};
use movie_catalog::storage::{JsonFileStore, KeyValueStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing（输出到 stderr，避免和交互输出混在一起）
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env()?;

    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(&config.store_path)?);
    tracing::info!("Using local store {}", config.store_path.display());

    // Initialize external API client
    let client = KinopoiskClient::with_base_url(config.api_key.clone(), config.base_url.clone())?
        .with_retry_policy(config.retry_policy());
    let catalog = CachedCatalog::new(client);

    // Start cache cleanup task
    let cache_cleanup_task = CacheCleanupTask::new(
        catalog.cache.clone(),
        Duration::from_secs(5 * 60), // 每5分钟清理一次
    );
    tokio::spawn(cache_cleanup_task.start());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    let mut gate = AuthGate::new(config.password.clone());
    if !cli::login(&mut gate, &mut lines, &mut stdout).await? {
        return Ok(());
    }

    let browser = CatalogBrowser::with_limit(catalog, store.clone(), config.page_limit);
    let favorites = FavoritesStore::load(store);
    let mut app = App::new(browser, favorites);
    app.run(&mut lines, &mut stdout).await?;

    tracing::info!("Bye");
    Ok(())
}
