mod engine;
mod error;
mod forest;
mod misc;
mod predictor;
mod server;
mod store;
mod trainer;

#[cfg(test)]
mod testing;

use crate::engine::SharedModel;
use crate::forest::RandomForest;
use crate::predictor::Predictor;
use crate::server::Server;
use crate::store::ModelStore;
use anyhow::{Context, Result};
use data_ingestion::config::AppConfig;
use data_ingestion::fetcher::{BinanceClient, KlineSource};
use data_ingestion::logger::init_logger;
use log::info;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logger();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let source: Arc<dyn KlineSource> = Arc::new(BinanceClient::from_config(&config)?);

    // The model is fixed before the server accepts its first request.
    let store = ModelStore::new(&config.model_path);
    let forest: RandomForest = store
        .load_or_train(source.as_ref(), &mut rand::rng())
        .await
        .with_context(|| format!("Failed to load model from {}", store.path().display()))?;
    info!(
        "🚀Model ready: {} trees, seed {}",
        forest.n_trees(),
        forest.config().seed
    );

    let model: SharedModel = Arc::new(forest);
    let predictor = Predictor::new(source, model);

    Server::init(predictor).run(config.port).await?;

    info!("Server has been shut down gracefully");

    Ok(())
}
