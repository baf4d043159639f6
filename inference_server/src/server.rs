use anyhow::Result;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use feature_processing::FeatureError;
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::misc::PredictionResponse;
use crate::predictor::Predictor;

/// Shared application state: the read-only predictor.
#[derive(Clone)]
pub struct AppState {
    predictor: Arc<Predictor>,
}

fn default_coin() -> String {
    "BTC".to_string()
}

#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    #[serde(default = "default_coin")]
    coin: String,
}

pub struct ApiError(FeatureError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Prediction failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

/// GET /api/predict?coin=BTC
async fn predict_handler(
    State(state): State<AppState>,
    Query(query): Query<PredictQuery>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let response = state.predictor.predict(&query.coin).await.map_err(ApiError)?;
    info!(
        "{} -> {:?} ({:.1}%)",
        response.coin, response.prediction, response.confidence
    );
    Ok(Json(response))
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "status": "ok", "model": state.predictor.model_name() }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/predict", get(predict_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

pub struct Server {
    state: AppState,
}

impl Server {
    pub fn init(predictor: Predictor) -> Self {
        Self {
            state: AppState {
                predictor: Arc::new(predictor),
            },
        }
    }

    pub async fn run(self, port: u16) -> Result<()> {
        let app = router(self.state);

        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("HTTP server running on {}", addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal, initiating graceful shutdown");
}
