//! Liveness endpoint for container orchestration.

use axum::routing::get;
use axum::{Json, Router};
use tracing::{info, warn};

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

/// Serve `GET /health` until the process exits. Bind or serve failures
/// are logged; the bot keeps running without the health surface.
pub async fn serve(port: u16) {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            info!("Health endpoint listening on {addr}");
            if let Err(e) = axum::serve(listener, router()).await {
                warn!("Health server error: {e}");
            }
        }
        Err(e) => warn!("Failed to bind health endpoint on {addr}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_returns_healthy_payload() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router()).await.unwrap();
        });

        let response = reqwest::get(format!("http://{addr}/health")).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
    }
}
