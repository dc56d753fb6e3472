//! HTTP key-generation service behind `courier crypto --serve`.

use anyhow::Result;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use courier_crypto::KeyPair;

const BIND_ADDR: &str = "127.0.0.1:8080";

pub async fn serve() -> Result<()> {
    let app = Router::new().route("/gen-key-pair", post(gen_key_pair));

    let listener = tokio::net::TcpListener::bind(BIND_ADDR).await?;
    tracing::info!("key service listening on http://{BIND_ADDR}");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Generate a fresh key pair per request.
async fn gen_key_pair() -> impl IntoResponse {
    match KeyPair::generate() {
        Ok(pair) => (StatusCode::OK, Json(pair.encode())).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "key generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
