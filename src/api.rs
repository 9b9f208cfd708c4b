use crate::{
    error::{BackendError, ErrorKind},
    router::{classify, RequestRouter},
};
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::{sync::Arc, time::Instant};

#[derive(Deserialize)]
pub struct GenerateReq {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unconfigured => StatusCode::BAD_REQUEST,
        ErrorKind::Unreachable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::InvalidInput | ErrorKind::UpstreamFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for BackendError {
    fn into_response(self) -> axum::response::Response {
        let status = status_for(self.kind());
        (status, Json(json!({ "detail": self.message() }))).into_response()
    }
}

pub fn routes(router: Arc<RequestRouter>) -> Router {
    let health = router.clone();
    Router::new()
        .route(
            "/generate",
            post(move |Json(req): Json<GenerateReq>| {
                let router = router.clone();
                async move {
                    let model = router.resolve_model(req.model_name.as_deref()).to_string();
                    let backend = classify(&model).as_str();
                    let started = Instant::now();
                    let prompt = req.prompt.unwrap_or_default();
                    let result = router.route(&prompt, Some(&model)).await;
                    let elapsed = started.elapsed();

                    let outcome = match &result {
                        Ok(_) => "ok",
                        Err(e) => e.kind().as_str(),
                    };
                    metrics::counter!("generate_requests_total", "target" => backend, "outcome" => outcome)
                        .increment(1);
                    metrics::histogram!("generate_latency_seconds", "target" => backend)
                        .record(elapsed.as_secs_f64());

                    match result {
                        Ok(r) => {
                            tracing::info!(%model, backend, ?elapsed, "generated");
                            Json(r).into_response()
                        }
                        Err(e) => {
                            tracing::warn!(%model, backend, ?elapsed, kind = outcome, error = %e, "generation failed");
                            e.into_response()
                        }
                    }
                }
            }),
        )
        .route(
            "/health",
            get(move || {
                let router = health.clone();
                async move {
                    Json(json!({
                        "status": "ok",
                        "default_model": router.default_model(),
                        "cloud_configured": router.cloud_configured(),
                    }))
                }
            }),
        )
}
