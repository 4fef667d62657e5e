use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Extension;
use axum::Json;
use landlord_wizard::error::AppError;
use landlord_wizard::wizard::arrears::import_ledger;
use landlord_wizard::wizard::{wizard_router, ArrearsItem, ArrearsSchedule, FactsRepository, Pence};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub(crate) struct LedgerImportRequest {
    pub(crate) ledger_csv: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LedgerImportResponse {
    pub(crate) items: Vec<ArrearsItem>,
    pub(crate) total_arrears: Pence,
    pub(crate) periods_in_arrears: usize,
    /// Merge into case facts to replace the stored schedule.
    pub(crate) facts_patch: Value,
}

pub(crate) fn with_wizard_routes<R>(repository: Arc<R>) -> axum::Router
where
    R: FactsRepository + 'static,
{
    wizard_router(repository)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/wizard/arrears/import", post(ledger_import_endpoint))
}

pub(crate) async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn ledger_import_endpoint(
    Json(payload): Json<LedgerImportRequest>,
) -> Result<Json<LedgerImportResponse>, AppError> {
    let items = import_ledger(payload.ledger_csv.as_bytes())?;
    let schedule = ArrearsSchedule {
        items,
        declared_total: None,
    };
    info!(
        periods = schedule.items.len(),
        total = %schedule.total(),
        "rent ledger imported"
    );

    Ok(Json(LedgerImportResponse {
        total_arrears: schedule.total(),
        periods_in_arrears: schedule.periods_in_arrears(),
        facts_patch: schedule.to_facts_patch(),
        items: schedule.items,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemoryFactsRepository;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_wizard_routes(Arc::new(InMemoryFactsRepository::default())).layer(Extension(state))
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn readiness_tracks_the_listener_flag() {
        let response = app(false)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(read_json(response).await["status"], "initializing");

        let response = app(true)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn wizard_routes_are_mounted_alongside_health_checks() {
        let response = app(true)
            .oneshot(
                Request::post("/api/v1/wizard/evaluate")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({
                            "product": "money_claim",
                            "jurisdiction": "scotland",
                            "facts": {}
                        })
                        .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;
        assert_eq!(payload["product"], "money_claim");
        assert_eq!(payload["jurisdiction"], "scotland");
    }

    #[tokio::test]
    async fn ledger_import_totals_the_schedule() {
        let request = LedgerImportRequest {
            ledger_csv: "period_start,period_end,rent_due,rent_paid\n\
                         2026-08-01,2026-08-31,1000,0\n\
                         2026-09-01,2026-09-30,1000,250\n\
                         2026-10-01,2026-10-31,1000,1000\n"
                .to_string(),
        };

        let Json(body) = ledger_import_endpoint(Json(request))
            .await
            .expect("ledger imports");

        assert_eq!(body.items.len(), 3);
        assert_eq!(body.total_arrears, Pence(175_000));
        assert_eq!(body.periods_in_arrears, 2);
        assert_eq!(
            body.facts_patch["issues"]["rent_arrears"]["arrears_items"]
                .as_array()
                .map(Vec::len),
            Some(3)
        );
    }

    #[tokio::test]
    async fn malformed_ledger_is_a_bad_request() {
        let request = LedgerImportRequest {
            ledger_csv: "period_start,period_end,rent_due,rent_paid\n\
                         2026-08-01,2026-08-31,lots,0\n"
                .to_string(),
        };

        let response = ledger_import_endpoint(Json(request))
            .await
            .expect_err("amount rejected")
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = read_json(response).await;
        assert!(payload["error"]
            .as_str()
            .expect("error message")
            .contains("row 2"));
    }
}
