use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use super::arrears::{ArrearsItem, ArrearsSchedule};
use super::calculators::{suggest_notice_expiry, validate_ground8_eligibility};
use super::domain::{Jurisdiction, Pence, Product, RentFrequency, Route};
use super::facts::CaseFacts;
use super::persistence::{CaseId, FactsRepository, RepositoryError, SaveContext};
use super::sections::SectionTable;

/// Malformed request input, reported as 400.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardRequestError {
    #[error("unknown product '{0}'")]
    Product(String),
    #[error("unknown jurisdiction '{0}'")]
    Jurisdiction(String),
    #[error("unknown route '{0}'")]
    Route(String),
    #[error("unknown rent frequency '{0}'")]
    RentFrequency(String),
    #[error("{field} must be a positive amount")]
    Amount { field: &'static str },
    #[error("facts must be a JSON object")]
    Facts,
}

impl IntoResponse for WizardRequestError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.to_string() });
        (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
    }
}

pub fn parse_product(raw: &str) -> Result<Product, WizardRequestError> {
    Product::parse(raw).ok_or_else(|| WizardRequestError::Product(raw.to_string()))
}

pub fn parse_jurisdiction(raw: &str) -> Result<Jurisdiction, WizardRequestError> {
    Jurisdiction::parse(raw).ok_or_else(|| WizardRequestError::Jurisdiction(raw.to_string()))
}

/// Router exposing facts storage and the stateless rule calculators.
pub fn wizard_router<R>(repository: Arc<R>) -> Router
where
    R: FactsRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/cases/:case_id/facts",
            get(get_facts_handler::<R>).put(save_facts_handler::<R>),
        )
        .route("/api/v1/wizard/evaluate", post(evaluate_handler))
        .route("/api/v1/wizard/notice-expiry", post(notice_expiry_handler))
        .route("/api/v1/wizard/ground8", post(ground8_handler))
        .with_state(repository)
}

pub(crate) async fn get_facts_handler<R>(
    State(repository): State<Arc<R>>,
    Path(case_id): Path<String>,
) -> Response
where
    R: FactsRepository + 'static,
{
    let case_id = CaseId(case_id);
    match repository.get_case_facts(&case_id).await {
        Ok(Some(facts)) => {
            let payload = json!({ "case_id": case_id, "facts": facts });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Ok(None) | Err(RepositoryError::NotFound(_)) => {
            let payload = json!({ "error": format!("case {case_id} not found") });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error) => repository_failure(&case_id, error),
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveFactsRequest {
    pub product: String,
    pub jurisdiction: String,
    pub facts: Value,
    /// Replace stored facts instead of deep-merging into them.
    #[serde(default)]
    pub replace: bool,
}

pub(crate) async fn save_facts_handler<R>(
    State(repository): State<Arc<R>>,
    Path(case_id): Path<String>,
    axum::Json(request): axum::Json<SaveFactsRequest>,
) -> Response
where
    R: FactsRepository + 'static,
{
    let case_id = CaseId(case_id);
    let (product, jurisdiction) = match (
        parse_product(&request.product),
        parse_jurisdiction(&request.jurisdiction),
    ) {
        (Ok(product), Ok(jurisdiction)) => (product, jurisdiction),
        (Err(error), _) | (_, Err(error)) => return error.into_response(),
    };
    let Value::Object(update) = request.facts else {
        return WizardRequestError::Facts.into_response();
    };

    let mut facts = if request.replace {
        CaseFacts::new()
    } else {
        match repository.get_case_facts(&case_id).await {
            Ok(existing) => existing.unwrap_or_default(),
            Err(RepositoryError::NotFound(_)) => CaseFacts::new(),
            Err(error) => return repository_failure(&case_id, error),
        }
    };
    facts.merge(&update);
    facts.set_meta(product, jurisdiction);

    match repository
        .save_case_facts(&case_id, &facts, SaveContext::new(product, jurisdiction))
        .await
    {
        Ok(()) => {
            let payload = json!({ "case_id": case_id, "facts": facts });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => repository_failure(&case_id, error),
    }
}

fn repository_failure(case_id: &CaseId, error: RepositoryError) -> Response {
    warn!(case_id = %case_id, error = %error, "facts repository request failed");
    let status = match error {
        RepositoryError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RepositoryError::NotFound(_) => StatusCode::NOT_FOUND,
        RepositoryError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub product: String,
    pub jurisdiction: String,
    #[serde(default)]
    pub facts: Value,
    pub today: Option<NaiveDate>,
}

pub(crate) async fn evaluate_handler(axum::Json(request): axum::Json<EvaluateRequest>) -> Response {
    let (product, jurisdiction) = match (
        parse_product(&request.product),
        parse_jurisdiction(&request.jurisdiction),
    ) {
        (Ok(product), Ok(jurisdiction)) => (product, jurisdiction),
        (Err(error), _) | (_, Err(error)) => return error.into_response(),
    };
    let facts = CaseFacts::from_value(request.facts);
    let today = request.today.unwrap_or_else(|| Local::now().date_naive());
    let report = SectionTable::for_product(product, jurisdiction).evaluate(&facts, today);
    (StatusCode::OK, axum::Json(report)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct NoticeExpiryRequest {
    pub route: String,
    #[serde(default)]
    pub grounds: Vec<String>,
    pub served_on: NaiveDate,
}

pub(crate) async fn notice_expiry_handler(
    axum::Json(request): axum::Json<NoticeExpiryRequest>,
) -> Response {
    let Some(route) = Route::parse(&request.route) else {
        return WizardRequestError::Route(request.route).into_response();
    };
    let suggestion = suggest_notice_expiry(route, &request.grounds, request.served_on);
    (StatusCode::OK, axum::Json(suggestion)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct Ground8Request {
    pub rent_amount: f64,
    pub rent_frequency: String,
    #[serde(default)]
    pub arrears_items: Vec<Value>,
    pub total_arrears: Option<f64>,
}

pub(crate) async fn ground8_handler(axum::Json(request): axum::Json<Ground8Request>) -> Response {
    let Some(rent) = Pence::from_pounds(request.rent_amount).filter(|rent| rent.is_positive())
    else {
        return WizardRequestError::Amount {
            field: "rent_amount",
        }
        .into_response();
    };
    let Some(frequency) = RentFrequency::parse(&request.rent_frequency) else {
        return WizardRequestError::RentFrequency(request.rent_frequency).into_response();
    };
    let schedule = ArrearsSchedule {
        items: request
            .arrears_items
            .iter()
            .filter_map(ArrearsItem::from_value)
            .collect(),
        declared_total: request.total_arrears.and_then(Pence::from_pounds),
    };
    let assessment = validate_ground8_eligibility(rent, frequency, &schedule);
    (StatusCode::OK, axum::Json(assessment)).into_response()
}
