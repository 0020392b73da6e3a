//! REST API surface for the carelink patient service.
//!
//! Thin handlers over the core `PatientService`: request shaping, input
//! validation and error-to-status mapping live here, everything else is
//! delegated. The router is built by [`router`] so both the standalone
//! binary and the workspace's main `carelink-run` binary can serve it.

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use api_shared::{HealthRes, HealthService};
use carelink_core::{PatientError, PatientService};

pub mod dto;

use dto::{ErrorRes, PatientReq, PatientRes};

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    service: PatientService,
}

impl AppState {
    pub fn new(service: PatientService) -> Self {
        Self { service }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_patients,
        get_patient,
        create_patient,
        update_patient,
        delete_patient,
    ),
    components(schemas(HealthRes, PatientReq, PatientRes, ErrorRes))
)]
struct ApiDoc;

/// Builds the application router for the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/patients", get(list_patients).post(create_patient))
        .route(
            "/patients/:id",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the REST API until the server fails.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
/// while running.
pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await
}

type ApiError = (StatusCode, Json<ErrorRes>);

/// Maps a core error to a response status and body.
///
/// `DuplicateEmail` and `NotFound` are expected business outcomes and keep
/// their messages. A billing failure means the patient exists but billing
/// may be incomplete, so the body names the persisted id. Storage faults are
/// logged and answered opaquely.
fn error_response(err: PatientError) -> ApiError {
    match err {
        PatientError::DuplicateEmail(_) => (
            StatusCode::CONFLICT,
            Json(ErrorRes {
                error: err.to_string(),
                patient_id: None,
            }),
        ),
        PatientError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorRes {
                error: err.to_string(),
                patient_id: None,
            }),
        ),
        PatientError::InvalidInput(_) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorRes {
                error: err.to_string(),
                patient_id: None,
            }),
        ),
        PatientError::BillingProvisioning { patient_id, source } => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorRes {
                error: format!("patient created but billing provisioning failed: {source}"),
                patient_id: Some(patient_id.to_string()),
            }),
        ),
        PatientError::Storage(e) => {
            tracing::error!("storage failure: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorRes {
                    error: "internal error".into(),
                    patient_id: None,
                }),
            )
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API.
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "List of patients", body = [PatientRes]),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// List all patients in the system.
#[axum::debug_handler]
async fn list_patients(
    State(state): State<AppState>,
) -> Result<Json<Vec<PatientRes>>, ApiError> {
    let patients = state.service.list().await.map_err(error_response)?;
    Ok(Json(patients.iter().map(PatientRes::from).collect()))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient details", body = PatientRes),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
/// Fetch a single patient by id.
#[axum::debug_handler]
async fn get_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<PatientRes>, ApiError> {
    let patient = state.service.get(id).await.map_err(error_response)?;
    Ok(Json(PatientRes::from(&patient)))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = PatientReq,
    responses(
        (status = 200, description = "Patient created", body = PatientRes),
        (status = 400, description = "Invalid input", body = ErrorRes),
        (status = 409, description = "Email already in use", body = ErrorRes),
        (status = 502, description = "Patient created but billing provisioning failed", body = ErrorRes)
    )
)]
/// Create a new patient record.
///
/// On success the record is persisted, a billing account is provisioned and
/// a creation event is announced. A 502 means the record was persisted but
/// billing failed; the error body carries the persisted patient id.
#[axum::debug_handler]
async fn create_patient(
    State(state): State<AppState>,
    Json(req): Json<PatientReq>,
) -> Result<Json<PatientRes>, ApiError> {
    let draft = req.into_new_patient().map_err(error_response)?;
    let patient = state.service.create(draft).await.map_err(error_response)?;
    Ok(Json(PatientRes::from(&patient)))
}

#[utoipa::path(
    put,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    request_body = PatientReq,
    responses(
        (status = 200, description = "Patient updated", body = PatientRes),
        (status = 400, description = "Invalid input", body = ErrorRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 409, description = "Email already in use", body = ErrorRes)
    )
)]
/// Update an existing patient's mutable fields.
#[axum::debug_handler]
async fn update_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<PatientReq>,
) -> Result<Json<PatientRes>, ApiError> {
    let update = req.into_update().map_err(error_response)?;
    let patient = state
        .service
        .update(id, update)
        .await
        .map_err(error_response)?;
    Ok(Json(PatientRes::from(&patient)))
}

#[utoipa::path(
    delete,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 204, description = "Patient deleted"),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
/// Delete a patient record.
#[axum::debug_handler]
async fn delete_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.service.delete(id).await.map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}
