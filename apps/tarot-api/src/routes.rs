use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use tarot_service::{
	Error, GuidedRequest, GuidedResponse, PersonaListResponse, ReadingRequest, ReadingResponse,
	personas,
};

use crate::state::AppState;

const SERVICE_MESSAGE: &str = "Tarot com IA - API funcionando";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/", get(root))
		.route("/health", get(health))
		.route("/consulta-tarot", post(reading))
		.route("/vozes-guru", get(list_personas))
		.route("/consulta-guru", post(guided))
		.with_state(state)
}

#[derive(Debug, Serialize)]
struct RootBody {
	message: &'static str,
	version: &'static str,
	status: &'static str,
}

#[derive(Debug, Serialize)]
struct HealthBody {
	status: &'static str,
	#[serde(with = "time::serde::rfc3339")]
	timestamp: OffsetDateTime,
}

async fn root() -> Json<RootBody> {
	Json(RootBody { message: SERVICE_MESSAGE, version: tarot_cli::VERSION, status: "online" })
}

async fn health() -> Json<HealthBody> {
	Json(HealthBody { status: "healthy", timestamp: OffsetDateTime::now_utc() })
}

async fn reading(
	State(state): State<AppState>,
	Json(payload): Json<ReadingRequest>,
) -> Result<Json<ReadingResponse>, ApiError> {
	let response = state.service.reading(payload).await?;

	Ok(Json(response))
}

async fn list_personas() -> Json<PersonaListResponse> {
	Json(personas::list_personas())
}

async fn guided(
	State(state): State<AppState>,
	Json(payload): Json<GuidedRequest>,
) -> Result<Json<GuidedResponse>, ApiError> {
	let response = state.service.guided(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: &'static str,
	message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	correlation_id: Option<Uuid>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
	correlation_id: Option<Uuid>,
}
impl ApiError {
	fn invalid_request(message: String) -> Self {
		Self {
			status: StatusCode::UNPROCESSABLE_ENTITY,
			error_code: "INVALID_REQUEST",
			message,
			correlation_id: None,
		}
	}

	/// Logs the raw error under a fresh correlation id and hides it from the caller.
	fn internal(err: &Error) -> Self {
		let correlation_id = Uuid::new_v4();

		tracing::error!(%correlation_id, error = %err, "Request failed.");

		Self {
			status: StatusCode::INTERNAL_SERVER_ERROR,
			error_code: "INTERNAL_ERROR",
			message: "Internal error. Quote the correlation id when reporting it.".to_string(),
			correlation_id: Some(correlation_id),
		}
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } => Self::invalid_request(message),
			other => Self::internal(&other),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			error_code: self.error_code,
			message: self.message,
			correlation_id: self.correlation_id,
		};

		(self.status, Json(body)).into_response()
	}
}
