use axum::{
	Json, Router,
	extract::{State, rejection::JsonRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use juris_service::{ChatRequest, ChatResponse, Error as ServiceError};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/chat", post(chat))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn chat(
	State(state): State<AppState>,
	payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.chat(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	stage: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	stage: Option<String>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		stage: Option<String>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), stage }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let message = err.to_string();

		match err {
			ServiceError::InvalidInput { .. } =>
				Self::new(StatusCode::BAD_REQUEST, "invalid_input", message, None),
			ServiceError::RetrievalFailure { stage, .. } => Self::new(
				StatusCode::INTERNAL_SERVER_ERROR,
				"retrieval_failed",
				message,
				Some(stage.as_str().to_string()),
			),
		}
	}
}
impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		Self::new(rejection.status(), "invalid_request", rejection.body_text(), None)
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		if self.status.is_server_error() {
			tracing::error!(
				error_code = %self.error_code,
				message = %self.message,
				"Chat request failed."
			);
		}

		let body =
			ErrorBody { error_code: self.error_code, message: self.message, stage: self.stage };

		(self.status, Json(body)).into_response()
	}
}
