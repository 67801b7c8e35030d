use std::{borrow::Cow, fmt};

use aide::OperationOutput;
use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::IntoResponse,
	Json,
};
use schemars::JsonSchema;
use serde::Serialize;
use tower_governor::GovernorError;

use crate::{route::auth, store};

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single client-facing error message.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message<'a> {
	/// A human-readable description of the error.
	pub content: Cow<'a, str>,
	/// The input field the error relates to, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	/// Additional machine-readable context.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'a, Map>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	#[must_use]
	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	#[must_use]
	pub fn detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(|| Cow::Owned(Map::new()))
			.to_mut()
			.insert(key.into(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse<'a> {
	pub success: bool,
	pub errors: Vec<Message<'a>>,
}

/// The documented body of every error response.
pub type ErrorBody = crate::extract::Json<ErrorResponse<'static>>;

/// Describes how an error is presented to the client.
///
/// The [`fmt::Display`] output of the error is never sent to the client,
/// so it can contain sensitive information. Only the messages returned by
/// [`ErrorShape::into_errors`] are.
pub trait ErrorShape: fmt::Debug {
	fn status(&self) -> StatusCode;

	fn into_errors(self) -> Vec<Message<'static>>;
}

/// Errors shared by every route.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("query error: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("path error: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("auth error: {0}")]
	Auth(#[from] auth::Error),
	#[error("store error: {0}")]
	Store(#[from] store::Error),
	#[error("rate limited: {0:?}")]
	RateLimit(GovernorError),
}

impl From<GovernorError> for AppError {
	fn from(error: GovernorError) -> Self {
		Self::RateLimit(error)
	}
}

impl ErrorShape for AppError {
	fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) | Self::Query(..) | Self::Path(..) => StatusCode::BAD_REQUEST,
			Self::Auth(error) => error.status(),
			Self::Store(error) => error.status(),
			Self::RateLimit(GovernorError::TooManyRequests { .. }) => StatusCode::TOO_MANY_REQUESTS,
			Self::RateLimit(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn into_errors(self) -> Vec<Message<'static>> {
		match self {
			Self::Validation(errors) => errors
				.field_errors()
				.into_iter()
				.flat_map(|(field, errors)| {
					errors.iter().map(move |error| {
						Message::new(
							error
								.message
								.as_ref()
								.map_or_else(|| error.code.to_string(), ToString::to_string),
						)
						.field(field.to_string())
					})
				})
				.collect(),
			Self::Query(error) => Message::new(error.body_text()).into_vec(),
			Self::Path(error) => Message::new(error.body_text()).into_vec(),
			Self::Auth(error) => error.into_errors(),
			Self::Store(error) => error.into_errors(),
			Self::RateLimit(GovernorError::TooManyRequests { wait_time, .. }) => {
				Message::new("too many requests")
					.detail("wait_time", wait_time)
					.into_vec()
			}
			Self::RateLimit(..) => Vec::new(),
		}
	}
}

/// An error returned from a route, either one shared by every route
/// or one specific to the route's module.
#[derive(Debug)]
pub enum RouteError<E> {
	App(AppError),
	Route(E),
}

impl<E> From<AppError> for RouteError<E> {
	fn from(error: AppError) -> Self {
		Self::App(error)
	}
}

impl<E> From<store::Error> for RouteError<E> {
	fn from(error: store::Error) -> Self {
		Self::App(error.into())
	}
}

impl<E> From<auth::Error> for RouteError<E> {
	fn from(error: auth::Error) -> Self {
		Self::App(error.into())
	}
}

impl<E> From<validator::ValidationErrors> for RouteError<E> {
	fn from(error: validator::ValidationErrors) -> Self {
		Self::App(error.into())
	}
}

impl<E: ErrorShape> IntoResponse for RouteError<E> {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::App(error) => error.into_response(),
			Self::Route(error) => respond(error),
		}
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		respond(self)
	}
}

impl<E> OperationOutput for RouteError<E> {
	type Inner = Self;
}

impl OperationOutput for AppError {
	type Inner = Self;
}

fn respond<E: ErrorShape>(error: E) -> Response<Body> {
	let status = error.status();

	if status.is_server_error() {
		tracing::error!(?error, "request failed");
	}

	(
		status,
		Json(ErrorResponse {
			success: false,
			errors: error.into_errors(),
		}),
	)
		.into_response()
}
