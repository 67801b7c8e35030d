use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

/// An error that can occur while resolving the current user.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("no session cookie or bearer token")]
	NoSessionCookieOrToken,
	#[error("malformed authorization header")]
	MalformedAuthorization,
	#[error("invalid session")]
	InvalidSession,
}

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new().api_route("/me", get_with(get_me, get_me_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		StatusCode::UNAUTHORIZED
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		error::Message::new(self.to_string()).into_vec()
	}
}
