use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};

use crate::{
	error::AppError,
	openapi::{SECURITY_SCHEME_BEARER, SECURITY_SCHEME_SESSION},
	route::auth,
	store::Auth,
};

pub const AUTHORIZATION_PREFIX: &str = "Bearer ";
pub const COOKIE_NAME: &str = "session";

/// Reads the session token from the `Authorization` header, falling back
/// to the session cookie.
fn session_token(parts: &request::Parts) -> Result<Option<String>, auth::Error> {
	if let Some(header) = parts.headers.get(header::AUTHORIZATION) {
		let token = header
			.to_str()
			.ok()
			.and_then(|value| value.strip_prefix(AUTHORIZATION_PREFIX))
			.filter(|token| !token.is_empty())
			.ok_or(auth::Error::MalformedAuthorization)?;

		return Ok(Some(token.to_string()));
	}

	let cookie = parts
		.headers
		.get_all(header::COOKIE)
		.into_iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(cookie::Cookie::split_parse)
		.filter_map(Result::ok)
		.find(|cookie| cookie.name() == COOKIE_NAME);

	Ok(cookie.map(|cookie| cookie.value().to_string()))
}

async fn resolve<S>(parts: &request::Parts, state: &S) -> Result<Option<Session>, AppError>
where
	Auth: FromRef<S>,
	S: Sync,
{
	let Some(token) = session_token(parts)? else {
		return Ok(None);
	};

	let user = Auth::from_ref(state)
		.user_for_token(&token)
		.await?
		.ok_or(auth::Error::InvalidSession)?;

	Ok(Some(Session { user }))
}

/// Extracts the session and related user from the request.
///
/// If neither a bearer token nor a session cookie is present, a
/// [`auth::Error::NoSessionCookieOrToken`] is returned. If the token does
/// not belong to a user, a [`auth::Error::InvalidSession`] is returned.
///
/// ```rust
/// async fn route(session: Session) {
///   println!("{}", session.user.display_name);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub user: auth::model::CurrentUser,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	Auth: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		resolve(parts, state)
			.await?
			.ok_or_else(|| auth::Error::NoSessionCookieOrToken.into())
	}
}

/// The user viewing a resource, or `None` for anonymous requests.
///
/// Unlike [`Session`], a missing token is not an error, and neither is one
/// that no longer resolves to a user (such as an expired session cookie).
/// Those requests are treated as anonymous. A malformed `Authorization`
/// header is still rejected.
#[derive(Debug)]
pub struct Viewer(pub Option<auth::model::CurrentUser>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Viewer
where
	Auth: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		match resolve(parts, state).await {
			Ok(session) => Ok(Self(session.map(|session| session.user))),
			Err(AppError::Auth(auth::Error::InvalidSession)) => {
				tracing::debug!("ignoring unknown session token");
				Ok(Self(None))
			}
			Err(error) => Err(error),
		}
	}
}

fn add_security(operation: &mut aide::openapi::Operation) {
	operation.security.extend([
		[(SECURITY_SCHEME_SESSION.to_string(), Vec::new())]
			.into_iter()
			.collect(),
		[(SECURITY_SCHEME_BEARER.to_string(), Vec::new())]
			.into_iter()
			.collect(),
	]);
}

impl OperationInput for Session {
	/// This adds a session cookie or bearer token requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		add_security(operation);
	}
}

impl OperationInput for Viewer {
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		add_security(operation);
		// Anonymous access is allowed as well
		operation.security.push(Default::default());
	}
}
