use axum::{
	extract::State,
	http::header,
	response::{IntoResponse, Response},
};
use macros::route;

use crate::{error::AppError, extract::Path, openapi::tag, AppState};

use super::PathInput;

/// Download object
/// Returns the raw contents of a stored object, such as an image attached to a post.
#[route(tag = tag::IMAGE)]
pub async fn download_blob(
	State(state): State<AppState>,
	Path(input): Path<PathInput>,
) -> Result<Response, AppError> {
	let object = state.blobs.download(&input.path).await?;

	Ok((
		[
			(header::CONTENT_TYPE, object.content_type),
			(header::CACHE_CONTROL, "public, max-age=3600".to_string()),
		],
		object.data,
	)
		.into_response())
}
