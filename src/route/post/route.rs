use axum::extract::State;
use macros::route;

use crate::{
	error,
	extract::{Json, Path, Session, Viewer},
	openapi::tag,
	AppState,
};

use super::{model, viewer::PostViewer, RouteError};

/// Get single post
/// Returns a single post by its unique id, with its content reduced to plain text.
/// `can_delete` is set when the viewer is the post's author.
#[route(
	tag = tag::POST,
	response(status = 404, shape = "error::ErrorBody", description = "The post does not exist"),
	response(status = 502, shape = "error::ErrorBody", description = "The post store could not be reached"),
)]
pub async fn get_post(
	State(state): State<AppState>,
	Viewer(viewer): Viewer,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::PostView>, RouteError> {
	let view = PostViewer::new(state.documents.as_ref(), state.blobs.as_ref())
		.view(&path.id, viewer.as_ref())
		.await?;

	Ok(Json(view))
}

/// Delete post
/// Deletes a post by its unique id. Only the post's author can delete it.
/// Returns where the client should navigate to afterwards.
#[route(
	tag = tag::POST,
	response(status = 403, shape = "error::ErrorBody", description = "The user is not the post's author"),
	response(status = 404, shape = "error::ErrorBody", description = "The post does not exist"),
)]
pub async fn delete_post(
	State(state): State<AppState>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::DeleteOutcome>, RouteError> {
	PostViewer::new(state.documents.as_ref(), state.blobs.as_ref())
		.delete(&path.id, &session.user)
		.await?;

	Ok(Json(model::DeleteOutcome {
		notice: "The post was deleted successfully.".into(),
		redirect: state.config.listing_path.clone(),
	}))
}
