use axum::{body::Bytes, extract::State};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use macros::route;

use crate::{
	error,
	extract::{Json, Query, Session},
	media,
	openapi::tag,
	store::BlobStore,
	AppState,
};

use super::{model, Error, RouteError};

/// Uploads an image under a path derived from its file name, then
/// resizes it to fit the post layout.
///
/// The resized image is returned, not stored.
pub async fn upload_and_resize(
	blobs: &dyn BlobStore,
	name: &str,
	data: Bytes,
) -> Result<model::ResizedImage, RouteError> {
	let path = model::object_path(name).ok_or_else(|| Error::InvalidFileName(name.to_string()))?;

	if data.is_empty() {
		return Err(Error::EmptyUpload.into());
	}

	let content_type = mime_guess::from_path(&path).first_or_octet_stream();

	blobs
		.upload(&path, data.clone(), content_type.essence_str())
		.await
		.map_err(|error| {
			tracing::error!(%path, %error, "failed to upload image");
			error
		})?;

	tracing::info!(%path, size = data.len(), "image uploaded");

	let resized = media::resize_async(data).await.map_err(|error| {
		tracing::warn!(%path, %error, "failed to resize image");
		error
	})?;

	Ok(model::ResizedImage {
		path,
		width: resized.width,
		height: resized.height,
		data_url: format!("data:image/jpeg;base64,{}", STANDARD.encode(&resized.data)),
	})
}

/// Upload image
/// Uploads an image, replacing any earlier upload with the same file name, and returns
/// a copy resized to fit within 900x600 and re-encoded as JPEG.
#[route(
	tag = tag::IMAGE,
	response(status = 422, shape = "error::ErrorBody", description = "The upload is not a supported image"),
)]
pub async fn upload_image(
	State(state): State<AppState>,
	_session: Session,
	Query(input): Query<model::UploadInput>,
	body: Bytes,
) -> Result<Json<model::ResizedImage>, RouteError> {
	let image = upload_and_resize(state.blobs.as_ref(), &input.name, body).await?;

	Ok(Json(image))
}
