use aide::axum::{routing::post_with, ApiRouter};
use axum::{extract::DefaultBodyLimit, http::StatusCode};

use crate::{error, media, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid file name {0:?}")]
	InvalidFileName(String),
	#[error("empty upload")]
	EmptyUpload,
	#[error("invalid image: {0}")]
	InvalidImage(#[source] image::ImageError),
	#[error("image processing failed: {0}")]
	Processing(#[source] tokio::task::JoinError),
}

impl From<media::Error> for Error {
	fn from(error: media::Error) -> Self {
		match error {
			media::Error::Image(error) => Self::InvalidImage(error),
			media::Error::Task(error) => Self::Processing(error),
		}
	}
}

pub type RouteError = error::RouteError<Error>;

impl From<Error> for RouteError {
	fn from(error: Error) -> Self {
		Self::Route(error)
	}
}

impl From<media::Error> for RouteError {
	fn from(error: media::Error) -> Self {
		Self::Route(error.into())
	}
}

pub fn routes(max_upload_bytes: usize) -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", post_with(upload_image, upload_image_docs))
		.layer(DefaultBodyLimit::max(max_upload_bytes))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::InvalidFileName(..) | Self::EmptyUpload => StatusCode::BAD_REQUEST,
			Self::InvalidImage(..) => StatusCode::UNPROCESSABLE_ENTITY,
			Self::Processing(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::InvalidFileName(name) => error::Message::new("invalid_file_name")
				.field("name")
				.detail("name", name)
				.into_vec(),
			Self::EmptyUpload => error::Message::new("the upload is empty").into_vec(),
			Self::InvalidImage(..) => {
				error::Message::new("the upload is not a supported image").into_vec()
			}
			Self::Processing(..) => Vec::new(),
		}
	}
}
