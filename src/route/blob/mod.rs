use aide::axum::{routing::get_with, ApiRouter};
use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

use crate::AppState;

pub mod route;

#[derive(Deserialize, Validate, JsonSchema)]
pub struct PathInput {
	/// The path of the object.
	#[validate(length(min = 1, max = 1024))]
	pub path: String,
}

/// Serves the objects handed out as download URLs by the blob store.
pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new().api_route("/*path", get_with(download_blob, download_blob_docs))
}
