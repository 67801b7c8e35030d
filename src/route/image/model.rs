use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// The prefix uploaded images are stored under.
pub const IMAGE_PREFIX: &str = "images";

#[derive(Deserialize, Validate, JsonSchema)]
pub struct UploadInput {
	/// The file name of the image. Uploading another image with the same
	/// name replaces it.
	#[validate(length(min = 1, max = 255))]
	pub name: String,
}

/// An uploaded image, resized to fit the post layout.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ResizedImage {
	/// The blob store path the original upload was stored under.
	pub path: String,
	/// The width of the resized image.
	pub width: u32,
	/// The height of the resized image.
	pub height: u32,
	/// The resized image as a `data:image/jpeg;base64,` URL.
	pub data_url: String,
}

/// Derives the storage path of an upload from its file name.
///
/// Only the final component of the name is used, so a name can never
/// point outside of [`IMAGE_PREFIX`].
pub fn object_path(name: &str) -> Option<String> {
	let file_name = name.rsplit(|c: char| c == '/' || c == '\\').next()?.trim();

	if file_name.is_empty() || file_name == "." || file_name == ".." {
		return None;
	}

	Some(format!("{IMAGE_PREFIX}/{file_name}"))
}
