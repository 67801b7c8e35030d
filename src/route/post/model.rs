use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::{route::auth::model::CurrentUser, store::Document};

/// The collection posts are stored in.
pub const COLLECTION: &str = "posts";

/// Where a post's image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
	/// A download URL that needs no resolution.
	Url(String),
	/// A blob store path that has to be resolved into a download URL.
	Path(String),
}

/// A single community post, as stored in the document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
	pub id: String,
	pub title: String,
	pub date: String,
	pub author: String,
	/// The content of the post, as HTML.
	pub content: String,
	pub image: Option<ImageRef>,
}

/// Reads a field as display text. Scalars are rendered as their JSON text,
/// anything else as an empty string.
fn text_field(document: &Document, key: &str) -> String {
	match document.get(key) {
		Some(Value::String(value)) => value.clone(),
		Some(value @ (Value::Number(..) | Value::Bool(..))) => value.to_string(),
		_ => String::new(),
	}
}

fn optional_text_field(document: &Document, key: &str) -> Option<String> {
	Some(text_field(document, key)).filter(|value| !value.is_empty())
}

impl Post {
	/// Decodes a post from its stored record.
	///
	/// Records are not validated, so missing or malformed fields become empty.
	/// A `url` takes precedence over the older `imagePath`.
	pub fn from_document(id: impl Into<String>, document: &Document) -> Self {
		let image = optional_text_field(document, "url")
			.map(ImageRef::Url)
			.or_else(|| optional_text_field(document, "imagePath").map(ImageRef::Path));

		Self {
			id: id.into(),
			title: text_field(document, "title"),
			date: text_field(document, "date"),
			author: text_field(document, "author"),
			content: text_field(document, "content"),
			image,
		}
	}

	/// Whether `viewer` may delete the post.
	///
	/// Authorship is decided by display name, compared exactly. A post with
	/// no author cannot be deleted by anyone.
	pub fn is_deletable_by(&self, viewer: Option<&CurrentUser>) -> bool {
		!self.author.is_empty() && viewer.is_some_and(|viewer| viewer.display_name == self.author)
	}
}

/// A post, prepared for display.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PostView {
	/// The unique identifier of the post.
	pub id: String,
	/// The title of the post.
	pub title: String,
	/// The date the post was written.
	pub date: String,
	/// The display name of the author.
	pub author: String,
	/// The content of the post as plain text, with all markup removed.
	pub content: String,
	/// A URL to the image attached to the post, if it has one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub image_url: Option<String>,
	/// Whether the viewer may delete the post.
	pub can_delete: bool,
}

/// The result of deleting a post.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteOutcome {
	/// A confirmation to show the user.
	pub notice: String,
	/// The location to navigate to, now that the post is gone.
	pub redirect: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	/// The unique identifier of the post.
	#[validate(length(min = 1, max = 1500))]
	pub id: String,
}
