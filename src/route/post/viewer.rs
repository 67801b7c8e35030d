use crate::{
	route::auth::model::CurrentUser,
	store::{BlobStore, DocumentStore},
	text,
};

use super::{
	model::{ImageRef, Post, PostView, COLLECTION},
	Error, RouteError,
};

/// Loads posts for display and deletes them on behalf of their authors.
///
/// Every operation runs inside the request that needs it, so a client
/// that goes away cancels whatever store call is still in flight.
pub struct PostViewer<'a> {
	documents: &'a dyn DocumentStore,
	blobs: &'a dyn BlobStore,
}

impl<'a> PostViewer<'a> {
	pub fn new(documents: &'a dyn DocumentStore, blobs: &'a dyn BlobStore) -> Self {
		Self { documents, blobs }
	}

	/// Fetches a post by its unique id.
	pub async fn fetch(&self, id: &str) -> Result<Post, RouteError> {
		let document = self
			.documents
			.get(COLLECTION, id)
			.await
			.map_err(|error| {
				tracing::error!(post = id, %error, "failed to fetch post");
				error
			})?;

		let Some(document) = document else {
			tracing::info!(post = id, "post does not exist");
			return Err(Error::UnknownPost(id.to_string()).into());
		};

		Ok(Post::from_document(id, &document))
	}

	/// Resolves the download URL of the post's image.
	///
	/// A failed resolution is logged and treated as the post having no image.
	pub async fn resolve_image(&self, post: &Post) -> Option<String> {
		match post.image.as_ref()? {
			ImageRef::Url(url) => Some(url.clone()),
			ImageRef::Path(path) => match self.blobs.download_url(path).await {
				Ok(url) => Some(url),
				Err(error) => {
					tracing::warn!(post = %post.id, %path, %error, "failed to resolve image");
					None
				}
			},
		}
	}

	/// Fetches a post and prepares it for display to `viewer`.
	pub async fn view(&self, id: &str, viewer: Option<&CurrentUser>) -> Result<PostView, RouteError> {
		let post = self.fetch(id).await?;
		let image_url = self.resolve_image(&post).await;

		Ok(render(post, image_url, viewer))
	}

	/// Deletes a post, provided `user` is its author.
	pub async fn delete(&self, id: &str, user: &CurrentUser) -> Result<(), RouteError> {
		let post = self.fetch(id).await?;

		if !post.is_deletable_by(Some(user)) {
			return Err(Error::NotAuthor(post.id).into());
		}

		let deleted = self
			.documents
			.delete(COLLECTION, id)
			.await
			.map_err(|error| {
				tracing::error!(post = id, %error, "failed to delete post");
				error
			})?;

		// Deleted by someone else since it was fetched
		if !deleted {
			return Err(Error::UnknownPost(post.id).into());
		}

		tracing::info!(post = id, author = %post.author, "post deleted");

		Ok(())
	}
}

/// Builds the view of a post, stripping the markup from its content.
pub fn render(post: Post, image_url: Option<String>, viewer: Option<&CurrentUser>) -> PostView {
	let can_delete = post.is_deletable_by(viewer);

	PostView {
		content: text::strip_tags(&post.content),
		id: post.id,
		title: post.title,
		date: post.date,
		author: post.author,
		image_url,
		can_delete,
	}
}
