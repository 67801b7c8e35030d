//! Backends for the managed services a post view depends on: a schema-less
//! document store, a blob store that hands out download URLs, and the
//! authentication context that resolves session tokens into users.

#[cfg(test)]
pub mod memory;
mod postgres;

use std::sync::Arc;

use axum::{body::Bytes, http::StatusCode};

use crate::{
	error::{ErrorShape, Message},
	route::auth::model::CurrentUser,
};

pub use postgres::PgStore;

/// A schema-less record, as stored in a collection.
pub type Document = serde_json::Map<String, serde_json::Value>;

pub type Documents = Arc<dyn DocumentStore>;
pub type Blobs = Arc<dyn BlobStore>;
pub type Auth = Arc<dyn AuthProvider>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("object does not exist: {0}")]
	ObjectNotFound(String),
}

impl ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::Database(..) => StatusCode::BAD_GATEWAY,
			Self::ObjectNotFound(..) => StatusCode::NOT_FOUND,
		}
	}

	fn into_errors(self) -> Vec<Message<'static>> {
		match self {
			Self::Database(..) => Message::new("the backing store is unavailable").into_vec(),
			Self::ObjectNotFound(path) => Message::new("unknown_object")
				.detail("path", path)
				.into_vec(),
		}
	}
}

/// Records addressed by collection and identifier.
#[axum::async_trait]
pub trait DocumentStore: Send + Sync {
	/// Returns the record, or `None` if nothing is stored under `id`.
	async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, Error>;

	/// Removes the record. Returns `false` if nothing was stored under `id`.
	async fn delete(&self, collection: &str, id: &str) -> Result<bool, Error>;
}

/// A stored binary object.
#[derive(Debug, Clone)]
pub struct Object {
	pub content_type: String,
	pub data: Bytes,
}

/// Binary objects addressed by path.
#[axum::async_trait]
pub trait BlobStore: Send + Sync {
	/// Stores `data` under `path`, replacing any existing object.
	async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> Result<(), Error>;

	/// Returns a URL the object can be downloaded from.
	///
	/// Fails with [`Error::ObjectNotFound`] if no object exists at `path`.
	async fn download_url(&self, path: &str) -> Result<String, Error>;

	async fn download(&self, path: &str) -> Result<Object, Error>;
}

/// The authentication context.
#[axum::async_trait]
pub trait AuthProvider: Send + Sync {
	/// Resolves a session token into the user it belongs to.
	async fn user_for_token(&self, token: &str) -> Result<Option<CurrentUser>, Error>;
}

/// Builds the public download URL of an object, percent-encoding each
/// segment of its path.
pub fn object_url(base_url: &str, path: &str) -> String {
	let path = path
		.split('/')
		.map(urlencoding::encode)
		.collect::<Vec<_>>()
		.join("/");

	format!("{}/blobs/{path}", base_url.trim_end_matches('/'))
}
