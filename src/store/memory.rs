use std::collections::HashMap;

use axum::body::Bytes;
use tokio::sync::RwLock;

use crate::route::auth::model::CurrentUser;

use super::{AuthProvider, BlobStore, Document, DocumentStore, Error, Object};

#[derive(Default)]
pub struct MemoryDocumentStore {
	collections: RwLock<HashMap<String, HashMap<String, Document>>>,
}

impl MemoryDocumentStore {
	pub async fn insert(&self, collection: &str, id: &str, document: Document) {
		self.collections
			.write()
			.await
			.entry(collection.to_string())
			.or_default()
			.insert(id.to_string(), document);
	}

	pub async fn contains(&self, collection: &str, id: &str) -> bool {
		self.collections
			.read()
			.await
			.get(collection)
			.is_some_and(|documents| documents.contains_key(id))
	}
}

#[axum::async_trait]
impl DocumentStore for MemoryDocumentStore {
	async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, Error> {
		Ok(self
			.collections
			.read()
			.await
			.get(collection)
			.and_then(|documents| documents.get(id))
			.cloned())
	}

	async fn delete(&self, collection: &str, id: &str) -> Result<bool, Error> {
		Ok(self
			.collections
			.write()
			.await
			.get_mut(collection)
			.and_then(|documents| documents.remove(id))
			.is_some())
	}
}

pub struct MemoryBlobStore {
	base_url: String,
	objects: RwLock<HashMap<String, Object>>,
}

impl MemoryBlobStore {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
			objects: RwLock::default(),
		}
	}
}

#[axum::async_trait]
impl BlobStore for MemoryBlobStore {
	async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> Result<(), Error> {
		self.objects.write().await.insert(
			path.to_string(),
			Object {
				content_type: content_type.to_string(),
				data,
			},
		);

		Ok(())
	}

	async fn download_url(&self, path: &str) -> Result<String, Error> {
		if !self.objects.read().await.contains_key(path) {
			return Err(Error::ObjectNotFound(path.to_string()));
		}

		Ok(super::object_url(&self.base_url, path))
	}

	async fn download(&self, path: &str) -> Result<Object, Error> {
		self.objects
			.read()
			.await
			.get(path)
			.cloned()
			.ok_or_else(|| Error::ObjectNotFound(path.to_string()))
	}
}

#[derive(Default)]
pub struct MemoryAuthProvider {
	sessions: RwLock<HashMap<String, CurrentUser>>,
}

impl MemoryAuthProvider {
	pub async fn insert(&self, token: &str, user: CurrentUser) {
		self.sessions.write().await.insert(token.to_string(), user);
	}
}

#[axum::async_trait]
impl AuthProvider for MemoryAuthProvider {
	async fn user_for_token(&self, token: &str) -> Result<Option<CurrentUser>, Error> {
		Ok(self.sessions.read().await.get(token).cloned())
	}
}
