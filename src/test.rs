use std::{io::Cursor, net::IpAddr, sync::Arc};

pub use axum::http::{header, HeaderValue, StatusCode};
pub use axum_test::TestServer;
pub use serde_json::{json, Value};

use image::{DynamicImage, ImageOutputFormat, RgbaImage};

use crate::{
	config::{Config, DEFAULT_LISTING_PATH, DEFAULT_MAX_UPLOAD_BYTES},
	route::auth::model::CurrentUser,
	store::{
		self,
		memory::{MemoryAuthProvider, MemoryBlobStore, MemoryDocumentStore},
		Document,
	},
	AppState,
};

pub const PUBLIC_URL: &str = "http://localhost:3000";

pub fn config() -> Config {
	Config {
		host: IpAddr::from([127, 0, 0, 1]),
		port: 3000,
		database_url: String::new(),
		public_url: PUBLIC_URL.into(),
		listing_path: DEFAULT_LISTING_PATH.into(),
		max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
		otlp_endpoint: None,
	}
}

/// In-memory backends, shared with the server under test so that tests
/// can arrange and inspect them.
pub struct Fixture {
	pub documents: Arc<MemoryDocumentStore>,
	pub blobs: Arc<MemoryBlobStore>,
	pub auth: Arc<MemoryAuthProvider>,
}

impl Fixture {
	pub fn new() -> Self {
		Self {
			documents: Arc::default(),
			blobs: Arc::new(MemoryBlobStore::new(PUBLIC_URL)),
			auth: Arc::default(),
		}
	}

	pub fn server(&self) -> TestServer {
		self.server_with(self.documents.clone())
	}

	/// Starts a server that reads posts from `documents` instead of the
	/// fixture's own store.
	pub fn server_with(&self, documents: store::Documents) -> TestServer {
		self.server_with_stores(documents, self.blobs.clone())
	}

	/// Starts a server that stores uploads in `blobs` instead of the
	/// fixture's own store.
	pub fn server_with_blobs(&self, blobs: store::Blobs) -> TestServer {
		self.server_with_stores(self.documents.clone(), blobs)
	}

	fn server_with_stores(&self, documents: store::Documents, blobs: store::Blobs) -> TestServer {
		let state = AppState {
			documents,
			blobs,
			auth: self.auth.clone(),
			config: Arc::new(config()),
		};

		TestServer::new(crate::app(state)).unwrap()
	}

	pub async fn insert_post(&self, id: &str, post: Value) {
		self.documents.insert("posts", id, document(post)).await;
	}

	/// Creates a session for a user with `display_name`, returning the
	/// value of an `Authorization` header for it.
	pub async fn login(&self, display_name: &str) -> HeaderValue {
		let token = format!("token-{display_name}");

		self.auth
			.insert(
				&token,
				CurrentUser {
					id: format!("uid-{display_name}"),
					display_name: display_name.into(),
				},
			)
			.await;

		HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
	}
}

pub fn document(value: Value) -> Document {
	let Value::Object(document) = value else {
		panic!("documents must be objects");
	};

	document
}

/// Encodes a blank PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
	let mut buffer = Cursor::new(Vec::new());

	DynamicImage::ImageRgba8(RgbaImage::new(width, height))
		.write_to(&mut buffer, ImageOutputFormat::Png)
		.unwrap();

	buffer.into_inner()
}
