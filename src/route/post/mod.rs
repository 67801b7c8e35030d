use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;
pub mod viewer;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(String),
	#[error("post {0} does not belong to the current user")]
	NotAuthor(String),
}

pub type RouteError = error::RouteError<Error>;

impl From<Error> for RouteError {
	fn from(error: Error) -> Self {
		Self::Route(error)
	}
}

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new().api_route(
		"/:id",
		get_with(get_post, get_post_docs).delete_with(delete_post, delete_post_docs),
	)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
			Self::NotAuthor(..) => StatusCode::FORBIDDEN,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownPost(post) => error::Message::new("unknown_post")
				.detail("post", post)
				.into_vec(),
			Self::NotAuthor(post) => error::Message::new("not_author")
				.detail("post", post)
				.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use std::sync::{
		atomic::{AtomicUsize, Ordering},
		Arc,
	};

	use axum::body::Bytes;

	use super::model::{DeleteOutcome, PostView};
	use crate::{
		extract::COOKIE_NAME,
		store::{self, memory::MemoryDocumentStore, BlobStore, Document, DocumentStore},
		test::*,
	};

	/// Counts the deletes passed through to the fixture's store.
	struct CountingStore {
		inner: Arc<MemoryDocumentStore>,
		deletes: AtomicUsize,
	}

	#[axum::async_trait]
	impl DocumentStore for CountingStore {
		async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, store::Error> {
			self.inner.get(collection, id).await
		}

		async fn delete(&self, collection: &str, id: &str) -> Result<bool, store::Error> {
			self.deletes.fetch_add(1, Ordering::SeqCst);
			self.inner.delete(collection, id).await
		}
	}

	/// A store whose backend is unreachable.
	struct FailingStore;

	#[axum::async_trait]
	impl DocumentStore for FailingStore {
		async fn get(&self, _: &str, _: &str) -> Result<Option<Document>, store::Error> {
			Err(sqlx::Error::PoolTimedOut.into())
		}

		async fn delete(&self, _: &str, _: &str) -> Result<bool, store::Error> {
			Err(sqlx::Error::PoolTimedOut.into())
		}
	}

	async fn fixture_with_post() -> Fixture {
		let fixture = Fixture::new();

		fixture
			.insert_post(
				"abc",
				json!({
					"title": "First post",
					"date": "2024-03-01 12:00",
					"author": "alice",
					"content": "<p>Hello <b>world</b></p>",
				}),
			)
			.await;

		fixture
	}

	#[tokio::test]
	async fn test_view_post() {
		let fixture = fixture_with_post().await;
		let response = fixture.server().get("/posts/abc").await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let view = response.json::<PostView>();

		assert_eq!(view.id, "abc");
		assert_eq!(view.title, "First post");
		assert_eq!(view.date, "2024-03-01 12:00");
		assert_eq!(view.author, "alice");
		assert_eq!(view.content, "Hello world");
		assert!(!view.can_delete);
	}

	#[tokio::test]
	async fn test_delete_allowed_for_author_only() {
		let fixture = fixture_with_post().await;
		let server = fixture.server();

		let alice = fixture.login("alice").await;
		let bob = fixture.login("bob").await;

		let response = server
			.get("/posts/abc")
			.add_header(header::AUTHORIZATION, alice)
			.await;

		assert!(response.json::<PostView>().can_delete);

		let response = server
			.get("/posts/abc")
			.add_header(header::AUTHORIZATION, bob)
			.await;

		assert!(!response.json::<PostView>().can_delete);
	}

	#[tokio::test]
	async fn test_view_without_image() {
		let fixture = fixture_with_post().await;
		let response = fixture.server().get("/posts/abc").await;

		assert!(response.json::<Value>().get("image_url").is_none());
	}

	#[tokio::test]
	async fn test_view_with_image_url() {
		let fixture = Fixture::new();

		fixture
			.insert_post("abc", json!({ "author": "alice", "url": "https://x/y.jpg" }))
			.await;

		let view = fixture.server().get("/posts/abc").await.json::<PostView>();

		assert_eq!(view.image_url.as_deref(), Some("https://x/y.jpg"));
	}

	#[tokio::test]
	async fn test_view_resolves_image_path() {
		let fixture = Fixture::new();

		fixture
			.blobs
			.upload("images/cat.png", Bytes::from(png(2, 2)), "image/png")
			.await
			.unwrap();

		fixture
			.insert_post("abc", json!({ "author": "alice", "imagePath": "images/cat.png" }))
			.await;

		let view = fixture.server().get("/posts/abc").await.json::<PostView>();

		assert_eq!(
			view.image_url.as_deref(),
			Some("http://localhost:3000/blobs/images/cat.png")
		);
	}

	#[tokio::test]
	async fn test_unresolvable_image_is_omitted() {
		let fixture = Fixture::new();

		fixture
			.insert_post("abc", json!({ "author": "alice", "imagePath": "images/gone.png" }))
			.await;

		let response = fixture.server().get("/posts/abc").await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert!(response.json::<PostView>().image_url.is_none());
	}

	#[tokio::test]
	async fn test_unknown_post_is_not_found() {
		let fixture = Fixture::new();
		let response = fixture.server().get("/posts/missing").await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

		let body = response.json::<Value>();

		assert_eq!(body["success"], false);
		assert_eq!(body["errors"][0]["content"], "unknown_post");
		assert_eq!(body["errors"][0]["details"]["post"], "missing");
	}

	#[tokio::test]
	async fn test_store_failure_is_distinct_from_not_found() {
		let fixture = Fixture::new();
		let response = fixture
			.server_with(Arc::new(FailingStore))
			.get("/posts/abc")
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
	}

	#[tokio::test]
	async fn test_expired_session_views_anonymously() {
		let fixture = fixture_with_post().await;
		let response = fixture
			.server()
			.get("/posts/abc")
			.add_cookie(cookie::Cookie::new(COOKIE_NAME, "expired-token"))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let view = response.json::<PostView>();

		assert_eq!(view.title, "First post");
		assert!(!view.can_delete);
	}

	#[tokio::test]
	async fn test_malformed_authorization_is_rejected() {
		let fixture = fixture_with_post().await;
		let response = fixture
			.server()
			.get("/posts/abc")
			.add_header(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"))
			.await;

		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
	}

	#[tokio::test]
	async fn test_delete_with_expired_session() {
		let fixture = fixture_with_post().await;
		let response = fixture
			.server()
			.delete("/posts/abc")
			.add_cookie(cookie::Cookie::new(COOKIE_NAME, "expired-token"))
			.await;

		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
		assert!(fixture.documents.contains("posts", "abc").await);
	}

	#[tokio::test]
	async fn test_delete_post() {
		let fixture = fixture_with_post().await;
		let store = Arc::new(CountingStore {
			inner: fixture.documents.clone(),
			deletes: AtomicUsize::new(0),
		});

		let server = fixture.server_with(store.clone());
		let alice = fixture.login("alice").await;

		let response = server
			.delete("/posts/abc")
			.add_header(header::AUTHORIZATION, alice)
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let outcome = response.json::<DeleteOutcome>();

		assert_eq!(outcome.redirect, "/bow");
		assert!(!outcome.notice.is_empty());
		assert_eq!(store.deletes.load(Ordering::SeqCst), 1);
		assert!(!fixture.documents.contains("posts", "abc").await);

		let response = server.get("/posts/abc").await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
	}

	#[tokio::test]
	async fn test_delete_by_other_user_is_forbidden() {
		let fixture = fixture_with_post().await;
		let bob = fixture.login("bob").await;

		let response = fixture
			.server()
			.delete("/posts/abc")
			.add_header(header::AUTHORIZATION, bob)
			.await;

		assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "not_author");
		assert!(fixture.documents.contains("posts", "abc").await);
	}

	#[tokio::test]
	async fn test_delete_requires_session() {
		let fixture = fixture_with_post().await;
		let response = fixture.server().delete("/posts/abc").await;

		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
		assert!(fixture.documents.contains("posts", "abc").await);
	}

	#[tokio::test]
	async fn test_delete_unknown_post() {
		let fixture = Fixture::new();
		let alice = fixture.login("alice").await;

		let response = fixture
			.server()
			.delete("/posts/missing")
			.add_header(header::AUTHORIZATION, alice)
			.await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
	}

	#[tokio::test]
	async fn test_delete_store_failure() {
		let fixture = Fixture::new();
		let alice = fixture.login("alice").await;

		let response = fixture
			.server_with(Arc::new(FailingStore))
			.delete("/posts/abc")
			.add_header(header::AUTHORIZATION, alice)
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
	}
}
