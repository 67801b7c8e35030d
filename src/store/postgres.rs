use axum::body::Bytes;
use serde_json::Value;
use sqlx::types::Json;
use uuid::Uuid;

use crate::{route::auth::model::CurrentUser, Database};

use super::{AuthProvider, BlobStore, Document, DocumentStore, Error, Object};

/// Document, blob and session storage backed by a single Postgres pool.
#[derive(Clone)]
pub struct PgStore {
	database: Database,
	public_url: String,
}

impl PgStore {
	pub fn new(database: Database, public_url: impl Into<String>) -> Self {
		Self {
			database,
			public_url: public_url.into(),
		}
	}
}

/// Treats stored data that is not a JSON object as an empty document, so
/// that its fields decode as blank.
fn into_document(data: Value) -> Document {
	match data {
		Value::Object(document) => document,
		_ => Document::new(),
	}
}

#[axum::async_trait]
impl DocumentStore for PgStore {
	async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, Error> {
		let document = sqlx::query_scalar::<_, Json<Value>>(
			r#"
				SELECT data FROM document
				WHERE collection = $1 AND id = $2
			"#,
		)
		.bind(collection)
		.bind(id)
		.fetch_optional(&self.database)
		.await?;

		Ok(document.map(|Json(data)| into_document(data)))
	}

	async fn delete(&self, collection: &str, id: &str) -> Result<bool, Error> {
		let status = sqlx::query(
			r#"
				DELETE FROM document
				WHERE collection = $1 AND id = $2
			"#,
		)
		.bind(collection)
		.bind(id)
		.execute(&self.database)
		.await?;

		Ok(status.rows_affected() > 0)
	}
}

#[axum::async_trait]
impl BlobStore for PgStore {
	async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> Result<(), Error> {
		sqlx::query(
			r#"
				INSERT INTO blob (path, content_type, data)
				VALUES ($1, $2, $3)
				ON CONFLICT (path) DO UPDATE
				SET content_type = EXCLUDED.content_type, data = EXCLUDED.data
			"#,
		)
		.bind(path)
		.bind(content_type)
		.bind(data.as_ref())
		.execute(&self.database)
		.await?;

		Ok(())
	}

	async fn download_url(&self, path: &str) -> Result<String, Error> {
		let exists = sqlx::query_scalar::<_, bool>(
			r#"
				SELECT EXISTS (SELECT 1 FROM blob WHERE path = $1)
			"#,
		)
		.bind(path)
		.fetch_one(&self.database)
		.await?;

		if !exists {
			return Err(Error::ObjectNotFound(path.to_string()));
		}

		Ok(super::object_url(&self.public_url, path))
	}

	async fn download(&self, path: &str) -> Result<Object, Error> {
		let object = sqlx::query_as::<_, (String, Vec<u8>)>(
			r#"
				SELECT content_type, data FROM blob
				WHERE path = $1
			"#,
		)
		.bind(path)
		.fetch_optional(&self.database)
		.await?;

		let (content_type, data) = object.ok_or_else(|| Error::ObjectNotFound(path.to_string()))?;

		Ok(Object {
			content_type,
			data: data.into(),
		})
	}
}

#[axum::async_trait]
impl AuthProvider for PgStore {
	async fn user_for_token(&self, token: &str) -> Result<Option<CurrentUser>, Error> {
		// Session ids are UUIDs, anything else cannot match a row
		let Ok(session_id) = Uuid::parse_str(token) else {
			return Ok(None);
		};

		let user = sqlx::query_as::<_, CurrentUser>(
			r#"
				SELECT id::text AS id, display_name FROM "user" WHERE id = (
					SELECT user_id FROM session WHERE id = $1
				)
			"#,
		)
		.bind(session_id)
		.fetch_optional(&self.database)
		.await?;

		Ok(user)
	}
}
