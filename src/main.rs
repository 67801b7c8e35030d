#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod media;
mod openapi;
mod ratelimit;
mod route;
mod store;
#[cfg(test)]
mod test;
mod text;
mod trace;

use std::{net::SocketAddr, sync::Arc};

use aide::{
	axum::{routing::get_with, ApiRouter},
	openapi::OpenApi,
};
use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

use config::Config;

pub type Database = sqlx::Pool<sqlx::Postgres>;
pub type AppState = State;

/// The shared application state.
///
/// The stores are trait objects so that the service can run against
/// any backend that implements them.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub documents: store::Documents,
	pub blobs: store::Blobs,
	pub auth: store::Auth,
	pub config: Arc<Config>,
}

/// Builds the application router, without the rate limiting layer.
pub fn app(state: AppState) -> Router {
	let mut api = OpenApi::default();

	ApiRouter::new()
		.nest("/posts", route::post::routes())
		.nest("/images", route::image::routes(state.config.max_upload_bytes))
		.nest("/blobs", route::blob::routes())
		.nest("/auth", route::auth::routes())
		.nest("/docs", route::docs::routes())
		.api_route("/health", get_with(route::health, route::health_docs))
		.finish_api_with(&mut api, openapi::docs)
		.layer(Extension(Arc::new(api)))
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
				.layer(TraceLayer::new_for_http())
				.layer(PropagateRequestIdLayer::x_request_id())
				.layer(CompressionLayer::new())
				.layer(CorsLayer::permissive()),
		)
		.with_state(state)
}

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();

	let config = Config::from_env().expect("invalid configuration");
	let _guard = trace::init_tracing_subscriber(config.otlp_endpoint.as_deref())
		.expect("failed to initialize tracing");

	let database = Database::connect(&config.database_url)
		.await
		.expect("failed to connect to database");

	sqlx::migrate!()
		.run(&database)
		.await
		.expect("failed to run migrations");

	let store = Arc::new(store::PgStore::new(database, config.public_url.clone()));
	let address = SocketAddr::from((config.host, config.port));

	let state = State {
		documents: store.clone(),
		blobs: store.clone(),
		auth: store,
		config: Arc::new(config),
	};

	let governor = ratelimit::public();
	ratelimit::cleanup_old_limits(&governor);

	let router = app(state).layer(GovernorLayer { config: governor });

	let listener = tokio::net::TcpListener::bind(address)
		.await
		.expect("failed to bind to address");

	tracing::info!("listening on {}", address);

	axum::serve(
		listener,
		router.into_make_service_with_connect_info::<SocketAddr>(),
	)
	.await
	.expect("server error");
}
