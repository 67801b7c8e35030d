pub mod auth;
pub mod blob;
pub mod docs;
pub mod image;
pub mod post;

use macros::route;

/// Health check
/// Returns `ok` while the service is running.
#[route]
pub async fn health() -> &'static str {
	"ok"
}
