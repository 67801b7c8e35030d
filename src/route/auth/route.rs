use macros::route;

use crate::{
	extract::{Json, Session},
	openapi::tag,
};

use super::model;

/// Get user
/// Returns the user the session or bearer token belongs to.
#[route(tag = tag::AUTH)]
pub async fn get_me(session: Session) -> Json<model::CurrentUser> {
	Json(session.user)
}
