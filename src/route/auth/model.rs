use schemars::JsonSchema;
use serde::Serialize;

/// The user viewing a post, as resolved by the authentication context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema, sqlx::FromRow)]
pub struct CurrentUser {
	/// The unique identifier of the user.
	pub id: String,
	/// The name displayed next to the user's posts.
	pub display_name: String,
}
