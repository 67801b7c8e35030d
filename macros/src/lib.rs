mod route;

use proc_macro::TokenStream;

/// Generates an `aide` documentation function for a route handler, named after the
/// handler with the suffix `_docs`.
///
/// The first line of the handler's doc comment becomes the operation summary, and
/// the remaining lines (if any) become its description.
///
/// ```ignore
/// /// Get post
/// /// Returns a single post.
/// #[route(
///     tag = tag::POST,
///     response(status = 404, shape = "error::ErrorBody", description = "No such post"),
/// )]
/// pub async fn get_post() {}
/// ```
#[proc_macro_attribute]
pub fn route(args: TokenStream, input: TokenStream) -> TokenStream {
	route::expand(args.into(), input.into())
		.unwrap_or_else(syn::Error::into_compile_error)
		.into()
}
