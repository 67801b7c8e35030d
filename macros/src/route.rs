use darling::{ast::NestedMeta, FromMeta};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

#[derive(FromMeta)]
struct RouteArgs {
	#[darling(multiple)]
	tag: Vec<syn::Expr>,
	#[darling(multiple)]
	response: Vec<ResponseArgs>,
}

/// An additional documented response, such as an error status.
#[derive(FromMeta)]
struct ResponseArgs {
	status: syn::LitInt,
	/// The body type, given as a string such as `"error::ErrorBody"`.
	shape: syn::Type,
	description: Option<String>,
}

impl ResponseArgs {
	fn to_tokens(&self) -> TokenStream {
		let status = &self.status;
		let shape = &self.shape;

		match &self.description {
			Some(description) => quote! {
				.response_with::<#status, #shape, _>(|res| res.description(#description))
			},
			None => quote! {
				.response::<#status, #shape>()
			},
		}
	}
}

pub fn expand(args: TokenStream, input: TokenStream) -> syn::Result<TokenStream> {
	let args = NestedMeta::parse_meta_list(args)?;
	let args = match RouteArgs::from_list(&args) {
		Ok(args) => args,
		Err(error) => return Ok(error.write_errors()),
	};
	let function: syn::ItemFn = syn::parse2(input)?;

	let Some((summary, description)) = doc_comment(&function.attrs) else {
		return Err(syn::Error::new_spanned(
			&function.sig.ident,
			"route handlers need a doc comment; its first line is used as the summary",
		));
	};

	let docs = format_ident!("{}_docs", function.sig.ident);
	let vis = &function.vis;
	let tags = &args.tag;
	let responses = args.response.iter().map(ResponseArgs::to_tokens);
	let description = description.map(|description| quote!(.description(#description)));

	Ok(quote! {
		#function

		#vis fn #docs(op: aide::transform::TransformOperation) -> aide::transform::TransformOperation {
			op.summary(#summary)
				#description
				#(.tag(#tags))*
				#(#responses)*
		}
	})
}

/// Splits a doc comment into its first line and the rest.
fn doc_comment(attrs: &[syn::Attribute]) -> Option<(String, Option<String>)> {
	let lines = attrs
		.iter()
		.filter(|attr| attr.path().is_ident("doc"))
		.filter_map(|attr| match &attr.meta {
			syn::Meta::NameValue(syn::MetaNameValue {
				value: syn::Expr::Lit(syn::ExprLit {
					lit: syn::Lit::Str(line),
					..
				}),
				..
			}) => Some(line.value().trim().to_string()),
			_ => None,
		})
		.collect::<Vec<_>>();

	let mut lines = lines.iter().skip_while(|line| line.is_empty());
	let summary = lines.next()?.clone();
	let description = lines
		.map(String::as_str)
		.collect::<Vec<_>>()
		.join("\n")
		.trim()
		.to_string();

	Some((summary, (!description.is_empty()).then_some(description)))
}
