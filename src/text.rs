//! Plain-text extraction from post markup.
//!
//! Tags are dropped and the text between them is kept, with a few rules:
//!
//! - block-level elements and `<br>` separate the text on either side,
//!   inline elements do not (`a<b>b</b>` is `ab`)
//! - the bodies of `<script>` and `<style>` are dropped, as are comments
//! - character references (`&amp;`, `&#39;`, `&#x27;`, ...) are decoded
//! - every run of whitespace becomes a single space, and the result is trimmed

/// Elements after which text should not run into the next word.
const BLOCK_ELEMENTS: &[&str] = &[
	"address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
	"figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
	"ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Elements whose content is not text.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

enum Markup<'a> {
	Tag { name: &'a str, closing: bool },
	Other,
}

/// Removes all markup from `html`, returning the text it contains.
pub fn strip_tags(html: &str) -> String {
	let mut text = String::with_capacity(html.len());
	let mut rest = html;

	while let Some(start) = rest.find(|c: char| c == '<' || c == '&') {
		text.push_str(&rest[..start]);
		rest = &rest[start..];

		if rest.starts_with('&') {
			if let Some((decoded, length)) = decode_reference(rest) {
				text.push(decoded);
				rest = &rest[length..];
			} else {
				text.push('&');
				rest = &rest[1..];
			}

			continue;
		}

		let Some((markup, length)) = parse_markup(rest) else {
			// A `<` that does not start a tag is text
			text.push('<');
			rest = &rest[1..];
			continue;
		};

		rest = &rest[length..];

		if let Markup::Tag { name, closing } = markup {
			if BLOCK_ELEMENTS.iter().any(|block| name.eq_ignore_ascii_case(block)) {
				text.push(' ');
			}

			if !closing && RAW_TEXT_ELEMENTS.iter().any(|raw| name.eq_ignore_ascii_case(raw)) {
				rest = skip_raw_text(rest, name);
			}
		}
	}

	text.push_str(rest);
	text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses the markup at the start of `input`, which begins with `<`.
///
/// Returns `None` if `input` does not start with markup.
fn parse_markup(input: &str) -> Option<(Markup<'_>, usize)> {
	let after = &input[1..];

	if let Some(comment) = after.strip_prefix("!--") {
		let length = comment
			.find("-->")
			.map_or(input.len(), |end| 4 + end + 3);

		return Some((Markup::Other, length));
	}

	if after.starts_with('!') || after.starts_with('?') {
		let length = after.find('>').map_or(input.len(), |end| end + 2);

		return Some((Markup::Other, length));
	}

	let (closing, body) = match after.strip_prefix('/') {
		Some(body) => (true, body),
		None => (false, after),
	};

	if !body.starts_with(|c: char| c.is_ascii_alphabetic()) {
		return None;
	}

	let name_length = body
		.find(|c: char| !c.is_ascii_alphanumeric() && c != '-')
		.unwrap_or(body.len());
	let name = &body[..name_length];

	// Find the closing `>`, ignoring any inside quoted attribute values
	let mut quote = None;
	let end = body[name_length..].char_indices().find_map(|(index, c)| {
		match (quote, c) {
			(None, '"' | '\'') => quote = Some(c),
			(Some(open), c) if c == open => quote = None,
			(None, '>') => return Some(index),
			_ => {}
		}

		None
	});

	let prefix = input.len() - body.len();
	let length = end.map_or(input.len(), |end| prefix + name_length + end + 1);

	Some((Markup::Tag { name, closing }, length))
}

/// Skips the content of a raw text element up to and including its end tag.
fn skip_raw_text<'a>(input: &'a str, name: &str) -> &'a str {
	let lowercase = input.to_ascii_lowercase();
	let end_tag = format!("</{}", name.to_ascii_lowercase());

	let Some(start) = lowercase.find(&end_tag) else {
		return "";
	};

	let rest = &input[start..];

	rest.find('>').map_or("", |end| &rest[end + 1..])
}

/// Decodes the character reference at the start of `input`, which begins with `&`.
///
/// Returns the decoded character and the length of the reference.
fn decode_reference(input: &str) -> Option<(char, usize)> {
	// The longest reference decoded here is `&#x10FFFF;`
	let end = input.get(..12).unwrap_or(input).find(';')?;
	let name = &input[1..end];

	let decoded = if let Some(number) = name.strip_prefix('#') {
		let code = match number.strip_prefix(|c: char| c == 'x' || c == 'X') {
			Some(hex) => u32::from_str_radix(hex, 16).ok()?,
			None => number.parse().ok()?,
		};

		// NUL, surrogates and out of range code points become U+FFFD
		char::from_u32(code)
			.filter(|&c| c != '\0')
			.unwrap_or(char::REPLACEMENT_CHARACTER)
	} else {
		match name {
			"amp" => '&',
			"lt" => '<',
			"gt" => '>',
			"quot" => '"',
			"apos" => '\'',
			"nbsp" => '\u{a0}',
			_ => return None,
		}
	};

	Some((decoded, end + 1))
}
