use std::{env, net::IpAddr, str::FromStr};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("{0} must be set")]
	Missing(&'static str),
	#[error("{name} is invalid: {value:?}")]
	Invalid { name: &'static str, value: String },
}

/// Service configuration, read from the environment (and a `.env` file,
/// if one exists).
#[derive(Debug, Clone)]
pub struct Config {
	pub host: IpAddr,
	pub port: u16,
	pub database_url: String,
	/// The externally reachable base URL of the service, used to build
	/// blob download URLs.
	pub public_url: String,
	/// Where clients are sent after deleting a post.
	pub listing_path: String,
	pub max_upload_bytes: usize,
	pub otlp_endpoint: Option<String>,
}

pub const DEFAULT_LISTING_PATH: &str = "/bow";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

fn var(name: &'static str) -> Option<String> {
	env::var(name).ok().filter(|value| !value.is_empty())
}

fn parse<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
	var(name).map_or(Ok(default), |value| {
		value
			.parse()
			.map_err(|_| ConfigError::Invalid { name, value })
	})
}

impl Config {
	pub fn from_env() -> Result<Self, ConfigError> {
		let port = parse("PORT", 3000)?;
		let listing_path = var("LISTING_PATH").unwrap_or_else(|| DEFAULT_LISTING_PATH.into());

		if !listing_path.starts_with('/') {
			return Err(ConfigError::Invalid {
				name: "LISTING_PATH",
				value: listing_path,
			});
		}

		Ok(Self {
			host: parse("HOST", IpAddr::from([127, 0, 0, 1]))?,
			port,
			database_url: var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
			public_url: var("PUBLIC_URL").unwrap_or_else(|| format!("http://localhost:{port}")),
			listing_path,
			max_upload_bytes: parse("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
			otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
		})
	}
}
