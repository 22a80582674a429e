use crate::constants::{DEFAULT_DB_POOL_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS};
use std::{env, str::FromStr, time::Duration};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
	Postgres,
	Memory,
}

impl FromStr for StoreBackend {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"postgres" => Ok(StoreBackend::Postgres),
			"memory" => Ok(StoreBackend::Memory),
			_ => Err(()),
		}
	}
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
	#[error("{0} must be set")]
	Missing(&'static str),
	#[error("{key} has an invalid value: {value}")]
	Invalid { key: &'static str, value: String },
}

/// Process-wide settings, built once in `main` and handed to whoever needs them.
#[derive(Debug, Clone)]
pub struct Config {
	pub store_backend: StoreBackend,
	/// Empty when running on the in-memory store.
	pub database_url: String,
	pub socket_url: String,
	pub jwt_secret: String,
	pub payment_server_key: String,
	pub request_timeout: Duration,
	pub db_pool_size: u32,
	pub bcrypt_cost: u32,
}

impl Config {
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Builds the config from an arbitrary key lookup so tests don't touch the process env.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let required = |key: &'static str| -> Result<String, ConfigError> {
			lookup(key).filter(|v| !v.trim().is_empty()).ok_or(ConfigError::Missing(key))
		};

		let timeout_secs: u64 =
			parse_or(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
		let db_pool_size: u32 = parse_or(&lookup, "DB_POOL_SIZE", DEFAULT_DB_POOL_SIZE)?;
		let bcrypt_cost: u32 = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
		if !(4..=31).contains(&bcrypt_cost) {
			return Err(ConfigError::Invalid { key: "BCRYPT_COST", value: bcrypt_cost.to_string() });
		}

		let store_backend: StoreBackend =
			parse_or(&lookup, "STORE_BACKEND", StoreBackend::Postgres)?;
		let database_url = match store_backend {
			StoreBackend::Postgres => required("DATABASE_URL")?,
			StoreBackend::Memory => lookup("DATABASE_URL").unwrap_or_default(),
		};

		Ok(Self {
			store_backend,
			database_url,
			socket_url: lookup("SOCKET_URL").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
			jwt_secret: required("JWT_SECRET")?,
			payment_server_key: required("PAYMENT_SERVER_KEY")?,
			request_timeout: Duration::from_secs(timeout_secs),
			db_pool_size,
			bcrypt_cost,
		})
	}
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
	F: Fn(&str) -> Option<String>,
	T: FromStr,
{
	match lookup(key) {
		Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid { key, value: raw }),
		None => Ok(default),
	}
}
