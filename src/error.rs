//! Relay-level error types shared across configuration, gateway, and signing stages.

// std
use std::path::PathBuf;
// crates.io
use axum::http::StatusCode;
// self
use crate::_prelude::*;

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical relay error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The gateway call failed or returned something unusable.
	#[error(transparent)]
	Downstream(#[from] DownstreamError),
	/// The issued token could not be signed.
	#[error(transparent)]
	Signing(#[from] SigningError),
}
impl Error {
	/// HTTP status the inbound route answers with for this error.
	pub fn status_code(&self) -> StatusCode {
		match self {
			Self::Config(_) => StatusCode::BAD_REQUEST,
			Self::Downstream(DownstreamError::InvalidEndpoint { .. }) | Self::Signing(_) =>
				StatusCode::INTERNAL_SERVER_ERROR,
			Self::Downstream(_) => StatusCode::BAD_GATEWAY,
		}
	}
}

/// Configuration failures, raised either while loading settings or when a request finds a
/// required value absent.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required setting is missing or empty.
	#[error("The '{key}' configuration value is not set.")]
	Missing {
		/// Name of the absent setting.
		key: &'static str,
	},
	/// Settings file could not be read.
	#[error("Settings file `{}` could not be read.", path.display())]
	SettingsRead {
		/// Path that failed to load.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Settings file is not valid JSON or has an unexpected shape.
	#[error("Settings file `{}` is malformed.", path.display())]
	SettingsParse {
		/// Path that failed to parse.
		path: PathBuf,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Failures of the outbound session-token exchange.
#[derive(Debug, ThisError)]
pub enum DownstreamError {
	/// Configured gateway URI does not parse.
	#[error("Gateway URI is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the gateway.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Gateway answered with a non-success status.
	#[error("Gateway returned HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Leading slice of the response body for diagnostics.
		body_preview: String,
	},
	/// Gateway body is not JSON or lacks a `token` string.
	#[error("Gateway returned a malformed session payload.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
}
impl DownstreamError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for DownstreamError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Failures while signing an issued token.
#[derive(Debug, ThisError)]
pub enum SigningError {
	/// Signing secret carries fewer bits than HS256 requires.
	#[error(
		"Signing key is {len} bytes; HS256 requires at least {min} bytes.",
		min = crate::token::MIN_KEY_LEN
	)]
	KeyTooShort {
		/// Length of the configured key in bytes.
		len: usize,
	},
	/// JWT encoder rejected the claims or key.
	#[error("Token could not be encoded.")]
	Encode(#[from] jsonwebtoken::errors::Error),
}
