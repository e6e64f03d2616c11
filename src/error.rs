//! Client-level error taxonomy shared across the executor, the credential layer, and the facade.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Terminal outcome of a failed logical call.
///
/// Every variant is actionable by the caller: the retryable subset is recovered locally by the
/// executor up to the configured budget, everything else surfaces immediately. Absence of data
/// is never encoded as an error and errors are never collapsed into empty results.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem (invalid URL, transport construction, body serialization).
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport-level failure (DNS, TCP, TLS, connection reset).
	#[error("Network error occurred while calling the service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The per-attempt timeout elapsed before a response arrived.
	#[error("Request timed out.")]
	Timeout,
	/// The service rejected the attempt with HTTP 429 or envelope code 429.
	#[error("Request was rate limited by the service.")]
	RateLimited {
		/// Server-provided `Retry-After` hint, when present.
		retry_after: Option<Duration>,
	},
	/// Credential was rejected (HTTP 401 or envelope code 401) or refresh failed.
	#[error("Request was not authorized by the service.")]
	Unauthorized,
	/// The service answered with a 5xx status.
	#[error("Service returned server error status {0}.")]
	ServerError(u16),
	/// The service answered with a non-retryable 4xx status.
	#[error("Service returned client error status {0}.")]
	ClientError(u16),
	/// A 2xx response carried an envelope whose `code` reports a service-level failure.
	#[error("Service reported error code {code}: {message}.")]
	Api {
		/// Envelope `code` field.
		code: i64,
		/// Envelope `message` field.
		message: String,
	},
	/// A successful response carried a body that did not match the expected shape.
	#[error("Response body did not match the expected shape.")]
	Decode {
		/// Structured parsing failure with the JSON path that diverged.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response, when available.
		status: Option<u16>,
	},
}
impl Error {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Classifies a failing HTTP status, returning `None` for everything else.
	///
	/// Only 4xx and 5xx statuses classify as errors. Informational and residual redirect
	/// responses fall through to envelope decoding like a 2xx, where a non-envelope body
	/// surfaces as [`Error::Decode`] carrying the status.
	pub fn from_status(status: u16, retry_after: Option<Duration>) -> Option<Self> {
		match status {
			401 => Some(Self::Unauthorized),
			429 => Some(Self::RateLimited { retry_after }),
			400..=499 => Some(Self::ClientError(status)),
			500..=599 => Some(Self::ServerError(status)),
			_ => None,
		}
	}

	/// Classifies a non-zero envelope `code` reported inside a 2xx response.
	///
	/// The service mirrors the HTTP taxonomy for its well-known codes; everything else is a
	/// service-level rejection that must not be retried.
	pub fn from_envelope_code(code: i64, message: Option<String>) -> Self {
		match code {
			401 => Self::Unauthorized,
			429 => Self::RateLimited { retry_after: None },
			500..=599 => Self::ServerError(code as u16),
			_ => Self::Api { code, message: message.unwrap_or_default() },
		}
	}

	/// Returns whether the retry policy may recover this failure with another attempt.
	///
	/// `Unauthorized` is excluded: the executor recovers it through the distinct
	/// refresh-then-retry budget, not through generic backoff.
	pub fn is_retryable(&self) -> bool {
		match self {
			Self::Network { .. } | Self::Timeout | Self::RateLimited { .. } => true,
			Self::ServerError(status) => matches!(status, 500 | 502 | 503 | 504),
			_ => false,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::Config(_) => "config",
			Self::Network { .. } => "network",
			Self::Timeout => "timeout",
			Self::RateLimited { .. } => "rate_limited",
			Self::Unauthorized => "unauthorized",
			Self::ServerError(_) => "server_error",
			Self::ClientError(_) => "client_error",
			Self::Api { .. } => "api",
			Self::Decode { .. } => "decode",
		}
	}
}

/// Configuration and request-construction failures raised locally, before any exchange.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL or endpoint path could not be parsed into a valid URL.
	#[error("Endpoint URL is invalid.")]
	InvalidUrl(#[from] url::ParseError),
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized.")]
	BodySerialize(#[from] serde_json::Error),
	/// Token endpoint returned an `expiredAt` value that is not a valid RFC 3339 timestamp.
	#[error("Token expiry timestamp is invalid.")]
	InvalidTokenExpiry(#[from] time::error::Parse),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
