//! Transport primitives for the request-execution pipeline.
//!
//! The module exposes [`HttpTransport`] as the crate's only dependency on an HTTP stack,
//! together with [`TransportErrorMapper`] so transport-specific failures can be folded into
//! the crate taxonomy without the executor knowing the concrete client. The default
//! reqwest-backed implementation lives behind the `reqwest` feature.

// std
use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{HeaderMap, RETRY_AFTER};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, request::Method};

/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<TransportResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing one physical attempt.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared across
/// client instances behind `Arc<T>`, and the futures they return must be `Send` so logical
/// calls can hop executors. The per-attempt timeout is enforced by the executor, not the
/// transport; implementations should surface their own timeouts as transport errors and let
/// the paired [`TransportErrorMapper`] classify them.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type Error: 'static + Send + Sync + StdError;

	/// Performs one HTTP exchange and collects the status, retry hint, and body.
	fn send(&self, request: TransportRequest) -> TransportFuture<'_, Self::Error>;
}

/// One physical HTTP attempt, fully resolved (absolute URL, final headers, encoded body).
#[derive(Clone, Debug)]
pub struct TransportRequest {
	/// HTTP method of the attempt.
	pub method: Method,
	/// Absolute request URL including query parameters.
	pub url: Url,
	/// Header name/value pairs attached to the attempt.
	pub headers: Vec<(&'static str, String)>,
	/// Optional encoded body.
	pub body: Option<Vec<u8>>,
}

/// Raw outcome of one HTTP exchange, before classification.
///
/// `retry_after` is parsed eagerly by the transport so the executor and retry policy never
/// touch raw headers.
#[derive(Clone, Debug)]
pub struct TransportResponse {
	/// HTTP status code.
	pub status: u16,
	/// Relative `Retry-After` hint, when the response carried one.
	pub retry_after: Option<Duration>,
	/// Response body bytes.
	pub body: Vec<u8>,
}

/// Maps transport-specific failures into the crate [`Error`] taxonomy.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an error emitted by the transport into a crate error.
	fn map_transport_error(&self, error: E) -> Error;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Redirect following stays enabled (download URLs redirect to storage nodes), but callers
/// providing a custom [`ReqwestClient`] should leave connection pooling on so the client can
/// be torn down by dropping the last handle.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	type Error = ReqwestError;

	fn send(&self, request: TransportRequest) -> TransportFuture<'_, Self::Error> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = client.request(request.method.into(), request.url);

			for (name, value) in request.headers {
				builder = builder.header(name, value);
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let retry_after = parse_retry_after(response.headers());
			let body = response.bytes().await?.to_vec();

			Ok(TransportResponse { status, retry_after, body })
		})
	}
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(&self, err: ReqwestError) -> Error {
		if err.is_builder() {
			return crate::error::ConfigError::from(err).into();
		}
		if err.is_timeout() {
			return Error::Timeout;
		}

		Error::network(err)
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::from_secs(secs));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(Duration::from_secs(delta.whole_seconds() as u64));
		}
	}

	None
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// crates.io
	use reqwest::header::HeaderValue;
	// self
	use super::*;

	fn headers_with(value: &str) -> HeaderMap {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_str(value).unwrap());

		headers
	}

	#[test]
	fn retry_after_seconds_are_parsed() {
		assert_eq!(
			parse_retry_after(&headers_with("5")),
			Some(Duration::from_secs(5))
		);
	}

	#[test]
	fn retry_after_dates_in_the_past_are_discarded() {
		assert_eq!(parse_retry_after(&headers_with("Wed, 21 Oct 2015 07:28:00 GMT")), None);
	}

	#[test]
	fn missing_retry_after_yields_none() {
		assert_eq!(parse_retry_after(&HeaderMap::new()), None);
	}
}
