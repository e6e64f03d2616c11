//! The request executor: limiter → credential → transport → retry, per logical call.

// self
use crate::{
	_prelude::*,
	auth::{CredentialProvider, TokenEndpointProvider, TokenManager},
	error::ConfigError,
	http::{HttpTransport, TransportErrorMapper, TransportRequest},
	limit::RateLimiter,
	obs::{self, CallOutcome, CallSpan},
	request::RequestDescriptor,
	retry::{Decision, RetryPolicy, RetryState},
};
#[cfg(feature = "reqwest")] use crate::http::{ReqwestTransport, ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestPan123Client = Client<ReqwestTransport, ReqwestTransportErrorMapper>;

/// Configuration surface consumed by the executor and its collaborators.
///
/// The open platform does not document its exact per-app thresholds, so every bound is a
/// configurable default rather than a hard-coded constant.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Base URL of the service; always normalized to end with `/`.
	pub base_url: Url,
	/// Application identifier issued by the open platform.
	pub client_id: String,
	/// Application secret issued by the open platform.
	pub client_secret: String,
	/// Requests admitted per rate-limit window.
	pub rate_limit_capacity: u32,
	/// Rate-limit window duration.
	pub rate_limit_window: Duration,
	/// Generic retry budget per logical call.
	pub max_retries: u32,
	/// Base delay for exponential backoff.
	pub base_delay: Duration,
	/// Upper bound on any single backoff delay.
	pub max_delay: Duration,
	/// Per-attempt transport timeout.
	pub request_timeout: Duration,
	/// Safety margin subtracted from credential lifetimes.
	pub expiry_margin: Duration,
}
impl ClientConfig {
	/// Production base URL of the 123pan open platform.
	pub const DEFAULT_BASE_URL: &'static str = "https://open-api.123pan.com/";

	/// Creates a configuration with production defaults for the given application.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		let base_url =
			Url::parse(Self::DEFAULT_BASE_URL).expect("Default base URL is a valid literal.");

		Self {
			base_url,
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			rate_limit_capacity: 10,
			rate_limit_window: Duration::from_secs(1),
			max_retries: 3,
			base_delay: Duration::from_millis(250),
			max_delay: Duration::from_secs(10),
			request_timeout: Duration::from_secs(30),
			expiry_margin: Duration::from_secs(30),
		}
	}

	/// Overrides the base URL, normalizing the path to end with `/` so endpoint paths join
	/// below it instead of replacing its last segment.
	pub fn with_base_url(mut self, mut base_url: Url) -> Self {
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}

		self.base_url = base_url;

		self
	}

	/// Overrides the rate-limit capacity per window.
	pub fn with_rate_limit(mut self, capacity: u32, window: Duration) -> Self {
		self.rate_limit_capacity = capacity;
		self.rate_limit_window = window;

		self
	}

	/// Overrides the generic retry budget.
	pub fn with_max_retries(mut self, max_retries: u32) -> Self {
		self.max_retries = max_retries;

		self
	}

	/// Overrides the backoff delay bounds.
	pub fn with_backoff(mut self, base_delay: Duration, max_delay: Duration) -> Self {
		self.base_delay = base_delay;
		self.max_delay = max_delay;

		self
	}

	/// Overrides the per-attempt transport timeout.
	pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
		self.request_timeout = request_timeout;

		self
	}

	/// Overrides the credential expiry safety margin.
	pub fn with_expiry_margin(mut self, expiry_margin: Duration) -> Self {
		self.expiry_margin = expiry_margin;

		self
	}
}

/// Executes logical calls against the service, owning the shared limiter and credential.
///
/// One instance per application: the rate-limit window and the cached credential are the only
/// process-wide mutable state, and both live here. Construct once, share behind `Arc` (or
/// clone cheaply per task), and drop to release the transport's open connections.
pub struct Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::Error>,
{
	transport: Arc<C>,
	mapper: Arc<M>,
	config: ClientConfig,
	tokens: Arc<TokenManager>,
	limiter: Arc<RateLimiter>,
	retry: RetryPolicy,
}
impl<C, M> Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::Error>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair, wiring the
	/// default token-endpoint credential provider.
	pub fn with_transport(
		config: ClientConfig,
		transport: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let transport = transport.into();
		let mapper = mapper.into();
		let provider = TokenEndpointProvider::new(
			transport.clone(),
			mapper.clone(),
			&config.base_url,
			&config.client_id,
			&config.client_secret,
			config.request_timeout,
		)?;

		Ok(Self::with_credential_provider(config, transport, mapper, Arc::new(provider)))
	}

	/// Creates a client around an externally supplied credential source.
	pub fn with_credential_provider(
		config: ClientConfig,
		transport: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
		provider: Arc<dyn CredentialProvider>,
	) -> Self {
		let tokens = Arc::new(TokenManager::new(provider, config.expiry_margin));
		let limiter =
			Arc::new(RateLimiter::new(config.rate_limit_capacity, config.rate_limit_window));
		let retry = RetryPolicy::new(config.max_retries, config.base_delay, config.max_delay);

		Self { transport: transport.into(), mapper: mapper.into(), config, tokens, limiter, retry }
	}

	/// Credential manager shared by every call of this client.
	pub fn tokens(&self) -> &TokenManager {
		&self.tokens
	}

	/// Configuration this client was built with.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Executes one logical call, returning the envelope's `data` payload.
	///
	/// Exactly one terminal outcome per call: a decoded value or an [`Error`], never both and
	/// never neither. Each physical attempt consumes one rate-limiter slot.
	pub async fn execute(&self, descriptor: &RequestDescriptor) -> Result<serde_json::Value> {
		let span = CallSpan::new(descriptor.path());

		obs::record_call_outcome(CallOutcome::Attempt);

		let result = span.instrument(self.execute_inner(descriptor)).await;

		match &result {
			Ok(_) => obs::record_call_outcome(CallOutcome::Success),
			Err(_) => obs::record_call_outcome(CallOutcome::Failure),
		}

		result
	}

	/// Executes one logical call and decodes the payload into `T`.
	pub async fn execute_as<T>(&self, descriptor: &RequestDescriptor) -> Result<T>
	where
		T: serde::de::DeserializeOwned,
	{
		let value = self.execute(descriptor).await?;

		decode_value(value, None)
	}

	async fn execute_inner(&self, descriptor: &RequestDescriptor) -> Result<serde_json::Value> {
		let mut state = RetryState::new();

		loop {
			self.limiter.acquire().await;

			let error = match self.attempt(descriptor).await {
				Ok(value) => return Ok(value),
				Err(error) => error,
			};

			// A rejected credential earns exactly one refresh-then-retry, charged against a
			// budget distinct from generic backoff.
			if matches!(error, Error::Unauthorized)
				&& descriptor.requires_auth()
				&& !state.auth_retry_used
			{
				state.auth_retry_used = true;

				obs::record_retry(state.attempt, error.kind(), Duration::ZERO);

				continue;
			}

			match self.retry.decide(&error, &state) {
				Decision::Retry(delay) => {
					obs::record_retry(state.attempt, error.kind(), delay);
					obs::record_retried_attempt(error.kind());
					tokio::time::sleep(delay).await;

					state.attempt += 1;
				},
				Decision::GiveUp => {
					obs::record_give_up(state.attempt, error.kind());

					return Err(error);
				},
			}
		}
	}

	async fn attempt(&self, descriptor: &RequestDescriptor) -> Result<serde_json::Value> {
		let url = descriptor.url(&self.config.base_url)?;
		let credential = if descriptor.requires_auth() {
			Some(self.tokens.token().await?)
		} else {
			None
		};
		let headers =
			base_headers(credential.as_ref().map(|credential| credential.access_token.as_str()));
		let body = descriptor
			.body()
			.map(|value| serde_json::to_vec(value).map_err(ConfigError::from))
			.transpose()?;
		let request = TransportRequest { method: descriptor.method(), url, headers, body };
		let response =
			match tokio::time::timeout(self.config.request_timeout, self.transport.send(request))
				.await
			{
				Ok(Ok(response)) => response,
				Ok(Err(error)) => return Err(self.mapper.map_transport_error(error)),
				Err(_) => return Err(Error::Timeout),
			};
		let outcome = match Error::from_status(response.status, response.retry_after) {
			Some(error) => Err(error),
			None => decode_envelope(&response.body, response.status),
		};

		if let (Err(Error::Unauthorized), Some(credential)) = (&outcome, credential.as_ref()) {
			self.tokens.invalidate_if_current(&credential.access_token);
		}

		outcome
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestTransport, ReqwestTransportErrorMapper> {
	/// Creates a client with the crate's default reqwest transport.
	pub fn new(config: ClientConfig) -> Result<Self> {
		Self::with_transport(config, ReqwestTransport::default(), ReqwestTransportErrorMapper)
	}
}
impl<C, M> Clone for Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::Error>,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			mapper: self.mapper.clone(),
			config: self.config.clone(),
			tokens: self.tokens.clone(),
			limiter: self.limiter.clone(),
			retry: self.retry.clone(),
		}
	}
}
impl<C, M> Debug for Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::Error>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("config", &self.config)
			.field("tokens", &self.tokens)
			.finish_non_exhaustive()
	}
}

/// Headers shared by every outbound exchange, with the optional bearer credential.
pub(crate) fn base_headers(token: Option<&str>) -> Vec<(&'static str, String)> {
	let mut headers = vec![
		("Content-Type", "application/json".to_string()),
		("Platform", "open_platform".to_string()),
	];

	if let Some(token) = token {
		headers.push(("Authorization", format!("Bearer {token}")));
	}

	headers
}

/// Decodes the service envelope, folding non-zero `code` values into the error taxonomy.
pub(crate) fn decode_envelope(body: &[u8], status: u16) -> Result<serde_json::Value> {
	#[derive(Deserialize)]
	struct Envelope {
		code: i64,
		#[serde(default)]
		message: Option<String>,
		#[serde(default)]
		data: Option<serde_json::Value>,
	}

	let mut deserializer = serde_json::Deserializer::from_slice(body);
	let envelope: Envelope = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::Decode { source, status: Some(status) })?;

	if envelope.code != 0 {
		return Err(Error::from_envelope_code(envelope.code, envelope.message));
	}

	Ok(envelope.data.unwrap_or(serde_json::Value::Null))
}

/// Decodes an envelope payload into its per-endpoint schema.
pub(crate) fn decode_value<T>(value: serde_json::Value, status: Option<u16>) -> Result<T>
where
	T: serde::de::DeserializeOwned,
{
	serde_path_to_error::deserialize(value).map_err(|source| Error::Decode { source, status })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn base_headers_carry_the_platform_marker() {
		let headers = base_headers(None);

		assert!(headers.contains(&("Platform", "open_platform".to_string())));
		assert!(headers.iter().all(|(name, _)| *name != "Authorization"));

		let headers = base_headers(Some("token-1"));

		assert!(headers.contains(&("Authorization", "Bearer token-1".to_string())));
	}

	#[test]
	fn envelope_success_yields_the_payload() {
		let value = decode_envelope(br#"{"code":0,"message":"ok","data":{"uid":7}}"#, 200).unwrap();

		assert_eq!(value["uid"], 7);
	}

	#[test]
	fn envelope_without_data_yields_null() {
		let value = decode_envelope(br#"{"code":0,"message":"ok"}"#, 200).unwrap();

		assert!(value.is_null());
	}

	#[test]
	fn envelope_error_code_maps_into_the_taxonomy() {
		assert!(matches!(
			decode_envelope(br#"{"code":401,"message":"token expired"}"#, 200),
			Err(Error::Unauthorized)
		));
		assert!(matches!(
			decode_envelope(br#"{"code":20103,"message":"no such file"}"#, 200),
			Err(Error::Api { code: 20103, .. })
		));
	}

	#[test]
	fn malformed_body_is_a_decode_error() {
		assert!(matches!(
			decode_envelope(b"<html>gateway</html>", 200),
			Err(Error::Decode { status: Some(200), .. })
		));
	}

	#[test]
	fn config_normalizes_the_base_url() {
		let config = ClientConfig::new("id", "secret")
			.with_base_url(Url::parse("https://mirror.example.com/open").unwrap());

		assert_eq!(config.base_url.as_str(), "https://mirror.example.com/open/");
	}
}
