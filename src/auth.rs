//! Credential management with coalesced refresh.
//!
//! [`TokenManager`] owns the crate's only credential state. Callers obtain a valid bearer
//! token via [`TokenManager::token`]; when the cached credential is absent or inside the
//! expiry margin, the first caller performs the refresh while concurrent callers wait on the
//! same singleflight guard and reuse its outcome. Persisting credentials across process
//! restarts is a collaborator's concern; [`TokenManager::seed`] accepts an externally stored
//! credential at startup.

// crates.io
use time::format_description::well_known::Rfc3339;
// self
use crate::{
	_prelude::*,
	client,
	error::ConfigError,
	http::{HttpTransport, TransportErrorMapper, TransportRequest},
	request::Method,
};

/// Boxed future returned by [`CredentialProvider::fetch`].
pub type CredentialFuture<'a> = Pin<Box<dyn Future<Output = Result<Credential>> + 'a + Send>>;

/// A bearer token together with its expiry instant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
	/// Access token attached to authenticated requests.
	pub access_token: String,
	/// Instant after which the service rejects the token.
	pub expires_at: OffsetDateTime,
}
impl Credential {
	/// Returns whether the credential is still usable at `now`, applying the safety margin.
	///
	/// The margin guards against a token expiring while a request carrying it is in flight.
	pub fn is_fresh_at(&self, now: OffsetDateTime, margin: Duration) -> bool {
		(self.expires_at - now).whole_seconds() > margin.as_secs() as i64
	}
}

/// Source of fresh credentials consulted by the [`TokenManager`] on refresh.
///
/// The default implementation exchanges client credentials at the service's token endpoint;
/// tests substitute scripted providers.
pub trait CredentialProvider
where
	Self: Send + Sync,
{
	/// Obtains a fresh credential from the authority.
	fn fetch(&self) -> CredentialFuture<'_>;
}

/// Owns the cached credential and serializes refresh operations.
pub struct TokenManager {
	provider: Arc<dyn CredentialProvider>,
	cached: RwLock<Option<Credential>>,
	refresh_guard: AsyncMutex<()>,
	expiry_margin: Duration,
}
impl TokenManager {
	/// Creates a manager around the provided credential source.
	pub fn new(provider: Arc<dyn CredentialProvider>, expiry_margin: Duration) -> Self {
		Self {
			provider,
			cached: RwLock::new(None),
			refresh_guard: AsyncMutex::new(()),
			expiry_margin,
		}
	}

	/// Installs an externally persisted credential as the cached value.
	pub fn seed(&self, credential: Credential) {
		*self.cached.write() = Some(credential);
	}

	/// Returns a valid credential, refreshing through the singleflight guard when needed.
	///
	/// Refresh failures of any kind surface as [`Error::Unauthorized`]; the underlying cause
	/// is logged but never leaks into the caller-visible taxonomy.
	pub async fn token(&self) -> Result<Credential> {
		if let Some(credential) = self.fresh_cached() {
			return Ok(credential);
		}

		let _singleflight = self.refresh_guard.lock().await;

		// A concurrent caller may have refreshed while this one awaited the guard.
		if let Some(credential) = self.fresh_cached() {
			return Ok(credential);
		}

		let fresh = self.provider.fetch().await.map_err(|error| {
			#[cfg(feature = "tracing")]
			tracing::warn!(cause = %error, "credential refresh failed");
			#[cfg(not(feature = "tracing"))]
			let _ = &error;

			Error::Unauthorized
		})?;

		*self.cached.write() = Some(fresh.clone());

		Ok(fresh)
	}

	/// Forces the next [`TokenManager::token`] call to refresh.
	pub fn invalidate(&self) {
		*self.cached.write() = None;
	}

	/// Discards the cached credential only if it still matches the rejected token.
	///
	/// Concurrent calls that observed the same stale token each report the rejection; only
	/// the first discard takes effect, so a credential refreshed in the meantime is never
	/// thrown away.
	pub(crate) fn invalidate_if_current(&self, stale_token: &str) {
		let mut cached = self.cached.write();

		if cached.as_ref().is_some_and(|credential| credential.access_token == stale_token) {
			*cached = None;
		}
	}

	fn fresh_cached(&self) -> Option<Credential> {
		let now = OffsetDateTime::now_utc();

		self.cached
			.read()
			.as_ref()
			.filter(|credential| credential.is_fresh_at(now, self.expiry_margin))
			.cloned()
	}
}
impl Debug for TokenManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManager")
			.field("cached", &self.cached.read().is_some())
			.field("expiry_margin", &self.expiry_margin)
			.finish()
	}
}

/// Default [`CredentialProvider`] exchanging client credentials at the token endpoint.
///
/// The exchange goes through the same transport as every other call but bypasses the rate
/// limiter and retry loop; a failed refresh is reported to the executor, which owns the
/// single refresh-then-retry recovery.
pub struct TokenEndpointProvider<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::Error>,
{
	transport: Arc<C>,
	mapper: Arc<M>,
	endpoint: Url,
	client_id: String,
	client_secret: String,
	timeout: Duration,
}
impl<C, M> TokenEndpointProvider<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::Error>,
{
	/// Token endpoint path on the open platform.
	pub const TOKEN_PATH: &'static str = "api/v1/access_token";

	/// Creates a provider posting `client_id`/`client_secret` to `base_url`'s token endpoint.
	pub fn new(
		transport: Arc<C>,
		mapper: Arc<M>,
		base_url: &Url,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		timeout: Duration,
	) -> Result<Self> {
		let endpoint = base_url.join(Self::TOKEN_PATH).map_err(ConfigError::from)?;

		Ok(Self {
			transport,
			mapper,
			endpoint,
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			timeout,
		})
	}
}
impl<C, M> CredentialProvider for TokenEndpointProvider<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::Error>,
{
	fn fetch(&self) -> CredentialFuture<'_> {
		Box::pin(async move {
			let body = serde_json::to_vec(&TokenRequest {
				client_id: &self.client_id,
				client_secret: &self.client_secret,
			})
			.map_err(ConfigError::from)?;
			let request = TransportRequest {
				method: Method::Post,
				url: self.endpoint.clone(),
				headers: client::base_headers(None),
				body: Some(body),
			};
			let response = tokio::time::timeout(self.timeout, self.transport.send(request))
				.await
				.map_err(|_| Error::Timeout)?
				.map_err(|error| self.mapper.map_transport_error(error))?;

			if let Some(error) = Error::from_status(response.status, response.retry_after) {
				return Err(error);
			}

			let data = client::decode_envelope(&response.body, response.status)?;
			let token: TokenData = client::decode_value(data, Some(response.status))?;
			let expires_at =
				OffsetDateTime::parse(&token.expired_at, &Rfc3339).map_err(ConfigError::from)?;

			Ok(Credential { access_token: token.access_token, expires_at })
		})
	}
}

#[derive(Serialize)]
struct TokenRequest<'a> {
	#[serde(rename = "clientID")]
	client_id: &'a str,
	#[serde(rename = "clientSecret")]
	client_secret: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenData {
	access_token: String,
	expired_at: String,
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;

	struct ScriptedProvider {
		fetches: AtomicUsize,
	}
	impl ScriptedProvider {
		fn new() -> Arc<Self> {
			Arc::new(Self { fetches: AtomicUsize::new(0) })
		}
	}
	impl CredentialProvider for ScriptedProvider {
		fn fetch(&self) -> CredentialFuture<'_> {
			Box::pin(async move {
				let serial = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;

				// Widens the race window so concurrent callers pile onto the guard.
				tokio::time::sleep(Duration::from_millis(10)).await;

				Ok(Credential {
					access_token: format!("token-{serial}"),
					expires_at: OffsetDateTime::now_utc() + time::Duration::hours(1),
				})
			})
		}
	}

	fn manager(provider: Arc<ScriptedProvider>) -> Arc<TokenManager> {
		Arc::new(TokenManager::new(provider, Duration::from_secs(30)))
	}

	#[test]
	fn freshness_applies_the_expiry_margin() {
		let now = OffsetDateTime::now_utc();
		let credential =
			Credential { access_token: "t".into(), expires_at: now + time::Duration::seconds(20) };

		assert!(credential.is_fresh_at(now, Duration::from_secs(10)));
		assert!(!credential.is_fresh_at(now, Duration::from_secs(30)));
	}

	#[tokio::test]
	async fn concurrent_callers_share_one_refresh() {
		let provider = ScriptedProvider::new();
		let manager = manager(provider.clone());
		let mut handles = Vec::new();

		for _ in 0..8 {
			let manager = manager.clone();

			handles.push(tokio::spawn(async move { manager.token().await }));
		}

		for handle in handles {
			assert_eq!(handle.await.unwrap().unwrap().access_token, "token-1");
		}

		assert_eq!(provider.fetches.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn invalidate_forces_exactly_one_more_refresh() {
		let provider = ScriptedProvider::new();
		let manager = manager(provider.clone());

		assert_eq!(manager.token().await.unwrap().access_token, "token-1");

		manager.invalidate();
		assert_eq!(manager.token().await.unwrap().access_token, "token-2");
		assert_eq!(provider.fetches.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn stale_invalidation_spares_a_newer_credential() {
		let provider = ScriptedProvider::new();
		let manager = manager(provider.clone());

		assert_eq!(manager.token().await.unwrap().access_token, "token-1");

		manager.invalidate_if_current("token-1");
		assert_eq!(manager.token().await.unwrap().access_token, "token-2");

		// A rejection observed against the old token must not discard the refreshed one.
		manager.invalidate_if_current("token-1");
		assert_eq!(manager.token().await.unwrap().access_token, "token-2");
		assert_eq!(provider.fetches.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn seeded_credentials_are_served_without_fetching() {
		let provider = ScriptedProvider::new();
		let manager = manager(provider.clone());

		manager.seed(Credential {
			access_token: "persisted".into(),
			expires_at: OffsetDateTime::now_utc() + time::Duration::hours(1),
		});

		assert_eq!(manager.token().await.unwrap().access_token, "persisted");
		assert_eq!(provider.fetches.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn refresh_failure_surfaces_as_unauthorized() {
		struct FailingProvider;
		impl CredentialProvider for FailingProvider {
			fn fetch(&self) -> CredentialFuture<'_> {
				Box::pin(async { Err(Error::ServerError(500)) })
			}
		}

		let manager = TokenManager::new(Arc::new(FailingProvider), Duration::from_secs(30));

		assert!(matches!(manager.token().await, Err(Error::Unauthorized)));
	}
}
