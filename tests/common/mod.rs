//! Shared fixtures for the httpmock-backed integration tests.

#![allow(dead_code)]

// std
use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};
// crates.io
use pan123_client::{
	auth::{Credential, CredentialFuture, CredentialProvider},
	client::{Client, ClientConfig, ReqwestPan123Client},
	http::{ReqwestTransport, ReqwestTransportErrorMapper},
	url::Url,
};
use time::OffsetDateTime;

pub const CLIENT_ID: &str = "test-client-id";
pub const CLIENT_SECRET: &str = "test-client-secret";

/// Configuration tuned for tests: generous rate limit, millisecond backoff.
pub fn test_config(base_url: &str) -> ClientConfig {
	ClientConfig::new(CLIENT_ID, CLIENT_SECRET)
		.with_base_url(Url::parse(base_url).expect("Mock server URL should parse successfully."))
		.with_rate_limit(1_000, Duration::from_secs(1))
		.with_backoff(Duration::from_millis(1), Duration::from_millis(50))
		.with_request_timeout(Duration::from_secs(5))
}

/// Credential source handing out `token-1`, `token-2`, ... and counting fetches.
pub struct CountingProvider {
	pub fetches: AtomicUsize,
	delay: Duration,
}
impl CountingProvider {
	pub fn new() -> Arc<Self> {
		Self::with_delay(Duration::ZERO)
	}

	/// A fetch delay widens the race window for coalescing assertions.
	pub fn with_delay(delay: Duration) -> Arc<Self> {
		Arc::new(Self { fetches: AtomicUsize::new(0), delay })
	}

	pub fn fetches(&self) -> usize {
		self.fetches.load(Ordering::SeqCst)
	}
}
impl CredentialProvider for CountingProvider {
	fn fetch(&self) -> CredentialFuture<'_> {
		Box::pin(async move {
			let serial = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;

			tokio::time::sleep(self.delay).await;

			Ok(Credential {
				access_token: format!("token-{serial}"),
				expires_at: OffsetDateTime::now_utc() + time::Duration::hours(1),
			})
		})
	}
}

/// Builds a reqwest-backed client around a scripted credential source.
pub fn build_client(
	config: ClientConfig,
	provider: Arc<dyn CredentialProvider>,
) -> ReqwestPan123Client {
	Client::with_credential_provider(
		config,
		ReqwestTransport::default(),
		ReqwestTransportErrorMapper,
		provider,
	)
}

/// A credential that outlives any test run.
pub fn long_lived(access_token: &str) -> Credential {
	Credential {
		access_token: access_token.into(),
		expires_at: OffsetDateTime::now_utc() + time::Duration::hours(1),
	}
}

/// Canonical success envelope around a JSON payload.
pub fn envelope(data: serde_json::Value) -> String {
	serde_json::json!({ "code": 0, "message": "ok", "data": data }).to_string()
}
