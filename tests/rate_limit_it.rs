mod common;

// std
use std::time::{Duration, Instant};
// crates.io
use httpmock::prelude::*;
// self
use common::{CountingProvider, build_client, envelope, test_config};

#[tokio::test]
async fn concurrent_calls_are_throttled_to_the_configured_window() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/user/info");
			then.status(200)
				.header("content-type", "application/json")
				.body(envelope(serde_json::json!({ "uid": 1 })));
		})
		.await;
	let config = test_config(&server.base_url())
		.with_rate_limit(2, Duration::from_millis(200));
	let client = build_client(config, CountingProvider::new());
	let started = Instant::now();
	let mut handles = Vec::new();

	for _ in 0..6 {
		handles.push(tokio::spawn({
			let client = client.clone();

			async move { client.user_info().await }
		}));
	}

	for handle in handles {
		handle.await.unwrap().expect("every throttled call should eventually succeed");
	}

	// Six calls at two per 200 ms span at least two extra windows.
	assert!(
		started.elapsed() >= Duration::from_millis(400),
		"six calls completed in {:?}, faster than the limiter allows",
		started.elapsed()
	);

	mock.assert_calls_async(6).await;
}
