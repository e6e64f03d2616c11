//! Fixed-window rate limiting shared by every logical call of one client instance.

// crates.io
use tokio::time::Instant;
// self
use crate::_prelude::*;

/// Admits at most `capacity` requests per `window`, suspending surplus callers.
///
/// Admission is strictly first-in first-out: waiters queue on a fair async mutex, so a caller
/// that arrived earlier is always admitted no later than one that arrived after it. The
/// consumed count is only ever incremented at the instant of admission, while the state lock
/// is held, so cancelling a suspended `acquire` (dropping its future at the lock or during
/// the window sleep) leaves the window untouched and simply surrenders the caller's place in
/// the queue.
#[derive(Debug)]
pub struct RateLimiter {
	capacity: u32,
	window: Duration,
	state: AsyncMutex<WindowState>,
}

#[derive(Debug, Default)]
struct WindowState {
	consumed: u32,
	window_start: Option<Instant>,
}

impl RateLimiter {
	/// Creates a limiter admitting `capacity` requests per `window`.
	///
	/// A zero capacity is clamped to one so `acquire` can always terminate.
	pub fn new(capacity: u32, window: Duration) -> Self {
		Self { capacity: capacity.max(1), window, state: AsyncMutex::new(WindowState::default()) }
	}

	/// Suspends until a slot is available in the current window, then consumes it.
	///
	/// Never fails and never skips the queue; when the window is exhausted the caller sleeps
	/// until the window rolls over while holding its place, so later arrivals cannot overtake
	/// it.
	pub async fn acquire(&self) {
		let mut state = self.state.lock().await;

		loop {
			let now = Instant::now();

			match state.window_start {
				Some(start) if now < start + self.window => {
					if state.consumed < self.capacity {
						state.consumed += 1;

						return;
					}

					tokio::time::sleep_until(start + self.window).await;
				},
				_ => {
					state.window_start = Some(now);
					state.consumed = 1;

					return;
				},
			}
		}
	}

	/// Capacity per window.
	pub fn capacity(&self) -> u32 {
		self.capacity
	}

	/// Window duration.
	pub fn window(&self) -> Duration {
		self.window
	}

	#[cfg(test)]
	async fn consumed(&self) -> u32 {
		self.state.lock().await.consumed
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	};
	// self
	use super::*;

	#[tokio::test(start_paused = true)]
	async fn admissions_never_exceed_capacity_per_window() {
		let limiter = Arc::new(RateLimiter::new(3, Duration::from_secs(1)));
		let admitted = Arc::new(AtomicUsize::new(0));
		let mut handles = Vec::new();

		for _ in 0..10 {
			let limiter = limiter.clone();
			let admitted = admitted.clone();

			handles.push(tokio::spawn(async move {
				limiter.acquire().await;
				admitted.fetch_add(1, Ordering::SeqCst);
			}));
			tokio::task::yield_now().await;
		}

		// First window admits exactly the capacity.
		tokio::time::sleep(Duration::from_millis(500)).await;
		assert_eq!(admitted.load(Ordering::SeqCst), 3);

		// Each rollover admits one more batch; all callers eventually complete.
		tokio::time::sleep(Duration::from_secs(1)).await;
		assert_eq!(admitted.load(Ordering::SeqCst), 6);

		for handle in handles {
			tokio::time::timeout(Duration::from_secs(10), handle).await.unwrap().unwrap();
		}

		assert_eq!(admitted.load(Ordering::SeqCst), 10);
	}

	#[tokio::test(start_paused = true)]
	async fn admission_order_is_fifo() {
		let limiter = Arc::new(RateLimiter::new(1, Duration::from_secs(1)));
		let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
		let mut handles = Vec::new();

		for index in 0..5 {
			let limiter = limiter.clone();
			let order = order.clone();

			handles.push(tokio::spawn(async move {
				limiter.acquire().await;
				order.lock().push(index);
			}));
			tokio::task::yield_now().await;
		}

		for handle in handles {
			tokio::time::timeout(Duration::from_secs(30), handle).await.unwrap().unwrap();
		}

		assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
	}

	#[tokio::test(start_paused = true)]
	async fn cancelled_waiter_releases_its_place_without_corrupting_the_window() {
		let limiter = Arc::new(RateLimiter::new(1, Duration::from_secs(1)));

		limiter.acquire().await;
		assert_eq!(limiter.consumed().await, 1);

		// Queue a waiter, then cancel it mid-suspension.
		let waiter = tokio::spawn({
			let limiter = limiter.clone();

			async move { limiter.acquire().await }
		});

		tokio::task::yield_now().await;
		waiter.abort();
		assert!(waiter.await.unwrap_err().is_cancelled());

		// The next caller is admitted at the rollover and the count stays consistent.
		let follower = tokio::spawn({
			let limiter = limiter.clone();

			async move { limiter.acquire().await }
		});

		tokio::time::timeout(Duration::from_secs(5), follower).await.unwrap().unwrap();
		assert_eq!(limiter.consumed().await, 1);
	}
}
