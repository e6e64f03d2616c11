//! Retry policy with exponential backoff, jitter, and `Retry-After` awareness.

// crates.io
use rand::Rng;
// self
use crate::_prelude::*;

/// Verdict returned by [`RetryPolicy::decide`] for one failed attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
	/// Suspend for the given delay, then attempt again.
	Retry(Duration),
	/// Surface the last error to the caller as terminal.
	GiveUp,
}

/// Per-call retry bookkeeping, dropped when the logical call terminates.
///
/// `attempt` counts completed attempts consumed from the generic retry budget. The
/// credential-refresh retry is tracked separately in `auth_retry_used` so a 401 never eats
/// into the backoff budget.
#[derive(Clone, Copy, Debug, Default)]
pub struct RetryState {
	/// Number of failed attempts charged against the generic budget so far.
	pub attempt: u32,
	/// Whether the single refresh-then-retry recovery has been spent.
	pub auth_retry_used: bool,
}
impl RetryState {
	/// Fresh state for a new logical call.
	pub fn new() -> Self {
		Self::default()
	}
}

/// Decides whether and when a failed attempt is retried.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
	max_retries: u32,
	base_delay: Duration,
	max_delay: Duration,
}
impl RetryPolicy {
	/// Creates a policy with the provided budget and delay bounds.
	pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
		Self { max_retries, base_delay, max_delay }
	}

	/// Evaluates one failure against the remaining budget.
	///
	/// Retryable classifications get `base_delay * 2^attempt * random(0.5, 1.5)` capped at
	/// `max_delay`; a server `Retry-After` hint overrides the computed backoff when it is
	/// larger. Everything else, and any attempt past the budget, gives up.
	pub fn decide(&self, error: &Error, state: &RetryState) -> Decision {
		if !error.is_retryable() || state.attempt >= self.max_retries {
			return Decision::GiveUp;
		}

		let mut delay = self.backoff(state.attempt);

		if let Error::RateLimited { retry_after: Some(hint) } = error {
			delay = cmp::max(delay, *hint);
		}

		Decision::Retry(delay)
	}

	/// Maximum number of retries charged against the generic budget.
	pub fn max_retries(&self) -> u32 {
		self.max_retries
	}

	fn backoff(&self, attempt: u32) -> Duration {
		let exponent = 1u64 << attempt.min(20);
		let jitter = rand::rng().random_range(0.5..1.5);

		cmp::min(self.base_delay.mul_f64(exponent as f64 * jitter), self.max_delay)
	}
}
