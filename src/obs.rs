//! Optional observability helpers for the request-execution pipeline.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `pan123.call` carrying the `operation`
//!   (endpoint path) field, plus per-attempt events with the attempt number, failure
//!   classification, and chosen delay.
//! - Enable `metrics` to increment the `pan123_call_total` counter for every
//!   attempt/success/failure, labeled by `outcome`, and `pan123_attempt_retry_total` labeled
//!   by `classification`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each logical call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to the executor.
	Attempt,
	/// Terminal success.
	Success,
	/// Terminal failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
