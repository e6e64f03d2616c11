// self
use crate::obs::CallOutcome;

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("pan123_call_total", "outcome" => outcome.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}

/// Records one retried attempt labeled by failure classification (when enabled).
pub fn record_retried_attempt(classification: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("pan123_attempt_retry_total", "classification" => classification)
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = classification;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_are_noops_without_metrics() {
		record_call_outcome(CallOutcome::Failure);
		record_retried_attempt("timeout");
	}
}
