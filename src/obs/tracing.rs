// self
use crate::_prelude::*;

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by the executor, scoped to one logical call.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the endpoint path of the call.
	pub fn new(operation: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("pan123.call", operation = %operation);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = operation;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits one structured event for a failed attempt about to be retried.
pub fn record_retry(attempt: u32, classification: &'static str, delay: Duration) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(attempt, classification, delay_ms = delay.as_millis() as u64, "retrying");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (attempt, classification, delay);
	}
}

/// Emits one structured event for a terminal failure.
pub fn record_give_up(attempt: u32, classification: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(attempt, classification, "giving up");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (attempt, classification);
	}
}
