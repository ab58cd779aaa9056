// self
use crate::{_prelude::*, obs::FlowKind};

/// Future returned by [`FlowSpan::instrument`].
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`FlowSpan::instrument`]; the input future itself without `tracing`.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// Span covering one stage of a strategy flow.
///
/// Named `oauth2_smashrun.flow` with `flow` and `stage` fields. Without the `tracing` feature
/// every method compiles down to nothing.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
#[cfg(feature = "tracing")]
impl FlowSpan {
	/// Opens a span for `stage` of `kind`.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		Self { span: tracing::info_span!("oauth2_smashrun.flow", flow = kind.as_str(), stage) }
	}

	/// Enters the span for a synchronous section.
	pub fn entered(self) -> FlowSpanGuard {
		FlowSpanGuard { _guard: self.span.entered() }
	}

	/// Attaches the span to `fut` so no guard is held across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		tracing::Instrument::instrument(fut, self.span.clone())
	}

	/// Emits a warning event for `error` inside the span.
	pub fn record_failure(&self, error: &Error) {
		self.span.in_scope(|| {
			tracing::warn!(reason = error.label(), error = %error, "flow failed");
		});
	}
}
#[cfg(not(feature = "tracing"))]
impl FlowSpan {
	/// Opens a span for `stage` of `kind`.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		let _ = (kind, stage);

		Self {}
	}

	/// Enters the span for a synchronous section.
	pub fn entered(self) -> FlowSpanGuard {
		FlowSpanGuard {}
	}

	/// Attaches the span to `fut` so no guard is held across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		fut
	}

	/// Emits a warning event for `error` inside the span.
	pub fn record_failure(&self, error: &Error) {
		let _ = error;
	}
}

/// Guard returned by [`FlowSpan::entered`]; the span is exited on drop.
pub struct FlowSpanGuard {
	#[cfg(feature = "tracing")]
	_guard: tracing::span::EnteredSpan,
}
impl Debug for FlowSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FlowSpanGuard(..)")
	}
}
