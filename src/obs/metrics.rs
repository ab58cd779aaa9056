// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	obs::{FlowKind, FlowOutcome},
};

const FLOW_TOTAL: &str = "oauth2_smashrun_flow_total";
const FLOW_FAILURE_TOTAL: &str = "oauth2_smashrun_flow_failure_total";
const FLOW_DURATION_SECONDS: &str = "oauth2_smashrun_flow_duration_seconds";

/// Counts one attempt, success, or failure of `kind`.
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(FLOW_TOTAL, "flow" => kind.as_str(), "outcome" => outcome.as_str())
		.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (FLOW_TOTAL, kind, outcome);
}

/// Counts a failed flow, labeled with [`Error::label`].
pub fn record_flow_failure(kind: FlowKind, error: &Error) {
	#[cfg(feature = "metrics")]
	metrics::counter!(FLOW_FAILURE_TOTAL, "flow" => kind.as_str(), "reason" => error.label())
		.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (FLOW_FAILURE_TOTAL, kind, error);
}

/// Records how long a completed flow took, in seconds.
pub fn record_flow_duration(kind: FlowKind, outcome: FlowOutcome, elapsed: StdDuration) {
	#[cfg(feature = "metrics")]
	metrics::histogram!(
		FLOW_DURATION_SECONDS,
		"flow" => kind.as_str(),
		"outcome" => outcome.as_str()
	)
	.record(elapsed.as_secs_f64());
	#[cfg(not(feature = "metrics"))]
	let _ = (FLOW_DURATION_SECONDS, kind, outcome, elapsed);
}
