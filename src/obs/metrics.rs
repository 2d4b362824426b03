//! Issuance counter.
//!
//! One series per `(stage, outcome)` pair. Attempts are counted at [`IssueStage::Validate`],
//! successes at [`IssueStage::Sign`], and failures at the stage that produced the error, so
//! `sum(failure) by (stage)` shows where requests stop.

// self
use crate::obs::{IssueOutcome, IssueStage};

/// Counter incremented once per attempt, success, and failure.
pub const ISSUE_COUNTER: &str = "token_relay_issue_total";

/// Label pairs attached to [`ISSUE_COUNTER`].
pub fn issue_labels(stage: IssueStage, outcome: IssueOutcome) -> [(&'static str, &'static str); 2] {
	[("stage", stage.as_str()), ("outcome", outcome.as_str())]
}

/// Bumps [`ISSUE_COUNTER`] on the global recorder; a no-op without the `metrics` feature.
pub fn record_issue_outcome(stage: IssueStage, outcome: IssueOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(ISSUE_COUNTER, &issue_labels(stage, outcome)[..]).increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = issue_labels(stage, outcome);
}
