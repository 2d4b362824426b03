//! Observability helpers for the issuance path.
//!
//! # Feature Flags
//!
//! - Spans named `token_relay.issue` carry a `stage` field and are always emitted through
//!   `tracing`.
//! - Enable `metrics` to increment [`ISSUE_COUNTER`] for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Stages of one issuance request, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IssueStage {
	/// Checking that the required settings are present.
	Validate,
	/// Calling the gateway and parsing its payload.
	FetchSession,
	/// Building and signing the claims.
	Sign,
}
impl IssueStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			IssueStage::Validate => "validate",
			IssueStage::FetchSession => "fetch_session",
			IssueStage::Sign => "sign",
		}
	}
}
impl Display for IssueStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IssueOutcome {
	/// Entry to the handler.
	Attempt,
	/// Token issued.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl IssueOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			IssueOutcome::Attempt => "attempt",
			IssueOutcome::Success => "success",
			IssueOutcome::Failure => "failure",
		}
	}
}
impl Display for IssueOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
