// crates.io
use tracing::{Span, instrument::Instrumented};
use tracing_subscriber::EnvFilter;
// self
use crate::_prelude::*;

/// Span wrapping one issuance request.
#[derive(Clone, Debug)]
pub struct IssueSpan {
	span: Span,
}
impl IssueSpan {
	/// Creates a new span; `stage` starts empty and is filled in by [`IssueSpan::record_stage`].
	pub fn new() -> Self {
		Self { span: tracing::info_span!("token_relay.issue", stage = tracing::field::Empty) }
	}

	/// Marks the stage the request has reached.
	pub fn record_stage(&self, stage: super::IssueStage) {
		self.span.record("stage", stage.as_str());
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		use tracing::Instrument;

		fut.instrument(self.span.clone())
	}
}
impl Default for IssueSpan {
	fn default() -> Self {
		Self::new()
	}
}

/// Installs `color-eyre` report hooks and a `fmt` subscriber filtered by `RUST_LOG`
/// (default `info`).
pub fn install() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.try_init()
		.map_err(|e| color_eyre::eyre::eyre!("{e}"))?;

	Ok(())
}
