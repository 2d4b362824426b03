//! Request handler that validates settings, fetches a session token, and signs the result.
//!
//! [`TokenIssuer::handle_request`] runs three stages in order and stops at the first failure:
//!
//! 1. validate `secret`, `appSecret`, and `directLineUri` (a gap is a `400`),
//! 2. `POST` to the gateway and parse its `{"token": ...}` payload,
//! 3. sign `userId`/`userName`/`connectorToken` claims with the `appSecret`.
//!
//! The issuer keeps no per-request state, so one instance serves every request concurrently.

// self
use crate::{
	_prelude::*,
	config::{ConfigSource, RelayConfig, Secret, ValidatedConfig},
	error::{DownstreamError, SigningError},
	gateway::{DownstreamPayload, GatewayClient, GatewayResponse},
	obs::{self, IssueOutcome, IssueSpan, IssueStage},
	token::{ConnectorClaims, DEFAULT_USER_NAME, DEFAULT_VALIDITY, IssuedToken, TokenSigner},
};

const BODY_PREVIEW_LEN: usize = 256;

/// Supplies the `userId` claim for each issued token.
pub trait UserIdSource
where
	Self: Send + Sync,
{
	/// Returns the identifier for the next token.
	fn next_user_id(&self) -> Uuid;
}

/// Fresh random (v4) identifier per token.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomUserIds;
impl UserIdSource for RandomUserIds {
	fn next_user_id(&self) -> Uuid {
		Uuid::new_v4()
	}
}

/// A fixed identifier; useful for reproducible signing.
impl UserIdSource for Uuid {
	fn next_user_id(&self) -> Uuid {
		*self
	}
}

/// Stateless issuer shared by every inbound request.
pub struct TokenIssuer<C>
where
	C: ?Sized + GatewayClient,
{
	config: RelayConfig,
	gateway: Arc<C>,
	user_ids: Arc<dyn UserIdSource>,
	user_name: String,
	validity: Duration,
}
impl<C> TokenIssuer<C>
where
	C: ?Sized + GatewayClient,
{
	/// Captures settings from `source`; nothing is validated until a request arrives.
	pub fn from_source(source: &(impl ?Sized + ConfigSource), gateway: Arc<C>) -> Self {
		Self::new(RelayConfig::from_source(source), gateway)
	}

	/// Builds an issuer over already captured settings.
	pub fn new(config: RelayConfig, gateway: Arc<C>) -> Self {
		Self {
			config,
			gateway,
			user_ids: Arc::new(RandomUserIds),
			user_name: DEFAULT_USER_NAME.into(),
			validity: DEFAULT_VALIDITY,
		}
	}

	/// Overrides the `userName` claim (defaults to `"you"`).
	pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
		self.user_name = user_name.into();

		self
	}

	/// Overrides the token lifetime (defaults to 200 minutes).
	pub fn with_validity(mut self, validity: Duration) -> Self {
		self.validity = validity;

		self
	}

	/// Replaces the `userId` generator.
	pub fn with_user_ids(mut self, user_ids: impl 'static + UserIdSource) -> Self {
		self.user_ids = Arc::new(user_ids);

		self
	}

	/// Settings captured at construction.
	pub fn config(&self) -> &RelayConfig {
		&self.config
	}

	/// Runs one issuance: validate, fetch the session token, sign.
	///
	/// Exactly one gateway call is made when validation passes and none otherwise.
	pub async fn handle_request(&self) -> Result<IssuedToken> {
		let span = IssueSpan::new();

		obs::record_issue_outcome(IssueStage::Validate, IssueOutcome::Attempt);

		span.instrument(async {
			let result = self.run(&span).await;

			match &result {
				Ok(issued) => {
					tracing::debug!(user_id = %issued.claims.user_id, "Issued connector token.");
					obs::record_issue_outcome(IssueStage::Sign, IssueOutcome::Success);
				},
				Err(err) => {
					let stage = failed_stage(err);

					if let Error::Config(_) = err {
						tracing::error!("{err}");
					} else {
						tracing::warn!(
							error = ?err,
							stage = stage.as_str(),
							"Token issuance failed."
						);
					}

					obs::record_issue_outcome(stage, IssueOutcome::Failure);
				},
			}

			result
		})
		.await
	}

	async fn run(&self, span: &IssueSpan) -> Result<IssuedToken> {
		span.record_stage(IssueStage::Validate);

		let config = self.config.validate()?;

		span.record_stage(IssueStage::FetchSession);

		let payload = self.fetch_session(&config).await?;

		span.record_stage(IssueStage::Sign);

		Ok(self.sign(config.app_secret, payload.token)?)
	}

	async fn fetch_session(
		&self,
		config: &ValidatedConfig<'_>,
	) -> Result<DownstreamPayload, DownstreamError> {
		let endpoint = Url::parse(config.direct_line_uri)
			.map_err(|source| DownstreamError::InvalidEndpoint { source })?;
		let response = self.gateway.post_token(&endpoint, config.secret).await?;

		if !response.is_success() {
			return Err(DownstreamError::Status {
				status: response.status,
				body_preview: body_preview(&response.body),
			});
		}

		parse_payload(&response)
	}

	fn sign(
		&self,
		app_secret: &Secret,
		connector_token: String,
	) -> Result<IssuedToken, SigningError> {
		let signer = TokenSigner::new(app_secret)?;
		let claims = ConnectorClaims::new(
			self.user_ids.next_user_id(),
			&self.user_name,
			connector_token,
			OffsetDateTime::now_utc(),
			self.validity,
		);

		signer.sign(claims)
	}
}
impl<C> Clone for TokenIssuer<C>
where
	C: ?Sized + GatewayClient,
{
	fn clone(&self) -> Self {
		Self {
			config: self.config.clone(),
			gateway: Arc::clone(&self.gateway),
			user_ids: Arc::clone(&self.user_ids),
			user_name: self.user_name.clone(),
			validity: self.validity,
		}
	}
}

fn failed_stage(err: &Error) -> IssueStage {
	match err {
		Error::Config(_) => IssueStage::Validate,
		Error::Downstream(_) => IssueStage::FetchSession,
		Error::Signing(_) => IssueStage::Sign,
	}
}

fn parse_payload(response: &GatewayResponse) -> Result<DownstreamPayload, DownstreamError> {
	let mut de = serde_json::Deserializer::from_slice(&response.body);

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| DownstreamError::Parse { source, status: response.status })
}

fn body_preview(body: &[u8]) -> String {
	String::from_utf8_lossy(body).chars().take(BODY_PREVIEW_LEN).collect()
}
