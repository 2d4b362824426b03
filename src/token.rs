//! Claims and HS256 signing for issued tokens.

// crates.io
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
// self
use crate::{_prelude::*, config::Secret, error::SigningError};

/// Display name stamped into every issued token unless overridden.
pub const DEFAULT_USER_NAME: &str = "you";
/// Lifetime of an issued token unless overridden.
pub const DEFAULT_VALIDITY: Duration = Duration::minutes(200);
/// Shortest HMAC key accepted for HS256, in bytes.
pub const MIN_KEY_LEN: usize = 32;

/// Payload of an issued token. Field order is the serialized claim order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorClaims {
	/// Random identifier minted for this request.
	pub user_id: String,
	/// Fixed display name.
	pub user_name: String,
	/// Session token obtained from the gateway, verbatim.
	pub connector_token: String,
	/// Not-before, unix seconds.
	pub nbf: i64,
	/// Expiry, unix seconds.
	pub exp: i64,
	/// Issued-at, unix seconds.
	pub iat: i64,
}
impl ConnectorClaims {
	/// Builds claims issued at `now` and valid for `validity`.
	pub fn new(
		user_id: Uuid,
		user_name: impl Into<String>,
		connector_token: impl Into<String>,
		now: OffsetDateTime,
		validity: Duration,
	) -> Self {
		let issued_at = now.unix_timestamp();

		Self {
			user_id: user_id.to_string(),
			user_name: user_name.into(),
			connector_token: connector_token.into(),
			nbf: issued_at,
			exp: (now + validity).unix_timestamp(),
			iat: issued_at,
		}
	}
}

/// Compact JWT together with the claims it carries.
#[derive(Clone, Debug)]
pub struct IssuedToken {
	/// `header.claims.signature`, each segment base64url without padding.
	pub token: String,
	/// Claims that were signed.
	pub claims: ConnectorClaims,
}

/// HMAC-SHA256 signer keyed by the UTF-8 bytes of the signing secret.
pub struct TokenSigner {
	encoding: EncodingKey,
	decoding: DecodingKey,
}
impl TokenSigner {
	/// Builds a signer, rejecting keys shorter than [`MIN_KEY_LEN`].
	pub fn new(secret: &Secret) -> Result<Self, SigningError> {
		let key = secret.expose().as_bytes();

		if key.len() < MIN_KEY_LEN {
			return Err(SigningError::KeyTooShort { len: key.len() });
		}

		Ok(Self {
			encoding: EncodingKey::from_secret(key),
			decoding: DecodingKey::from_secret(key),
		})
	}

	/// Signs `claims` into an [`IssuedToken`].
	pub fn sign(&self, claims: ConnectorClaims) -> Result<IssuedToken, SigningError> {
		let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;

		Ok(IssuedToken { token, claims })
	}

	/// Verifies the signature and expiry of `token` and returns its claims.
	pub fn verify(&self, token: &str) -> Result<ConnectorClaims, jsonwebtoken::errors::Error> {
		let mut validation = Validation::new(Algorithm::HS256);

		validation.set_required_spec_claims(&["exp", "nbf"]);
		validation.validate_nbf = true;

		jsonwebtoken::decode::<ConnectorClaims>(token, &self.decoding, &validation)
			.map(|data| data.claims)
	}
}
impl Debug for TokenSigner {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenSigner(..)")
	}
}
