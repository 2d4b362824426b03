//! Transport primitives for the Direct Line session-token exchange.
//!
//! [`GatewayClient`] is the relay's only dependency on an HTTP stack. A transport performs the
//! authenticated `POST` and hands back the raw status and body; classifying statuses and parsing
//! the payload stays with the issuer so every transport fails the same way.

// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{ACCEPT, AUTHORIZATION};
// self
use crate::{_prelude::*, config::Secret, error::DownstreamError};

/// Boxed future returned by [`GatewayClient::post_token`].
pub type GatewayFuture<'a> =
	Pin<Box<dyn Future<Output = Result<GatewayResponse, DownstreamError>> + 'a + Send>>;

/// Abstraction over HTTP transports able to request a session token from the gateway.
///
/// Implementations are shared behind `Arc` across every in-flight request, so they must be
/// `Send + Sync + 'static` and their futures must be `Send`.
pub trait GatewayClient
where
	Self: 'static + Send + Sync,
{
	/// Issues `POST endpoint` with an empty body, `Authorization: Bearer <credential>`, and
	/// `Accept: application/json`.
	///
	/// Only transport failures are errors here; any HTTP status is returned as a response.
	fn post_token<'a>(&'a self, endpoint: &'a Url, credential: &'a Secret) -> GatewayFuture<'a>;
}

/// Raw gateway answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayResponse {
	/// HTTP status code.
	pub status: u16,
	/// Undecoded response body.
	pub body: Vec<u8>,
}
impl GatewayResponse {
	/// Whether the status is in the `2xx` range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Session payload returned by the gateway; only `token` is consumed.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DownstreamPayload {
	/// Opaque session token.
	pub token: String,
}

/// Thin wrapper around [`ReqwestClient`] so every request shares one connection pool.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestGatewayClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestGatewayClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl GatewayClient for ReqwestGatewayClient {
	fn post_token<'a>(&'a self, endpoint: &'a Url, credential: &'a Secret) -> GatewayFuture<'a> {
		Box::pin(async move {
			let response = self
				.0
				.post(endpoint.clone())
				.header(AUTHORIZATION, format!("Bearer {}", credential.expose()))
				.header(ACCEPT, "application/json")
				.send()
				.await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(GatewayResponse { status, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn success_covers_only_2xx() {
		let response = |status| GatewayResponse { status, body: Vec::new() };

		assert!(response(200).is_success());
		assert!(response(204).is_success());
		assert!(!response(199).is_success());
		assert!(!response(302).is_success());
		assert!(!response(500).is_success());
	}

	#[test]
	fn payload_ignores_unknown_fields() {
		let payload: DownstreamPayload = serde_json::from_str(
			r#"{"conversationId":"abc","token":"session","expires_in":3600}"#,
		)
		.expect("Gateway payload should deserialize.");

		assert_eq!(payload.token, "session");
	}
}
