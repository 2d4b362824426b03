//! Settings and issuer builders shared by the integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// self
use token_relay::{
	config::{APP_SECRET_KEY, DIRECT_LINE_URI_KEY, MapSource, SECRET_KEY},
	gateway::ReqwestGatewayClient,
	issuer::TokenIssuer,
};

/// Gateway path served by the mock server.
pub const TOKEN_PATH: &str = "/v3/directline/tokens/generate";
/// Downstream credential shared across tests.
pub const TEST_SECRET: &str = "direct-line-secret";
/// Signing secret shared across tests; long enough for HS256.
pub const TEST_APP_SECRET: &str = "an-app-secret-that-is-long-enough-for-hs256";

pub type ReqwestTestIssuer = TokenIssuer<ReqwestGatewayClient>;

/// Builds a settings map carrying all three required values, pointing the gateway at
/// `direct_line_uri`.
pub fn complete_settings(direct_line_uri: &str) -> MapSource {
	MapSource::from_iter([
		(SECRET_KEY, TEST_SECRET),
		(APP_SECRET_KEY, TEST_APP_SECRET),
		(DIRECT_LINE_URI_KEY, direct_line_uri),
	])
}

/// Constructs a [`TokenIssuer`] over `settings` with a plain reqwest transport.
pub fn build_reqwest_test_issuer(settings: &MapSource) -> ReqwestTestIssuer {
	TokenIssuer::from_source(settings, Arc::new(ReqwestGatewayClient::default()))
}
