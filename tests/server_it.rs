mod support;

// crates.io
use http_body_util::BodyExt;
use httpmock::prelude::*;
use tower::ServiceExt;
// self
use support::*;
use token_relay::{
	axum::{
		Router,
		body::Body,
		http::{Request, StatusCode, header::CONTENT_TYPE},
	},
	config::{APP_SECRET_KEY, FUNCTION_KEY_KEY},
	server::{self, FUNCTION_KEY_HEADER, TOKEN_ROUTE},
};

async fn call(
	router: Router,
	uri: &str,
	key: Option<&str>,
) -> (StatusCode, Option<String>, String) {
	let mut request = Request::builder().method("GET").uri(uri);

	if let Some(key) = key {
		request = request.header(FUNCTION_KEY_HEADER, key);
	}

	let response = router
		.oneshot(request.body(Body::empty()).expect("Request should build."))
		.await
		.expect("Router should not fail.");
	let status = response.status();
	let content_type = response
		.headers()
		.get(CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.map(str::to_owned);
	let bytes = response.into_body().collect().await.expect("Body should be readable.").to_bytes();
	let body = String::from_utf8(bytes.to_vec()).expect("Body should be UTF-8.");

	(status, content_type, body)
}

async fn gateway<'a>(
	server: &'a MockServer,
	status: u16,
	body: &'static str,
) -> httpmock::Mock<'a> {
	server
		.mock_async(move |when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(status).header("content-type", "application/json").body(body);
		})
		.await
}

#[tokio::test]
async fn get_returns_plain_text_token() {
	let server = MockServer::start_async().await;
	let mock = gateway(&server, 200, "{\"token\":\"abc123\"}").await;
	let router =
		server::router(build_reqwest_test_issuer(&complete_settings(&server.url(TOKEN_PATH))));
	let (status, content_type, body) = call(router, TOKEN_ROUTE, None).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
	assert_eq!(body.split('.').count(), 3);

	mock.assert_async().await;
}

#[tokio::test]
async fn missing_setting_is_a_bad_request_naming_the_key() {
	let server = MockServer::start_async().await;
	let mock = gateway(&server, 200, "{\"token\":\"abc123\"}").await;
	let mut settings = complete_settings(&server.url(TOKEN_PATH));

	settings.remove(APP_SECRET_KEY);

	let router = server::router(build_reqwest_test_issuer(&settings));
	let (status, _, body) = call(router, TOKEN_ROUTE, None).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body, "The 'appSecret' configuration value is not set.");

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn downstream_failure_is_a_bad_gateway_without_details() {
	let server = MockServer::start_async().await;
	let mock = gateway(&server, 500, "{\"error\":\"internal detail\"}").await;
	let router =
		server::router(build_reqwest_test_issuer(&complete_settings(&server.url(TOKEN_PATH))));
	let (status, _, body) = call(router, TOKEN_ROUTE, None).await;

	assert_eq!(status, StatusCode::BAD_GATEWAY);
	assert!(!body.contains("internal detail"));

	mock.assert_async().await;
}

#[tokio::test]
async fn function_key_is_required_when_configured() {
	let server = MockServer::start_async().await;
	let mock = gateway(&server, 200, "{\"token\":\"abc123\"}").await;
	let mut settings = complete_settings(&server.url(TOKEN_PATH));

	settings.set(FUNCTION_KEY_KEY, "invoke-key");

	let router = server::router(build_reqwest_test_issuer(&settings));
	let (missing, _, _) = call(router.clone(), TOKEN_ROUTE, None).await;
	let (wrong, _, _) = call(router.clone(), TOKEN_ROUTE, Some("other-key")).await;
	let (same_length, _, _) = call(router.clone(), TOKEN_ROUTE, Some("invoke-kez")).await;
	let (prefix, _, _) = call(router.clone(), TOKEN_ROUTE, Some("invoke")).await;
	let (header, _, _) = call(router.clone(), TOKEN_ROUTE, Some("invoke-key")).await;
	let (query, _, _) = call(router, &format!("{TOKEN_ROUTE}?code=invoke-key"), None).await;

	assert_eq!(missing, StatusCode::UNAUTHORIZED);
	assert_eq!(wrong, StatusCode::UNAUTHORIZED);
	assert_eq!(same_length, StatusCode::UNAUTHORIZED);
	assert_eq!(prefix, StatusCode::UNAUTHORIZED);
	assert_eq!(header, StatusCode::OK);
	assert_eq!(query, StatusCode::OK);

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn only_get_is_routed() {
	let server = MockServer::start_async().await;
	let router =
		server::router(build_reqwest_test_issuer(&complete_settings(&server.url(TOKEN_PATH))));
	let response = router
		.oneshot(
			Request::builder()
				.method("POST")
				.uri(TOKEN_ROUTE)
				.body(Body::empty())
				.expect("Request should build."),
		)
		.await
		.expect("Router should not fail.");

	assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
