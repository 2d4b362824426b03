//! Inbound HTTP surface: one `GET` route guarded by an optional function key.

// crates.io
use axum::{
	Router,
	extract::{Request, State},
	http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::get,
};
use subtle::ConstantTimeEq;
use tokio::net::TcpListener;
// self
use crate::{_prelude::*, config::Secret, gateway::GatewayClient, issuer::TokenIssuer};

/// Route the token is served from.
pub const TOKEN_ROUTE: &str = "/api/TokenGenerator";
/// Header carrying the function key.
pub const FUNCTION_KEY_HEADER: &str = "x-functions-key";
/// Query parameter carrying the function key.
pub const FUNCTION_KEY_QUERY: &str = "code";

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Builds the relay router around `issuer`.
pub fn router<C>(issuer: TokenIssuer<C>) -> Router
where
	C: ?Sized + GatewayClient,
{
	let function_key = Arc::new(issuer.config().function_key.clone());

	Router::new()
		.route(TOKEN_ROUTE, get(issue_token::<C>))
		.route_layer(middleware::from_fn_with_state(function_key, require_function_key))
		.with_state(Arc::new(issuer))
}

/// Serves `router` on `listener` until Ctrl-C or `SIGTERM`.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
	if let Ok(addr) = listener.local_addr() {
		tracing::info!(%addr, route = TOKEN_ROUTE, "Token relay listening.");
	}

	axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await
}

async fn issue_token<C>(State(issuer): State<Arc<TokenIssuer<C>>>) -> Result<Response>
where
	C: ?Sized + GatewayClient,
{
	let issued = issuer.handle_request().await?;

	Ok(([(CONTENT_TYPE, TEXT_PLAIN)], issued.token).into_response())
}

async fn require_function_key(
	State(function_key): State<Arc<Option<Secret>>>,
	request: Request,
	next: Next,
) -> Response {
	let Some(expected) = function_key.as_ref() else {
		return next.run(request).await;
	};
	let presented = header_key(request.headers()).or_else(|| query_key(request.uri().query()));

	if key_matches(expected, presented.as_deref()) {
		next.run(request).await
	} else {
		tracing::debug!(
			route = %request.uri().path(),
			"Rejected request without a valid function key."
		);

		StatusCode::UNAUTHORIZED.into_response()
	}
}

fn key_matches(expected: &Secret, presented: Option<&str>) -> bool {
	presented.is_some_and(|key| expected.expose().as_bytes().ct_eq(key.as_bytes()).into())
}

fn header_key(headers: &HeaderMap) -> Option<String> {
	headers.get(FUNCTION_KEY_HEADER)?.to_str().ok().map(str::to_owned)
}

fn query_key(query: Option<&str>) -> Option<String> {
	url::form_urlencoded::parse(query?.as_bytes())
		.find(|(name, _)| name == FUNCTION_KEY_QUERY)
		.map(|(_, value)| value.into_owned())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::warn!(error = %e, "Failed to listen for Ctrl-C.");

			std::future::pending::<()>().await;
		}
	};
	#[cfg(unix)]
	let terminate = async {
		use tokio::signal::unix::{SignalKind, signal};

		match signal(SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			},
			Err(e) => {
				tracing::warn!(error = %e, "Failed to listen for SIGTERM.");

				std::future::pending::<()>().await;
			},
		}
	};
	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	tracing::info!("Shutting down token relay.");
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status_code();
		// Only configuration gaps are described to the caller.
		let body = match &self {
			Error::Config(e) => e.to_string(),
			_ => status.canonical_reason().unwrap_or("Error").to_owned(),
		};

		(status, [(CONTENT_TYPE, TEXT_PLAIN)], body).into_response()
	}
}
