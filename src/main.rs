//! Token relay server binary.
//!
//! Settings come from the environment, falling back to the `Values` section of the JSON file
//! named by `TOKEN_RELAY_SETTINGS`. `TOKEN_RELAY_ADDR` picks the listen address.

// std
use std::{env, net::SocketAddr, sync::Arc};
// crates.io
use color_eyre::Result;
use tokio::net::TcpListener;
// self
use token_relay::{
	config::{EnvSource, LayeredSource, SettingsFile},
	gateway::ReqwestGatewayClient,
	issuer::TokenIssuer,
	obs,
	reqwest::Client,
	server,
};

const SETTINGS_ENV: &str = "TOKEN_RELAY_SETTINGS";
const ADDR_ENV: &str = "TOKEN_RELAY_ADDR";
const DEFAULT_ADDR: &str = "0.0.0.0:7071";

#[tokio::main]
async fn main() -> Result<()> {
	obs::install()?;

	let mut source = LayeredSource::default().with_layer(EnvSource);

	if let Ok(path) = env::var(SETTINGS_ENV) {
		source = source.with_layer(SettingsFile::load(&path)?);

		tracing::info!(%path, "Loaded settings file.");
	}

	let gateway = Arc::new(ReqwestGatewayClient::with_client(Client::builder().build()?));
	let issuer = TokenIssuer::from_source(&source, gateway);
	let addr: SocketAddr = env::var(ADDR_ENV).as_deref().unwrap_or(DEFAULT_ADDR).parse()?;
	let listener = TcpListener::bind(addr).await?;

	server::serve(listener, server::router(issuer)).await?;

	Ok(())
}
