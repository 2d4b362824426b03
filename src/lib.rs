//! Single-endpoint relay that trades a Direct Line secret for a session token and hands callers
//! a locally signed JWT carrying it.
//!
//! A request flows through three stages: the [`issuer::TokenIssuer`] validates its
//! configuration, asks the gateway for a session token through a [`gateway::GatewayClient`],
//! then signs the claims with [`token::TokenSigner`]. [`server`] exposes the whole thing as one
//! HTTP route.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod error;
pub mod gateway;
pub mod issuer;
pub mod obs;
pub mod server;
pub mod token;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;
	pub use uuid::Uuid;

	pub use crate::error::{Error, Result};
}

pub use axum;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {base64 as _, http_body_util as _, httpmock as _, tower as _};
