//! Settings sources and the relay's immutable configuration.
//!
//! Values are read once, when the issuer is built, through a [`ConfigSource`]. Presence is
//! checked later, per request, by [`RelayConfig::validate`], so a half-configured process still
//! starts and answers every call with a descriptive `400`.

// std
use std::{env, fs, path::Path};
// self
use crate::{_prelude::*, error::ConfigError};

/// Setting carrying the bearer credential sent to the gateway.
pub const SECRET_KEY: &str = "secret";
/// Setting carrying the HMAC key used to sign issued tokens.
pub const APP_SECRET_KEY: &str = "appSecret";
/// Setting carrying the gateway endpoint.
pub const DIRECT_LINE_URI_KEY: &str = "directLineUri";
/// Optional setting carrying the invocation key callers must present.
pub const FUNCTION_KEY_KEY: &str = "functionKey";

/// Read-only lookup of string settings by key.
pub trait ConfigSource
where
	Self: Send + Sync,
{
	/// Returns the raw value for `key`, if the source defines it.
	fn get(&self, key: &str) -> Option<String>;
}

/// Reads settings from the process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvSource;
impl ConfigSource for EnvSource {
	fn get(&self, key: &str) -> Option<String> {
		env::var(key).ok()
	}
}

/// In-memory settings, mainly for tests and embedding.
#[derive(Clone, Debug, Default)]
pub struct MapSource(BTreeMap<String, String>);
impl MapSource {
	/// Inserts or replaces one setting.
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.0.insert(key.into(), value.into());
	}

	/// Removes one setting, returning the previous value.
	pub fn remove(&mut self, key: &str) -> Option<String> {
		self.0.remove(key)
	}
}
impl<K, V> FromIterator<(K, V)> for MapSource
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}
impl ConfigSource for MapSource {
	fn get(&self, key: &str) -> Option<String> {
		self.0.get(key).cloned()
	}
}

/// Settings file in the `local.settings.json` layout used by Functions hosts.
///
/// Only the `Values` object is consulted; every other top-level field is ignored.
#[derive(Clone, Debug, Default)]
pub struct SettingsFile {
	values: MapSource,
}
impl SettingsFile {
	/// Loads and parses the file at `path`.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let raw = fs::read_to_string(path)
			.map_err(|source| ConfigError::SettingsRead { path: path.to_owned(), source })?;

		Self::parse(&raw)
			.map_err(|source| ConfigError::SettingsParse { path: path.to_owned(), source })
	}

	/// Parses settings from a JSON document.
	pub fn parse(raw: &str) -> Result<Self, serde_path_to_error::Error<serde_json::Error>> {
		#[derive(Deserialize)]
		struct Document {
			#[serde(rename = "Values", default)]
			values: BTreeMap<String, String>,
		}

		let mut de = serde_json::Deserializer::from_str(raw);
		let document: Document = serde_path_to_error::deserialize(&mut de)?;

		Ok(Self { values: MapSource(document.values) })
	}
}
impl ConfigSource for SettingsFile {
	fn get(&self, key: &str) -> Option<String> {
		self.values.get(key)
	}
}

/// Ordered stack of sources; the first non-empty value wins.
#[derive(Default)]
pub struct LayeredSource {
	layers: Vec<Box<dyn ConfigSource>>,
}
impl LayeredSource {
	/// Appends a lower-priority layer.
	pub fn with_layer(mut self, layer: impl 'static + ConfigSource) -> Self {
		self.layers.push(Box::new(layer));

		self
	}
}
impl ConfigSource for LayeredSource {
	fn get(&self, key: &str) -> Option<String> {
		self.layers.iter().filter_map(|layer| layer.get(key)).find(|value| !value.is_empty())
	}
}
impl Debug for LayeredSource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "LayeredSource({} layers)", self.layers.len())
	}
}

/// Redacted secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);
impl Secret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Secret").field(&"<redacted>").finish()
	}
}
impl Display for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Settings captured at construction time. Nothing here is validated until a request arrives.
#[derive(Clone, Debug, Default)]
pub struct RelayConfig {
	/// Bearer credential for the gateway (`secret`).
	pub secret: Option<Secret>,
	/// HMAC signing key (`appSecret`).
	pub app_secret: Option<Secret>,
	/// Gateway endpoint (`directLineUri`).
	pub direct_line_uri: Option<String>,
	/// Invocation key callers must present (`functionKey`); absent means the route is open.
	pub function_key: Option<Secret>,
}
impl RelayConfig {
	/// Captures the relay settings from `source` without validating them.
	pub fn from_source(source: &(impl ?Sized + ConfigSource)) -> Self {
		Self {
			secret: source.get(SECRET_KEY).map(Secret::new),
			app_secret: source.get(APP_SECRET_KEY).map(Secret::new),
			direct_line_uri: source.get(DIRECT_LINE_URI_KEY),
			function_key: source.get(FUNCTION_KEY_KEY).filter(|v| !v.is_empty()).map(Secret::new),
		}
	}

	/// Checks that every required value is present and non-empty.
	///
	/// Order is `secret`, `appSecret`, `directLineUri`; the first gap is reported.
	pub fn validate(&self) -> Result<ValidatedConfig<'_>, ConfigError> {
		let secret = present(self.secret.as_ref(), SECRET_KEY)?;
		let app_secret = present(self.app_secret.as_ref(), APP_SECRET_KEY)?;
		let direct_line_uri = self
			.direct_line_uri
			.as_deref()
			.filter(|uri| !uri.is_empty())
			.ok_or(ConfigError::Missing { key: DIRECT_LINE_URI_KEY })?;

		Ok(ValidatedConfig { secret, app_secret, direct_line_uri })
	}
}

/// Borrowed view of a [`RelayConfig`] whose required values are known to be set.
#[derive(Clone, Copy, Debug)]
pub struct ValidatedConfig<'a> {
	/// Bearer credential for the gateway.
	pub secret: &'a Secret,
	/// HMAC signing key.
	pub app_secret: &'a Secret,
	/// Gateway endpoint, unparsed.
	pub direct_line_uri: &'a str,
}

fn present<'a>(value: Option<&'a Secret>, key: &'static str) -> Result<&'a Secret, ConfigError> {
	value.filter(|secret| !secret.is_empty()).ok_or(ConfigError::Missing { key })
}
