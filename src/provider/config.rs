//! Application-facing strategy configuration and endpoint resolution.

// self
use crate::{
	_prelude::*,
	auth::ScopeList,
	error::ConfigError,
	provider::{self, ClientAuthMethod},
};

/// Settings supplied by the application when constructing the strategy.
///
/// Keys also deserialize from their camel-case spellings (`clientID`, `callbackURL`,
/// `authorizationURL`, `tokenURL`, ...), so existing JSON configuration can be reused as is.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
	/// OAuth 2.0 client identifier.
	#[serde(alias = "clientID")]
	pub client_id: String,
	/// OAuth 2.0 client secret.
	#[serde(alias = "clientSecret")]
	pub client_secret: String,
	/// Redirect URI registered with the provider.
	#[serde(alias = "callbackURL")]
	pub callback_url: Url,
	/// Authorization endpoint override; Smashrun's endpoint is used when absent.
	#[serde(default, alias = "authorizationURL")]
	pub authorization_url: Option<Url>,
	/// Token endpoint override; Smashrun's endpoint is used when absent.
	#[serde(default, alias = "tokenURL")]
	pub token_url: Option<Url>,
	/// Scopes requested on the authorization redirect.
	#[serde(default)]
	pub scope: ScopeList,
	/// Character used to join scopes.
	#[serde(default = "default_scope_separator", alias = "scopeSeparator")]
	pub scope_separator: char,
	/// Attaches an S256 PKCE challenge to the authorization redirect.
	#[serde(default)]
	pub pkce: bool,
	/// How the client authenticates against the token endpoint.
	#[serde(default)]
	pub client_auth_method: ClientAuthMethod,
}
impl StrategyConfig {
	/// Creates a configuration carrying only the mandatory client fields.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		callback_url: Url,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			callback_url,
			authorization_url: None,
			token_url: None,
			scope: ScopeList::default(),
			scope_separator: default_scope_separator(),
			pkce: false,
			client_auth_method: ClientAuthMethod::default(),
		}
	}

	/// Creates a new builder for the provided client fields.
	pub fn builder(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		callback_url: Url,
	) -> StrategyConfigBuilder {
		StrategyConfigBuilder { config: Self::new(client_id, client_secret, callback_url) }
	}

	/// Fills absent endpoint URLs with Smashrun's fixed endpoints.
	///
	/// Supplied URLs are never replaced.
	pub fn apply_provider_defaults(&mut self) -> Result<(), ConfigError> {
		if self.authorization_url.is_none() {
			self.authorization_url =
				Some(parse_fixed("authorization", provider::AUTHORIZATION_URL)?);
		}
		if self.token_url.is_none() {
			self.token_url = Some(parse_fixed("token", provider::TOKEN_URL)?);
		}

		Ok(())
	}

	/// Resolves the endpoint set, applying the fixed defaults where needed.
	pub fn endpoints(&self) -> Result<ProviderEndpoints, ConfigError> {
		let authorization = match &self.authorization_url {
			Some(url) => url.clone(),
			None => parse_fixed("authorization", provider::AUTHORIZATION_URL)?,
		};
		let token = match &self.token_url {
			Some(url) => url.clone(),
			None => parse_fixed("token", provider::TOKEN_URL)?,
		};
		let user_profile = parse_fixed("user_profile", provider::USER_PROFILE_URL)?;

		Ok(ProviderEndpoints { authorization, token, user_profile })
	}

	/// Validates local invariants that do not belong to the OAuth client.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.scope_separator.is_control() {
			return Err(ConfigError::InvalidScopeSeparator { separator: self.scope_separator });
		}

		Ok(())
	}

	/// Scope parameter value for the authorization redirect.
	pub fn scope_param(&self) -> Option<String> {
		self.scope.join(self.scope_separator)
	}
}

impl Debug for StrategyConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StrategyConfig")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &!self.client_secret.is_empty())
			.field("callback_url", &self.callback_url.as_str())
			.field("authorization_url", &self.authorization_url.as_ref().map(Url::as_str))
			.field("token_url", &self.token_url.as_ref().map(Url::as_str))
			.field("scope", &self.scope)
			.field("scope_separator", &self.scope_separator)
			.field("pkce", &self.pkce)
			.field("client_auth_method", &self.client_auth_method)
			.finish()
	}
}

/// Builder for [`StrategyConfig`] values.
#[derive(Debug)]
pub struct StrategyConfigBuilder {
	config: StrategyConfig,
}
impl StrategyConfigBuilder {
	/// Overrides the authorization endpoint.
	pub fn authorization_url(mut self, url: Url) -> Self {
		self.config.authorization_url = Some(url);

		self
	}

	/// Overrides the token endpoint.
	pub fn token_url(mut self, url: Url) -> Self {
		self.config.token_url = Some(url);

		self
	}

	/// Sets the requested scopes.
	pub fn scope(mut self, scope: ScopeList) -> Self {
		self.config.scope = scope;

		self
	}

	/// Overrides the scope separator.
	pub fn scope_separator(mut self, separator: char) -> Self {
		self.config.scope_separator = separator;

		self
	}

	/// Enables or disables PKCE.
	pub fn pkce(mut self, enabled: bool) -> Self {
		self.config.pkce = enabled;

		self
	}

	/// Overrides the client authentication method.
	pub fn client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.config.client_auth_method = method;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<StrategyConfig, ConfigError> {
		self.config.validate()?;

		Ok(self.config)
	}
}

/// Endpoint set used by the strategy after defaults are applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint used for the redirect.
	pub authorization: Url,
	/// Token endpoint used for code exchanges and refreshes.
	pub token: Url,
	/// User-info endpoint queried for the profile.
	pub user_profile: Url,
}

fn default_scope_separator() -> char {
	' '
}

fn parse_fixed(endpoint: &'static str, value: &str) -> Result<Url, ConfigError> {
	Url::parse(value).map_err(|source| ConfigError::InvalidEndpoint { endpoint, source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn callback() -> Url {
		Url::parse("https://app.test/cb").expect("Callback fixture should parse.")
	}

	#[test]
	fn defaults_fill_only_missing_endpoints() {
		let custom = Url::parse("https://auth.example.com/authorize")
			.expect("Authorization override should parse.");
		let mut config = StrategyConfig::builder("abc", "xyz", callback())
			.authorization_url(custom.clone())
			.build()
			.expect("Configuration should build.");

		config.apply_provider_defaults().expect("Fixed endpoints must parse.");

		assert_eq!(config.authorization_url, Some(custom));
		assert_eq!(
			config.token_url.as_ref().map(Url::as_str),
			Some("https://secure.smashrun.com/oauth2/token")
		);
	}

	#[test]
	fn deserializes_camel_case_keys() {
		let config: StrategyConfig = serde_json::from_str(concat!(
			r#"{"clientID":"abc","clientSecret":"xyz","callbackURL":"https://app.test/cb","#,
			r#""tokenURL":"https://token.example.com/t","scopeSeparator":","}"#,
		))
		.expect("Camel-case configuration should deserialize.");

		assert_eq!(config.client_id, "abc");
		assert_eq!(config.authorization_url, None);
		assert_eq!(config.token_url.as_ref().map(Url::as_str), Some("https://token.example.com/t"));
		assert_eq!(config.scope_separator, ',');
		assert_eq!(config.client_auth_method, ClientAuthMethod::ClientSecretPost);
	}

	#[test]
	fn debug_output_redacts_client_secret() {
		let config = StrategyConfig::builder("abc", "s3cr3t-value", callback())
			.build()
			.expect("Configuration should build.");
		let rendered = format!("{config:?}");
		let builder = format!("{:?}", StrategyConfig::builder("abc", "s3cr3t-value", callback()));

		assert!(rendered.contains("client_secret_set: true"));
		assert!(!rendered.contains("s3cr3t-value"));
		assert!(!builder.contains("s3cr3t-value"));
	}

	#[test]
	fn control_separator_is_rejected() {
		let err = StrategyConfig::builder("abc", "xyz", callback())
			.scope_separator('\n')
			.build()
			.expect_err("Control characters cannot separate scopes.");

		assert!(matches!(err, ConfigError::InvalidScopeSeparator { separator: '\n' }));
	}

	#[test]
	fn scope_param_uses_separator() {
		let config = StrategyConfig::builder("abc", "xyz", callback())
			.scope(ScopeList::new(["read_activity", "write_activity"]).expect("Scopes are valid."))
			.scope_separator(',')
			.build()
			.expect("Configuration should build.");

		assert_eq!(config.scope_param(), Some("read_activity,write_activity".into()));
	}
}
