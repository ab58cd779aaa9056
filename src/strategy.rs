//! The Smashrun authentication strategy.
//!
//! [`SmashrunStrategy`] is composed from an [`OAuth2Client`]: construction points the client at
//! Smashrun's endpoints (unless overridden) and switches it to the provider's request
//! conventions, `authenticate` drives the authorization code flow, and `user_profile` turns an
//! access token into a normalized [`Profile`]. The strategy holds configuration only, so one
//! instance can serve any number of concurrent authentications.

mod session;

pub use session::*;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, RefreshToken, TokenGrant},
	error::BoxError,
	http::HttpTransport,
	oauth::{OAuth2Client, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	profile::Profile,
	provider::{self, ProviderEndpoints, RequestConventions, StrategyConfig},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

/// Future returned by [`Verify::verify`].
pub type VerifyFuture<'a, U> =
	Pin<Box<dyn Future<Output = Result<Option<U>, BoxError>> + 'a + Send>>;

#[cfg(feature = "reqwest")]
/// Strategy specialized for the crate's default reqwest transport stack.
pub type ReqwestStrategy<V> = SmashrunStrategy<V, ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Application hook that turns a token grant and profile into a user.
///
/// Resolve to `Ok(Some(user))` to accept, `Ok(None)` to reject the credentials, or `Err` when
/// verification itself failed. Closures `Fn(TokenGrant, Profile) -> impl Future` implement the
/// trait automatically.
pub trait Verify
where
	Self: Send + Sync,
{
	/// User type produced on success.
	type User: Send;

	/// Verifies the grant and profile returned by the provider.
	fn verify(&self, grant: TokenGrant, profile: Profile) -> VerifyFuture<'_, Self::User>;
}
impl<F, Fut, U> Verify for F
where
	F: Send + Sync + Fn(TokenGrant, Profile) -> Fut,
	Fut: 'static + Send + Future<Output = Result<Option<U>, BoxError>>,
	U: Send,
{
	type User = U;

	fn verify(&self, grant: TokenGrant, profile: Profile) -> VerifyFuture<'_, Self::User> {
		Box::pin(self(grant, profile))
	}
}

/// Query parameters delivered to the callback URL.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackParams {
	/// Authorization code.
	pub code: Option<String>,
	/// State echoed by the provider.
	pub state: Option<String>,
	/// OAuth error code.
	pub error: Option<String>,
	/// OAuth error description.
	pub error_description: Option<String>,
	/// OAuth error URI.
	pub error_uri: Option<String>,
}
impl CallbackParams {
	/// Extracts the callback parameters from a request URL.
	pub fn from_url(url: &Url) -> Self {
		let mut params = Self::default();

		for (key, value) in url.query_pairs() {
			let slot = match key.as_ref() {
				"code" => &mut params.code,
				"state" => &mut params.state,
				"error" => &mut params.error,
				"error_description" => &mut params.error_description,
				"error_uri" => &mut params.error_uri,
				_ => continue,
			};

			*slot = Some(value.into_owned());
		}

		params
	}
}

/// Result of one [`SmashrunStrategy::authenticate`] call.
#[derive(Debug)]
pub enum AuthOutcome<U> {
	/// Send the user agent to the provider.
	Redirect(AuthorizationRequest),
	/// The verification hook accepted the user.
	Success {
		/// User produced by the verification hook.
		user: U,
	},
	/// Authentication did not succeed; the host decides how to respond.
	Fail {
		/// Human-readable reason.
		message: String,
	},
}

/// Smashrun OAuth 2.0 authentication strategy.
pub struct SmashrunStrategy<V, C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	config: StrategyConfig,
	endpoints: ProviderEndpoints,
	oauth: OAuth2Client<C, M>,
	verify: V,
}
impl<V, C, M> SmashrunStrategy<V, C, M>
where
	V: Verify,
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a strategy that reuses the caller-provided transport + mapper pair.
	///
	/// Missing endpoint URLs fall back to Smashrun's fixed endpoints. No network calls are made.
	pub fn with_http_client(
		mut config: StrategyConfig,
		verify: V,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		config.validate()?;
		config.apply_provider_defaults()?;

		let endpoints = config.endpoints()?;
		let mut oauth = OAuth2Client::new(
			&endpoints,
			&config.client_id,
			&config.client_secret,
			&config.callback_url,
			config.client_auth_method,
			http_client,
			mapper,
		)?;

		oauth.set_auth_method(RequestConventions::SMASHRUN_AUTH_METHOD);
		oauth.use_authorization_header_for_get(true);

		Ok(Self { config, endpoints, oauth, verify })
	}

	/// Strategy name used for route binding.
	pub fn name(&self) -> &'static str {
		provider::PROVIDER_NAME
	}

	/// Configuration with endpoint defaults applied.
	pub fn config(&self) -> &StrategyConfig {
		&self.config
	}

	/// Endpoints the strategy talks to.
	pub fn endpoints(&self) -> &ProviderEndpoints {
		&self.endpoints
	}

	/// Underlying OAuth 2.0 client.
	pub fn oauth_client(&self) -> &OAuth2Client<C, M> {
		&self.oauth
	}

	/// Builds a fresh authorization redirect (new state, and a PKCE pair when enabled).
	pub fn authorization_request(&self) -> AuthorizationRequest {
		const KIND: FlowKind = FlowKind::Authorize;

		let _span = FlowSpan::new(KIND, "authorization_request").entered();

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let scope = self.config.scope_param();
		let request = session::build_request(
			&self.endpoints.authorization,
			&self.config.client_id,
			&self.config.callback_url,
			scope.as_deref(),
			self.config.pkce,
		);

		obs::record_flow_outcome(KIND, FlowOutcome::Success);

		request
	}

	/// Handles one pass through the authorization code flow.
	///
	/// Without a `code` the caller gets a redirect. With one, the code is exchanged, the profile
	/// fetched, and the verification hook consulted. `pending` is the request issued on the way
	/// out; when supplied its state must match the callback's.
	pub async fn authenticate(
		&self,
		params: &CallbackParams,
		pending: Option<&AuthorizationRequest>,
	) -> Result<AuthOutcome<V::User>> {
		if let Some(code) = params.error.as_deref() {
			if code == "access_denied" {
				let message = params
					.error_description
					.clone()
					.unwrap_or_else(|| "User denied the authorization request.".into());

				return Ok(AuthOutcome::Fail { message });
			}

			return Err(Error::Authorization {
				code: code.to_owned(),
				description: params.error_description.clone(),
				uri: params.error_uri.clone(),
			});
		}

		let Some(code) = params.code.as_deref() else {
			return Ok(AuthOutcome::Redirect(self.authorization_request()));
		};

		if let Some(request) = pending {
			if !request.matches_state(params.state.as_deref()) {
				return Ok(AuthOutcome::Fail {
					message: "Unable to verify authorization request state.".into(),
				});
			}
		} else if self.config.pkce {
			return Ok(AuthOutcome::Fail {
				message: "Unable to verify authorization request state.".into(),
			});
		}

		let verifier = pending.and_then(AuthorizationRequest::pkce_verifier);
		let grant = obs::observe(
			FlowKind::TokenExchange,
			"exchange_code",
			self.oauth.exchange_code(code, verifier),
		)
		.await?;
		let profile = self.user_profile(&grant.access_token).await?;

		match self.verify.verify(grant, profile).await {
			Ok(Some(user)) => Ok(AuthOutcome::Success { user }),
			Ok(None) =>
				Ok(AuthOutcome::Fail { message: "User verification rejected the login.".into() }),
			Err(source) => Err(Error::verify(source)),
		}
	}

	/// Exchanges a refresh token for a new grant.
	pub async fn refresh(&self, refresh_token: &RefreshToken) -> Result<TokenGrant> {
		obs::observe(
			FlowKind::Refresh,
			"refresh",
			self.oauth.exchange_refresh_token(refresh_token),
		)
		.await
	}

	/// Fetches the user-info document and normalizes it into a [`Profile`].
	///
	/// Transport failures and non-2xx statuses become [`Error::UpstreamFetch`]; bodies that are
	/// not a usable JSON profile become [`Error::ResponseParse`]. Nothing is retried or cached.
	pub async fn user_profile(&self, access_token: &AccessToken) -> Result<Profile> {
		obs::observe(FlowKind::UserProfile, "user_profile", async move {
			let response = self
				.oauth
				.get(&self.endpoints.user_profile, access_token)
				.await
				.map_err(Error::upstream_fetch)?;

			Profile::parse(&response.body)
		})
		.await
	}
}
#[cfg(feature = "reqwest")]
impl<V> SmashrunStrategy<V, ReqwestHttpClient, ReqwestTransportErrorMapper>
where
	V: Verify,
{
	/// Creates a strategy backed by a default reqwest transport.
	pub fn new(config: StrategyConfig, verify: V) -> Result<Self> {
		Self::with_http_client(
			config,
			verify,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<V, C, M> Debug for SmashrunStrategy<V, C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SmashrunStrategy")
			.field("name", &provider::PROVIDER_NAME)
			.field("endpoints", &self.endpoints)
			.field("client_id", &self.config.client_id)
			.field("conventions", self.oauth.conventions())
			.finish()
	}
}
