//! Generic OAuth 2.0 client the strategy is composed from.
//!
//! [`OAuth2Client`] wraps an `oauth2` [`BasicClient`] for the code and refresh exchanges and adds
//! the authenticated GET primitive used for protected resources. Its request conventions (the
//! `Authorization` scheme and header-vs-query token placement) are adjustable after
//! construction, which is how providers with non-standard requirements are accommodated.

pub use oauth2;

// crates.io
use oauth2::{
	AsyncHttpClient, AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet,
	EndpointSet, HttpClientError, PkceCodeVerifier, RedirectUrl, RequestTokenError, TokenResponse,
	TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, RefreshToken, TokenGrant},
	error::{ConfigError, TransientError, TransportError},
	http::{HttpTransport, ResponseMetadata, ResponseMetadataSlot},
	provider::{
		ClientAuthMethod, ProviderEndpoints, RequestConventions, TokenErrorContext, TokenErrorKind,
	},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Maps HTTP transport failures into [`TransportError`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport.
	fn map_transport_error(
		&self,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> TransportError;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> TransportError {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(meta, *inner),
			HttpClientError::Http(inner) => TransportError::network(inner),
			HttpClientError::Io(inner) => TransportError::Io(inner),
			HttpClientError::Other(message) => TransportError::Other { message },
			other => TransportError::Other { message: other.to_string() },
		}
	}
}

/// Response of an authenticated GET request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceResponse {
	/// HTTP status code.
	pub status: u16,
	/// Body decoded as UTF-8 (lossily).
	pub body: String,
}

/// OAuth 2.0 client bound to one provider's endpoints and one transport.
pub struct OAuth2Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
	conventions: RequestConventions,
}
impl<C, M> OAuth2Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds a client for `endpoints`, validating the client identifier and URLs.
	///
	/// Requests start with plain OAuth 2.0 conventions (`Bearer` scheme, token in the query
	/// string for GET requests).
	pub fn new(
		endpoints: &ProviderEndpoints,
		client_id: &str,
		client_secret: &str,
		callback_url: &Url,
		auth_method: ClientAuthMethod,
		http_client: impl Into<Arc<C>>,
		error_mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		if client_id.trim().is_empty() {
			return Err(ConfigError::MissingClientId.into());
		}

		let auth_url = AuthUrl::new(endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "authorization", source })?;
		let token_url = TokenUrl::new(endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "token", source })?;
		let redirect_url = RedirectUrl::new(callback_url.to_string())
			.map_err(|source| ConfigError::InvalidCallback { source })?;
		let mut oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url);

		if matches!(auth_method, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(Self {
			oauth_client,
			http_client: http_client.into(),
			error_mapper: error_mapper.into(),
			conventions: RequestConventions::default(),
		})
	}

	/// Sets the scheme prefixed to the access token in the `Authorization` header.
	pub fn set_auth_method(&mut self, auth_method: impl Into<String>) {
		self.conventions.auth_method = auth_method.into();
	}

	/// Chooses header (`true`) or `access_token` query parameter (`false`) placement for GET
	/// requests.
	pub fn use_authorization_header_for_get(&mut self, use_header: bool) {
		self.conventions.use_authorization_header_for_get = use_header;
	}

	/// Current request conventions.
	pub fn conventions(&self) -> &RequestConventions {
		&self.conventions
	}

	/// Client identifier sent to the provider.
	pub fn client_id(&self) -> &str {
		self.oauth_client.client_id().as_str()
	}

	/// Authorization endpoint.
	pub fn authorization_url(&self) -> &str {
		self.oauth_client.auth_uri().as_str()
	}

	/// Token endpoint.
	pub fn token_url(&self) -> &str {
		self.oauth_client.token_uri().as_str()
	}

	/// Redirect URI registered for the client.
	pub fn redirect_url(&self) -> Option<&str> {
		self.oauth_client.redirect_uri().map(|url| url.as_str())
	}

	/// Exchanges an authorization code for a token grant.
	pub async fn exchange_code(
		&self,
		code: &str,
		pkce_verifier: Option<&str>,
	) -> Result<TokenGrant> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let mut request = self.oauth_client.exchange_code(AuthorizationCode::new(code.to_owned()));

		if let Some(verifier) = pkce_verifier {
			request = request.set_pkce_verifier(PkceCodeVerifier::new(verifier.to_owned()));
		}

		let response = request
			.request_async(&instrumented)
			.await
			.map_err(|err| self.map_request_error(meta.take(), err))?;

		map_token_response(response)
	}

	/// Exchanges a refresh token for a new token grant.
	pub async fn exchange_refresh_token(&self, refresh_token: &RefreshToken) -> Result<TokenGrant> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let secret = oauth2::RefreshToken::new(refresh_token.expose().to_owned());
		let response = self
			.oauth_client
			.exchange_refresh_token(&secret)
			.request_async(&instrumented)
			.await
			.map_err(|err| self.map_request_error(meta.take(), err))?;

		map_token_response(response)
	}

	/// Issues a GET request for a protected resource.
	///
	/// The access token travels in the `Authorization` header or the `access_token` query
	/// parameter, according to the current conventions. Non-2xx responses are reported as
	/// [`TransportError::Status`].
	pub async fn get(
		&self,
		url: &Url,
		access_token: &AccessToken,
	) -> Result<ResourceResponse, TransportError> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let request = self.build_get(url, access_token)?;
		let response = instrumented
			.call(request)
			.await
			.map_err(|err| self.error_mapper.map_transport_error(meta.take().as_ref(), err))?;
		let status = response.status().as_u16();
		let body = String::from_utf8_lossy(response.body()).into_owned();

		if !response.status().is_success() {
			return Err(TransportError::Status { status, body });
		}

		Ok(ResourceResponse { status, body })
	}

	fn build_get(
		&self,
		url: &Url,
		access_token: &AccessToken,
	) -> Result<oauth2::HttpRequest, TransportError> {
		let mut target = url.clone();
		let mut builder = Request::builder().method(Method::GET).header(ACCEPT, "application/json");

		if self.conventions.use_authorization_header_for_get {
			let value = self.conventions.authorization_header(access_token.expose());

			builder = builder.header(AUTHORIZATION, value);
		} else {
			target.query_pairs_mut().append_pair("access_token", access_token.expose());
		}

		builder.uri(target.as_str()).body(Vec::new()).map_err(TransportError::network)
	}

	fn map_request_error(
		&self,
		meta: Option<ResponseMetadata>,
		err: BasicRequestTokenError<HttpClientError<C::TransportError>>,
	) -> Error {
		let meta_ref = meta.as_ref();

		match err {
			RequestTokenError::ServerResponse(response) =>
				map_server_response_error(response, meta_ref),
			RequestTokenError::Request(error) =>
				self.error_mapper.map_transport_error(meta_ref, error).into(),
			RequestTokenError::Parse(error, _body) =>
				TransientError::TokenResponseParse { source: error, status: meta_status(meta_ref) }
					.into(),
			RequestTokenError::Other(message) => TransientError::TokenEndpoint {
				message,
				status: meta_status(meta_ref),
				retry_after: meta_retry_after(meta_ref),
			}
			.into(),
		}
	}
}
#[cfg(feature = "reqwest")]
impl OAuth2Client<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Builds a client backed by a default reqwest transport.
	pub fn with_reqwest(
		endpoints: &ProviderEndpoints,
		client_id: &str,
		client_secret: &str,
		callback_url: &Url,
		auth_method: ClientAuthMethod,
	) -> Result<Self> {
		Self::new(
			endpoints,
			client_id,
			client_secret,
			callback_url,
			auth_method,
			ReqwestHttpClient::default(),
			ReqwestTransportErrorMapper,
		)
	}
}
impl<C, M> Debug for OAuth2Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Client")
			.field("client_id", &self.client_id())
			.field("authorization_url", &self.authorization_url())
			.field("token_url", &self.token_url())
			.field("conventions", &self.conventions)
			.finish()
	}
}

fn map_token_response(response: BasicTokenResponse) -> Result<TokenGrant> {
	let issued_at = OffsetDateTime::now_utc();
	let expires_at = match response.expires_in() {
		Some(lifetime) => {
			let secs = i64::try_from(lifetime.as_secs())
				.map_err(|_| ConfigError::ExpiresInOutOfRange)?;
			let expires_at = issued_at
				.checked_add(Duration::seconds(secs))
				.ok_or(ConfigError::ExpiresInOutOfRange)?;

			Some(expires_at)
		},
		None => None,
	};

	Ok(TokenGrant {
		access_token: AccessToken::new(response.access_token().secret().to_owned()),
		refresh_token: response
			.refresh_token()
			.map(|token| RefreshToken::new(token.secret().to_owned())),
		token_type: response.token_type().as_ref().to_owned(),
		issued_at,
		expires_at,
		scopes: response
			.scopes()
			.map(|scopes| scopes.iter().map(|scope| scope.as_str().to_owned()).collect()),
	})
}

fn map_server_response_error(
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> Error {
	let mut ctx =
		TokenErrorContext::default().with_oauth_error(response.error().as_ref().to_string());

	if let Some(description) = response.error_description() {
		ctx = ctx.with_error_description(description.clone());
	}
	if let Some(status) = meta_status(meta) {
		ctx = ctx.with_http_status(status);
	}

	let message = match response.error_description() {
		Some(description) => format!("Token endpoint returned an OAuth error: {description}"),
		None => format!("Token endpoint returned an OAuth error: {}", response.error().as_ref()),
	};

	match ctx.classify() {
		TokenErrorKind::InvalidGrant => Error::InvalidGrant { reason: message },
		TokenErrorKind::InvalidClient => Error::InvalidClient { reason: message },
		TokenErrorKind::InsufficientScope => Error::InsufficientScope { reason: message },
		TokenErrorKind::Transient => TransientError::TokenEndpoint {
			message,
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(meta: Option<&ResponseMetadata>, err: ReqwestError) -> TransportError {
	if err.is_timeout() {
		return TransportError::Timeout {
			status: meta_status(meta).or_else(|| err.status().map(|code| code.as_u16())),
		};
	}

	TransportError::from(err)
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}
