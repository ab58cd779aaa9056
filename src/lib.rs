//! Smashrun OAuth 2.0 authentication strategy built on the `oauth2` crate.
//!
//! The strategy knows Smashrun's fixed endpoints, speaks the provider's non-standard request
//! conventions (`Authorization: OAuth <token>` on GET requests) and normalizes the user-info
//! document into a [`profile::Profile`] for the application's verification hook.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod profile;
pub mod provider;
pub mod strategy;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::io::Error as IoError;
	// crates.io
	use oauth2::{
		AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
		http::{Response, header::CONTENT_TYPE},
	};
	// self
	use crate::{
		auth::AccessToken,
		error::TransportError,
		http::{HttpTransport, ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
		oauth::{ReqwestTransportErrorMapper, TransportErrorMapper},
		provider::StrategyConfig,
		strategy::{SmashrunStrategy, Verify},
	};

	/// Client identifier shared by integration fixtures.
	pub const TEST_CLIENT_ID: &str = "abc";
	/// Client secret shared by integration fixtures.
	pub const TEST_CLIENT_SECRET: &str = "xyz";
	/// Callback URL shared by integration fixtures.
	pub const TEST_CALLBACK_URL: &str = "https://app.test/cb";

	/// Strategy type alias used by reqwest-backed integration tests.
	pub type ReqwestTestStrategy<V> =
		SmashrunStrategy<V, ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Minimal configuration carrying only the mandatory client fields.
	pub fn test_config() -> StrategyConfig {
		StrategyConfig::new(
			TEST_CLIENT_ID,
			TEST_CLIENT_SECRET,
			Url::parse(TEST_CALLBACK_URL).expect("Callback URL fixture should parse."),
		)
	}

	/// Shorthand for wrapping a raw access token fixture.
	pub fn test_access_token(value: &str) -> AccessToken {
		AccessToken::new(value)
	}

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`SmashrunStrategy`] backed by the insecure reqwest transport used across
	/// integration tests.
	pub fn build_reqwest_test_strategy<V>(
		config: StrategyConfig,
		verify: V,
	) -> ReqwestTestStrategy<V>
	where
		V: Verify,
	{
		SmashrunStrategy::with_http_client(
			config,
			verify,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
		.expect("Test strategy should build from the fixture configuration.")
	}

	/// Strategy type alias used by tests that run against [`ScriptedTransport`].
	pub type ScriptedStrategy<V> = SmashrunStrategy<V, ScriptedTransport, ScriptedErrorMapper>;

	/// Constructs a [`SmashrunStrategy`] that talks to `transport` instead of the network.
	pub fn build_scripted_strategy<V>(
		config: StrategyConfig,
		verify: V,
		transport: &ScriptedTransport,
	) -> ScriptedStrategy<V>
	where
		V: Verify,
	{
		SmashrunStrategy::with_http_client(
			config,
			verify,
			transport.clone(),
			ScriptedErrorMapper,
		)
		.expect("Scripted strategy should build from the fixture configuration.")
	}

	/// Canned answer served by [`ScriptedTransport`] for one URL path.
	#[derive(Clone, Debug)]
	pub enum ScriptedReply {
		/// Respond with a JSON body and the given status.
		Json {
			/// HTTP status code.
			status: u16,
			/// Response body.
			body: String,
		},
		/// Fail before any response arrives.
		Fail(String),
	}
	impl ScriptedReply {
		/// `200 OK` carrying `body`.
		pub fn ok(body: impl Into<String>) -> Self {
			Self::Json { status: 200, body: body.into() }
		}

		/// Response with an explicit status.
		pub fn status(status: u16, body: impl Into<String>) -> Self {
			Self::Json { status, body: body.into() }
		}
	}

	/// Request observed by [`ScriptedTransport`].
	#[derive(Clone, Debug)]
	pub struct RecordedRequest {
		/// HTTP method.
		pub method: String,
		/// Full request URL.
		pub url: Url,
		/// Request headers, lower-cased names.
		pub headers: BTreeMap<String, String>,
		/// Request body decoded as UTF-8.
		pub body: String,
	}
	impl RecordedRequest {
		/// Header value by lower-case name.
		pub fn header(&self, name: &str) -> Option<&str> {
			self.headers.get(name).map(String::as_str)
		}

		/// Query parameter value by name.
		pub fn query(&self, name: &str) -> Option<String> {
			self.url.query_pairs().find(|(key, _)| key == name).map(|(_, value)| value.into_owned())
		}

		/// Form body parameter value by name.
		pub fn form(&self, name: &str) -> Option<String> {
			url::form_urlencoded::parse(self.body.as_bytes())
				.find(|(key, _)| key == name)
				.map(|(_, value)| value.into_owned())
		}
	}

	/// In-memory transport that answers by URL path and records every request.
	#[derive(Clone, Debug, Default)]
	pub struct ScriptedTransport {
		routes: Arc<Mutex<BTreeMap<String, ScriptedReply>>>,
		requests: Arc<Mutex<Vec<RecordedRequest>>>,
	}
	impl ScriptedTransport {
		/// Registers the reply served for `path`.
		pub fn route(&self, path: &str, reply: ScriptedReply) -> &Self {
			self.routes.lock().insert(path.to_owned(), reply);

			self
		}

		/// Requests observed so far, oldest first.
		pub fn requests(&self) -> Vec<RecordedRequest> {
			self.requests.lock().clone()
		}

		/// Requests observed for `path`.
		pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
			self.requests
				.lock()
				.iter()
				.filter(|request| request.url.path() == path)
				.cloned()
				.collect()
		}

		fn answer(&self, request: HttpRequest) -> Result<(u16, String), IoError> {
			let url = Url::parse(&request.uri().to_string()).map_err(IoError::other)?;
			let headers = request
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
				})
				.collect();
			let reply = self.routes.lock().get(url.path()).cloned();

			self.requests.lock().push(RecordedRequest {
				method: request.method().to_string(),
				url: url.clone(),
				headers,
				body: String::from_utf8_lossy(request.body()).into_owned(),
			});

			match reply {
				Some(ScriptedReply::Json { status, body }) => Ok((status, body)),
				Some(ScriptedReply::Fail(message)) => Err(IoError::other(message)),
				None => Ok((404, format!("{{\"error\":\"no route for {}\"}}", url.path()))),
			}
		}
	}
	impl HttpTransport for ScriptedTransport {
		type Handle = ScriptedHandle;
		type TransportError = IoError;

		fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
			ScriptedHandle { transport: self.clone(), slot }
		}
	}

	/// Handle returned by [`ScriptedTransport`].
	#[derive(Clone, Debug)]
	pub struct ScriptedHandle {
		transport: ScriptedTransport,
		slot: ResponseMetadataSlot,
	}
	impl<'c> AsyncHttpClient<'c> for ScriptedHandle {
		type Error = HttpClientError<IoError>;
		type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

		fn call(&'c self, request: HttpRequest) -> Self::Future {
			Box::pin(async move { self.respond(request) })
		}
	}
	impl ScriptedHandle {
		fn respond(&self, request: HttpRequest) -> Result<HttpResponse, HttpClientError<IoError>> {
			self.slot.take();

			let (status, body) = self.transport.answer(request)?;

			self.slot.store(ResponseMetadata { status: Some(status), retry_after: None });

			Ok(Response::builder()
				.status(status)
				.header(CONTENT_TYPE, "application/json")
				.body(body.into_bytes())?)
		}
	}

	/// Error mapper paired with [`ScriptedTransport`].
	#[derive(Clone, Copy, Debug, Default)]
	pub struct ScriptedErrorMapper;
	impl TransportErrorMapper<IoError> for ScriptedErrorMapper {
		fn map_transport_error(
			&self,
			_: Option<&ResponseMetadata>,
			error: HttpClientError<IoError>,
		) -> TransportError {
			match error {
				HttpClientError::Io(inner) => TransportError::Io(inner),
				other => TransportError::network(other),
			}
		}
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
