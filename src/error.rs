//! Strategy-level error types shared across the engine, transport, and profile mapping.

// self
use crate::_prelude::*;

/// Strategy-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error used for transport and application-supplied failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical strategy error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary token endpoint failure; the caller decides whether to retry.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS) while calling the token endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The user-info endpoint could not be reached or answered with a failure status.
	#[error("Failed to fetch user profile.")]
	UpstreamFetch {
		/// Underlying transport failure.
		#[source]
		source: TransportError,
	},
	/// The user-info endpoint answered with a body that is not a usable profile document.
	#[error("User profile response could not be parsed{}.", fmt_path(.path))]
	ResponseParse {
		/// JSON path of the offending field, when the document itself was well formed.
		path: Option<String>,
		/// Structured parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// The provider redirected back with an OAuth error other than `access_denied`.
	#[error("Authorization endpoint returned an error: {code}.")]
	Authorization {
		/// OAuth `error` code.
		code: String,
		/// Optional `error_description` value.
		description: Option<String>,
		/// Optional `error_uri` value.
		uri: Option<String>,
	},
	/// The application's verification hook failed.
	#[error("User verification failed.")]
	Verify {
		/// Application-supplied failure.
		#[source]
		source: BoxError,
	},

	/// Requested scopes exceed what was granted.
	#[error("Token lacks the required scopes: {reason}.")]
	InsufficientScope {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Provider rejected the grant (e.g., bad code or refresh token).
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider-supplied reason string.
		reason: String,
	},
}
impl Error {
	/// Wraps a transport failure raised while fetching the user profile.
	pub fn upstream_fetch(source: impl Into<TransportError>) -> Self {
		Self::UpstreamFetch { source: source.into() }
	}

	/// Wraps an application verification failure.
	pub fn verify(source: impl Into<BoxError>) -> Self {
		Self::Verify { source: source.into() }
	}

	/// Stable snake-case label for span fields and metric labels.
	pub fn label(&self) -> &'static str {
		match self {
			Self::Config(_) => "config",
			Self::Transient(_) => "transient",
			Self::Transport(_) => "transport",
			Self::UpstreamFetch { .. } => "upstream_fetch",
			Self::ResponseParse { .. } => "response_parse",
			Self::Authorization { .. } => "authorization",
			Self::Verify { .. } => "verify",
			Self::InsufficientScope { .. } => "insufficient_scope",
			Self::InvalidGrant { .. } => "invalid_grant",
			Self::InvalidClient { .. } => "invalid_client",
		}
	}
}

/// Configuration and validation failures raised while building the strategy.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// The client identifier is empty.
	#[error("Strategy requires a client identifier.")]
	MissingClientId,
	/// An endpoint URL cannot be used by the OAuth client.
	#[error("The {endpoint} endpoint is invalid.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Callback URL cannot be parsed.
	#[error("Callback URL is invalid.")]
	InvalidCallback {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Scope separator is a control character.
	#[error("Scope separator must be a printable character.")]
	InvalidScopeSeparator {
		/// Invalid separator that was supplied.
		separator: char,
	},
	/// A scope entry is empty or contains whitespace.
	#[error("Scope `{scope}` is invalid.")]
	InvalidScope {
		/// Offending scope value.
		scope: String,
	},
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
}

/// Temporary token endpoint failures (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Provider returned an unexpected but non-fatal response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Provider- or strategy-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO, HTTP status).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request did not complete before the transport's deadline.
	#[error("Request to the provider timed out.")]
	Timeout {
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Provider answered with a non-success status code.
	#[error("Provider responded with HTTP status {status}.")]
	Status {
		/// HTTP status code returned by the provider.
		status: u16,
		/// Response body returned alongside the status.
		body: String,
	},
	/// HTTP client failed without a structured cause.
	#[error("HTTP client error occurred while calling the provider: {message}.")]
	Other {
		/// Transport-supplied message.
		message: String,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// HTTP status attached to the failure, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			Self::Timeout { status } => *status,
			_ => None,
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

fn fmt_path(path: &Option<String>) -> String {
	match path {
		Some(path) => format!(" at `{path}`"),
		None => String::new(),
	}
}
