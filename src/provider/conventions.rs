//! Token endpoint authentication modes and Smashrun's protected-resource request conventions.

// self
use crate::_prelude::*;

/// Client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
}

/// How protected-resource requests carry the access token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConventions {
	/// Scheme prefixed to the access token in the `Authorization` header.
	pub auth_method: String,
	/// Sends the token in the `Authorization` header for GET requests instead of the
	/// `access_token` query parameter.
	pub use_authorization_header_for_get: bool,
}
impl RequestConventions {
	/// Scheme Smashrun expects in front of the access token.
	pub const SMASHRUN_AUTH_METHOD: &str = "OAuth";

	/// Conventions required by Smashrun's API.
	pub fn smashrun() -> Self {
		Self {
			auth_method: Self::SMASHRUN_AUTH_METHOD.into(),
			use_authorization_header_for_get: true,
		}
	}

	/// `Authorization` header value for `token`.
	pub fn authorization_header(&self, token: &str) -> String {
		format!("{} {token}", self.auth_method)
	}
}
impl Default for RequestConventions {
	fn default() -> Self {
		Self { auth_method: "Bearer".into(), use_authorization_header_for_get: false }
	}
}
