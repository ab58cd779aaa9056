//! Token grants returned by the authorization code and refresh exchanges.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, RefreshToken},
};

/// Credentials issued by the token endpoint for one exchange.
///
/// Grants are handed to the application's verification hook and then dropped; the strategy
/// never stores them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenGrant {
	/// Access token used for protected-resource requests.
	pub access_token: AccessToken,
	/// Refresh token, if the provider issued one.
	pub refresh_token: Option<RefreshToken>,
	/// Token type reported by the provider (usually `bearer`).
	pub token_type: String,
	/// Instant the strategy received the grant.
	pub issued_at: OffsetDateTime,
	/// Expiry derived from `issued_at + expires_in`, when the provider reported a lifetime.
	pub expires_at: Option<OffsetDateTime>,
	/// Scopes echoed back by the provider, if any.
	pub scopes: Option<Vec<String>>,
}
impl TokenGrant {
	/// Returns `true` if the grant carries an expiry at or before `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}
}
