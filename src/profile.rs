//! Normalized user profiles built from Smashrun's user-info document.

// crates.io
use serde_json::{Number, Value};
// self
use crate::{_prelude::*, provider::PROVIDER_NAME};

/// Provider-agnostic profile handed to the application's verification hook.
///
/// Serializes as `{provider, id, username, displayName, _raw, _json}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
	/// Provider tag, always `smashrun`.
	pub provider: String,
	/// Provider-assigned user identifier.
	pub id: String,
	/// Provider username, if the document carried one.
	pub username: Option<String>,
	/// First and last name joined by a single space.
	#[serde(rename = "displayName")]
	pub display_name: String,
	/// Response body exactly as received.
	#[serde(rename = "_raw")]
	pub raw: String,
	/// Parsed response document, including fields the profile does not map.
	#[serde(rename = "_json")]
	pub json: Value,
}
impl Profile {
	/// Parses a user-info response body into a profile.
	///
	/// The body must be a JSON document with an `id`; the name fields are optional.
	pub fn parse(body: &str) -> Result<Self> {
		let json: Value = serde_json::from_str(body)
			.map_err(|source| Error::ResponseParse { path: None, source })?;
		let info: UserInfo = serde_path_to_error::deserialize(&json).map_err(|err| {
			Error::ResponseParse { path: Some(err.path().to_string()), source: err.into_inner() }
		})?;

		Ok(Self::from_user_info(info, body.to_owned(), json))
	}

	fn from_user_info(info: UserInfo, raw: String, json: Value) -> Self {
		let display_name = info.display_name();

		Self {
			provider: PROVIDER_NAME.into(),
			id: info.id.into_string(),
			username: info.user_name,
			display_name,
			raw,
			json,
		}
	}
}

/// Fields of the user-info document the profile maps.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
	/// User identifier.
	pub id: UserId,
	/// Username.
	#[serde(default)]
	pub user_name: Option<String>,
	/// Given name.
	#[serde(default)]
	pub first_name: Option<String>,
	/// Family name.
	#[serde(default)]
	pub last_name: Option<String>,
}
impl UserInfo {
	/// Joins the name parts that are present with a single space.
	pub fn display_name(&self) -> String {
		[self.first_name.as_deref(), self.last_name.as_deref()]
			.into_iter()
			.flatten()
			.collect::<Vec<_>>()
			.join(" ")
	}
}

/// User identifier, which the API may encode as a string or a number.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UserId {
	/// String identifier.
	Text(String),
	/// Numeric identifier, kept as written (negative and fractional values included).
	Number(Number),
}
impl UserId {
	/// Returns the identifier in its string form.
	pub fn into_string(self) -> String {
		match self {
			Self::Text(value) => value,
			Self::Number(value) => value.to_string(),
		}
	}
}
