//! Builds a Smashrun authorization redirect with PKCE and stashes it for the callback handler.

// std
use std::collections::HashMap;
// crates.io
use color_eyre::Result;
use url::Url;
// self
use oauth2_smashrun::{
	auth::{ScopeList, TokenGrant},
	error::BoxError,
	profile::Profile,
	provider::StrategyConfig,
	strategy::{AuthorizationRequest, ReqwestStrategy},
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let config = StrategyConfig::builder(
		"demo-client",
		"demo-secret",
		Url::parse("https://app.example.com/auth/smashrun/callback")?,
	)
	.scope(ScopeList::new(["read_activity"])?)
	.pkce(true)
	.build()?;
	let strategy = ReqwestStrategy::new(config, |_: TokenGrant, profile: Profile| async move {
		Ok::<_, BoxError>(Some(profile.id))
	})?;
	let request = strategy.authorization_request();

	println!("Send your user to {}.", &request.authorize_url);
	println!(
		"PKCE challenge ({:?}): {}.",
		request.code_challenge_method(),
		request.code_challenge().unwrap_or_default()
	);

	// Hosts keep the serialized request in their own session store until the redirect returns.
	let mut sessions: HashMap<String, String> = HashMap::new();

	sessions.insert(request.state.clone(), serde_json::to_string(&request)?);

	let returned_state = request.state.clone();

	match sessions.remove(&returned_state) {
		Some(stashed) => {
			let pending: AuthorizationRequest = serde_json::from_str(&stashed)?;

			println!("State matches: {}.", pending.matches_state(Some(&returned_state)));
			println!("Pass it to SmashrunStrategy::authenticate during the callback.");
		},
		None => eprintln!("State `{returned_state}` was not recognized."),
	}

	Ok(())
}
