#![cfg(feature = "reqwest")]

// self
use oauth2_smashrun::{
	_preludet::*,
	auth::TokenGrant,
	error::{BoxError, TransportError},
	profile::Profile,
	strategy::Verify,
};

const USER_INFO_PATH: &str = "/v1/my/userinfo";
const USER_INFO_BODY: &str =
	r#"{"id":"42","userName":"jdoe","firstName":"Jane","lastName":"Doe","unitDistance":"k"}"#;

fn verify_id() -> impl Verify<User = String> {
	|_: TokenGrant, profile: Profile| async move { Ok::<_, BoxError>(Some(profile.id)) }
}

fn strategy_with(reply: ScriptedReply) -> (ScriptedStrategy<impl Verify>, ScriptedTransport) {
	let transport = ScriptedTransport::default();

	transport.route(USER_INFO_PATH, reply);

	(build_scripted_strategy(test_config(), verify_id(), &transport), transport)
}

#[tokio::test]
async fn user_profile_maps_document_fields() {
	let (strategy, _transport) = strategy_with(ScriptedReply::ok(USER_INFO_BODY));
	let profile = strategy
		.user_profile(&test_access_token("tok"))
		.await
		.expect("User profile should load from the scripted endpoint.");

	assert_eq!(profile.provider, "smashrun");
	assert_eq!(profile.id, "42");
	assert_eq!(profile.username.as_deref(), Some("jdoe"));
	assert_eq!(profile.display_name, "Jane Doe");
	assert_eq!(profile.raw, USER_INFO_BODY);
	assert_eq!(profile.json["unitDistance"], "k");
}

#[tokio::test]
async fn user_profile_sends_token_with_oauth_scheme() {
	let (strategy, transport) = strategy_with(ScriptedReply::ok(USER_INFO_BODY));

	strategy
		.user_profile(&test_access_token("tok"))
		.await
		.expect("User profile should load from the scripted endpoint.");

	let requests = transport.requests();

	assert_eq!(requests.len(), 1);

	let request = &requests[0];

	assert_eq!(request.method, "GET");
	assert_eq!(request.url.as_str(), "https://api.smashrun.com/v1/my/userinfo");
	assert_eq!(request.header("authorization"), Some("OAuth tok"));
	assert_eq!(request.header("accept"), Some("application/json"));
	assert_eq!(request.query("access_token"), None);
}

#[tokio::test]
async fn user_profile_wraps_transport_failures() {
	let (strategy, _transport) =
		strategy_with(ScriptedReply::Fail("connection reset by peer".into()));
	let err = strategy
		.user_profile(&test_access_token("tok"))
		.await
		.expect_err("Transport failures must surface as errors.");

	assert_eq!(err.to_string(), "Failed to fetch user profile.");
	assert!(matches!(err, Error::UpstreamFetch { source: TransportError::Io(_) }));
	assert!(StdError::source(&err).is_some());
}

#[tokio::test]
async fn user_profile_wraps_error_statuses() {
	let (strategy, _transport) =
		strategy_with(ScriptedReply::status(401, r#"{"error":"invalid_token"}"#));
	let err = strategy
		.user_profile(&test_access_token("expired"))
		.await
		.expect_err("Non-success statuses must surface as errors.");

	match err {
		Error::UpstreamFetch { source: TransportError::Status { status, body } } => {
			assert_eq!(status, 401);
			assert!(body.contains("invalid_token"));
		},
		other => panic!("Unexpected error: {other:?}."),
	}
}

#[tokio::test]
async fn user_profile_reports_unparsable_bodies() {
	let (strategy, _transport) = strategy_with(ScriptedReply::ok("not-json"));
	let err = strategy
		.user_profile(&test_access_token("tok"))
		.await
		.expect_err("Invalid JSON must fail to parse.");

	assert!(matches!(err, Error::ResponseParse { path: None, .. }));

	let (strategy, _transport) = strategy_with(ScriptedReply::ok(r#"{"userName":"jdoe"}"#));
	let err = strategy
		.user_profile(&test_access_token("tok"))
		.await
		.expect_err("A document without an identifier must fail to parse.");

	assert!(matches!(err, Error::ResponseParse { path: Some(_), .. }));
}

#[tokio::test]
async fn user_profile_tolerates_missing_names() {
	let (strategy, _transport) = strategy_with(ScriptedReply::ok(r#"{"id":7}"#));
	let profile = strategy
		.user_profile(&test_access_token("tok"))
		.await
		.expect("A document with only an identifier should parse.");

	assert_eq!(profile.id, "7");
	assert_eq!(profile.username, None);
	assert_eq!(profile.display_name, "");
}

#[tokio::test]
async fn repeated_fetches_issue_fresh_requests() {
	let (strategy, transport) = strategy_with(ScriptedReply::ok(USER_INFO_BODY));
	let token = test_access_token("tok");
	let first = strategy.user_profile(&token).await.expect("First fetch should succeed.");
	let second = strategy.user_profile(&token).await.expect("Second fetch should succeed.");

	assert_eq!(first, second);
	assert_eq!(transport.requests_to(USER_INFO_PATH).len(), 2);
}
