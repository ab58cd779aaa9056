#![cfg(feature = "reqwest")]

// self
use oauth2_smashrun::{
	_preludet::*,
	auth::{RefreshToken, TokenGrant},
	error::{BoxError, ConfigError},
	profile::Profile,
	provider::{ClientAuthMethod, StrategyConfig},
	strategy::{AuthOutcome, CallbackParams, Verify},
};

const TOKEN_PATH: &str = "/oauth2/token";
const USER_INFO_PATH: &str = "/v1/my/userinfo";
const TOKEN_BODY: &str =
	r#"{"access_token":"tok","refresh_token":"r1","token_type":"bearer","expires_in":3600}"#;
const USER_INFO_BODY: &str =
	r#"{"id":"42","userName":"jdoe","firstName":"Jane","lastName":"Doe"}"#;

fn verify_summary() -> impl Verify<User = String> {
	|grant: TokenGrant, profile: Profile| async move {
		Ok::<_, BoxError>(Some(format!(
			"{}:{}:{}",
			profile.id,
			profile.display_name,
			grant.access_token.expose()
		)))
	}
}

fn pkce_config() -> StrategyConfig {
	let mut config = test_config();

	config.pkce = true;

	config
}

fn scripted_provider() -> ScriptedTransport {
	let transport = ScriptedTransport::default();

	transport
		.route(TOKEN_PATH, ScriptedReply::ok(TOKEN_BODY))
		.route(USER_INFO_PATH, ScriptedReply::ok(USER_INFO_BODY));

	transport
}

fn callback(query: &str) -> CallbackParams {
	let url = Url::parse(&format!("{TEST_CALLBACK_URL}?{query}"))
		.expect("Callback URL fixture should parse.");

	CallbackParams::from_url(&url)
}

#[tokio::test]
async fn missing_code_redirects_to_provider() {
	let transport = scripted_provider();
	let strategy = build_scripted_strategy(test_config(), verify_summary(), &transport);
	let outcome = strategy
		.authenticate(&CallbackParams::default(), None)
		.await
		.expect("A request without a code should produce a redirect.");
	let request = match outcome {
		AuthOutcome::Redirect(request) => request,
		other => panic!("Expected a redirect, got {other:?}."),
	};
	let pairs: BTreeMap<_, _> = request.authorize_url.query_pairs().into_owned().collect();

	assert_eq!(
		request.authorize_url.as_str().split('?').next(),
		Some("https://secure.smashrun.com/oauth2/authenticate")
	);
	assert_eq!(pairs.get("client_id").map(String::as_str), Some(TEST_CLIENT_ID));
	assert_eq!(pairs.get("redirect_uri").map(String::as_str), Some(TEST_CALLBACK_URL));
	assert_eq!(pairs.get("state"), Some(&request.state));
	assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn code_is_exchanged_and_profile_verified() {
	let transport = scripted_provider();
	let strategy = build_scripted_strategy(pkce_config(), verify_summary(), &transport);
	let pending = strategy.authorization_request();
	let params = callback(&format!("code=c0de&state={}", pending.state));
	let outcome = strategy
		.authenticate(&params, Some(&pending))
		.await
		.expect("The scripted provider should complete the flow.");

	match outcome {
		AuthOutcome::Success { user } => assert_eq!(user, "42:Jane Doe:tok"),
		other => panic!("Expected success, got {other:?}."),
	}

	let token_requests = transport.requests_to(TOKEN_PATH);

	assert_eq!(token_requests.len(), 1);

	let exchange = &token_requests[0];

	assert_eq!(exchange.method, "POST");
	assert_eq!(exchange.url.host_str(), Some("secure.smashrun.com"));
	assert_eq!(exchange.form("grant_type").as_deref(), Some("authorization_code"));
	assert_eq!(exchange.form("code").as_deref(), Some("c0de"));
	assert_eq!(exchange.form("redirect_uri").as_deref(), Some(TEST_CALLBACK_URL));
	assert_eq!(exchange.form("client_id").as_deref(), Some(TEST_CLIENT_ID));
	assert_eq!(exchange.form("client_secret").as_deref(), Some(TEST_CLIENT_SECRET));
	assert_eq!(exchange.form("code_verifier").map(|verifier| verifier.len()), Some(64));

	let profile_requests = transport.requests_to(USER_INFO_PATH);

	assert_eq!(profile_requests.len(), 1);
	assert_eq!(profile_requests[0].header("authorization"), Some("OAuth tok"));
}

#[tokio::test]
async fn access_denied_fails_without_network() {
	let transport = scripted_provider();
	let strategy = build_scripted_strategy(test_config(), verify_summary(), &transport);
	let outcome = strategy
		.authenticate(
			&callback("error=access_denied&error_description=User+said+no&state=s1"),
			None,
		)
		.await
		.expect("A denied authorization is a failure outcome, not an error.");

	match outcome {
		AuthOutcome::Fail { message } => assert_eq!(message, "User said no"),
		other => panic!("Expected failure, got {other:?}."),
	}

	assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn other_callback_errors_are_reported() {
	let transport = scripted_provider();
	let strategy = build_scripted_strategy(test_config(), verify_summary(), &transport);
	let err = strategy
		.authenticate(&callback("error=server_error&error_uri=https%3A%2F%2Fdocs.test%2Fe"), None)
		.await
		.expect_err("Provider errors other than access_denied must be errors.");

	match err {
		Error::Authorization { code, description, uri } => {
			assert_eq!(code, "server_error");
			assert_eq!(description, None);
			assert_eq!(uri.as_deref(), Some("https://docs.test/e"));
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn state_mismatch_fails_before_exchange() {
	let transport = scripted_provider();
	let strategy = build_scripted_strategy(test_config(), verify_summary(), &transport);
	let pending = strategy.authorization_request();
	let outcome = strategy
		.authenticate(&callback("code=c0de&state=forged"), Some(&pending))
		.await
		.expect("A state mismatch is a failure outcome, not an error.");

	assert!(matches!(outcome, AuthOutcome::Fail { .. }));
	assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn pkce_requires_pending_request() {
	let transport = scripted_provider();
	let strategy = build_scripted_strategy(pkce_config(), verify_summary(), &transport);
	let outcome = strategy
		.authenticate(&callback("code=c0de&state=s1"), None)
		.await
		.expect("A missing pending request is a failure outcome, not an error.");

	match outcome {
		AuthOutcome::Fail { message } =>
			assert_eq!(message, "Unable to verify authorization request state."),
		other => panic!("Expected failure, got {other:?}."),
	}

	assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn rejected_verification_fails() {
	let transport = scripted_provider();
	let verify =
		|_: TokenGrant, _: Profile| async move { Ok::<Option<String>, BoxError>(None) };
	let strategy = build_scripted_strategy(test_config(), verify, &transport);
	let outcome = strategy
		.authenticate(&callback("code=c0de"), None)
		.await
		.expect("A rejected user is a failure outcome, not an error.");

	assert!(matches!(outcome, AuthOutcome::Fail { .. }));
}

#[tokio::test]
async fn verification_errors_propagate() {
	let transport = scripted_provider();
	let verify = |_: TokenGrant, _: Profile| async move {
		Err::<Option<String>, BoxError>("user store offline".into())
	};
	let strategy = build_scripted_strategy(test_config(), verify, &transport);
	let err = strategy
		.authenticate(&callback("code=c0de"), None)
		.await
		.expect_err("Verification failures must surface as errors.");

	assert!(matches!(err, Error::Verify { .. }));
	assert_eq!(
		StdError::source(&err).map(|source| source.to_string()).as_deref(),
		Some("user store offline")
	);
}

#[tokio::test]
async fn invalid_grant_is_classified() {
	let transport = ScriptedTransport::default();

	transport.route(
		TOKEN_PATH,
		ScriptedReply::status(
			400,
			r#"{"error":"invalid_grant","error_description":"Authorization code expired"}"#,
		),
	);

	let strategy = build_scripted_strategy(test_config(), verify_summary(), &transport);
	let err = strategy
		.authenticate(&callback("code=stale"), None)
		.await
		.expect_err("An expired code must fail the exchange.");

	assert!(matches!(err, Error::InvalidGrant { .. }));
	assert!(transport.requests_to(USER_INFO_PATH).is_empty());
}

#[tokio::test]
async fn profile_failures_abort_authentication() {
	let transport = ScriptedTransport::default();

	transport
		.route(TOKEN_PATH, ScriptedReply::ok(TOKEN_BODY))
		.route(USER_INFO_PATH, ScriptedReply::status(500, "{}"));

	let strategy = build_scripted_strategy(test_config(), verify_summary(), &transport);
	let err = strategy
		.authenticate(&callback("code=c0de"), None)
		.await
		.expect_err("A failed profile fetch must fail authentication.");

	assert!(matches!(err, Error::UpstreamFetch { .. }));
}

#[tokio::test]
async fn refresh_exchanges_refresh_token() {
	let transport = scripted_provider();
	let strategy = build_scripted_strategy(test_config(), verify_summary(), &transport);
	let grant = strategy
		.refresh(&RefreshToken::new("r0"))
		.await
		.expect("The scripted provider should refresh the grant.");

	assert_eq!(grant.access_token.expose(), "tok");
	assert_eq!(grant.refresh_token.as_ref().map(RefreshToken::expose), Some("r1"));
	assert!(grant.expires_at.is_some_and(|expires_at| expires_at > grant.issued_at));

	let requests = transport.requests_to(TOKEN_PATH);

	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].form("grant_type").as_deref(), Some("refresh_token"));
	assert_eq!(requests[0].form("refresh_token").as_deref(), Some("r0"));
}

#[tokio::test]
async fn basic_client_auth_uses_authorization_header() {
	let transport = scripted_provider();
	let mut config = test_config();

	config.client_auth_method = ClientAuthMethod::ClientSecretBasic;

	let strategy = build_scripted_strategy(config, verify_summary(), &transport);
	let outcome = strategy
		.authenticate(&callback("code=c0de"), None)
		.await
		.expect("The scripted provider should complete the flow.");

	assert!(matches!(outcome, AuthOutcome::Success { .. }));

	let token_requests = transport.requests_to(TOKEN_PATH);

	assert_eq!(token_requests.len(), 1);

	let exchange = &token_requests[0];

	assert_eq!(exchange.header("authorization"), Some("Basic YWJjOnh5eg=="));
	assert_eq!(exchange.form("grant_type").as_deref(), Some("authorization_code"));
	assert_eq!(exchange.form("client_secret"), None);
}

#[tokio::test]
async fn oversized_token_lifetime_is_rejected() {
	let transport = ScriptedTransport::default();

	transport.route(
		TOKEN_PATH,
		ScriptedReply::ok(
			r#"{"access_token":"tok","token_type":"bearer","expires_in":100000000000000}"#,
		),
	);

	let strategy = build_scripted_strategy(test_config(), verify_summary(), &transport);
	let err = strategy
		.authenticate(&callback("code=c0de"), None)
		.await
		.expect_err("A lifetime past the representable range must fail the exchange.");

	assert!(matches!(err, Error::Config(ConfigError::ExpiresInOutOfRange)));
	assert!(transport.requests_to(USER_INFO_PATH).is_empty());
}
