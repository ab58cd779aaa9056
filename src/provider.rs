//! Smashrun provider data (fixed endpoints, configuration, request conventions) and token
//! error classification.
//!
//! `config` holds [`StrategyConfig`], the application-facing settings whose optional endpoint
//! URLs fall back to Smashrun's fixed endpoints. `conventions` describes how requests deviate
//! from strict OAuth 2.0 defaults. `classify` maps token endpoint failures into the crate's
//! error taxonomy without depending on any HTTP client.

pub mod classify;
pub mod config;
pub mod conventions;

pub use classify::*;
pub use config::*;
pub use conventions::*;

/// Strategy name used by hosts to bind routes to this strategy.
pub const PROVIDER_NAME: &str = "smashrun";
/// Fixed authorization endpoint.
pub const AUTHORIZATION_URL: &str = "https://secure.smashrun.com/oauth2/authenticate";
/// Fixed token endpoint.
pub const TOKEN_URL: &str = "https://secure.smashrun.com/oauth2/token";
/// Fixed user-info endpoint.
pub const USER_PROFILE_URL: &str = "https://api.smashrun.com/v1/my/userinfo";
