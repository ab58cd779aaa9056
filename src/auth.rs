//! Auth-domain credentials, scope lists, and token grants.

pub mod grant;
pub mod scope;
pub mod secret;

pub use grant::*;
pub use scope::*;
pub use secret::*;
