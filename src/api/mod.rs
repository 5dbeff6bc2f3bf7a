//! # API Module
//!
//! HTTP endpoints of the short-lived local server started by `tempocli auth`.
//!
//! - [`callback`] - Receives the authorization code from Spotify and exchanges
//!   it for tokens, completing the PKCE flow.
//! - [`health`] - Reports status and version.

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
