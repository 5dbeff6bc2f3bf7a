//! # Spotify Integration Module
//!
//! Everything that talks to the Spotify Web API lives here, layered so that
//! only [`transport`] knows about the HTTP client:
//!
//! ```text
//! tracks / features         (catalog endpoints)
//!          ↓
//! pagination                (follows `next` links)
//!          ↓
//! executor                  (401 refresh, 429 backoff)
//!          ↓
//! transport                 (reqwest)
//! ```
//!
//! ## Modules
//!
//! - [`auth`] - Interactive authorization code flow with PKCE and the code exchange
//! - [`executor`] - Resilient request executor, retry policy and progress hooks
//! - [`pagination`] - Cursor walker aggregating paged collections
//! - [`tracks`] - Playlist and saved-tracks listings
//! - [`features`] - Per-track audio features
//! - [`transport`] - The [`transport::Transport`] seam and its reqwest implementation
//!
//! ## Rate Limiting
//!
//! A 429 answer is retried after `Retry-After` seconds, or after the next
//! step of a doubling sequence (2, 4, 8, ... seconds) when the header is
//! missing. Each logical request tolerates a fixed number of such waits
//! (11 by default) before the run is aborted.
//!
//! ## Token Expiry
//!
//! Access tokens carry no local expiry. A 401 triggers one refresh and one
//! retry; a second 401 right after a refresh is treated as a provider error.

pub mod auth;
pub mod executor;
pub mod features;
pub mod pagination;
pub mod tracks;
pub mod transport;
