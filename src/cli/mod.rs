//! # CLI Module
//!
//! User-facing commands. Each one builds what it needs from the [`Config`]
//! it is given, drives the library and renders the outcome with the crate's
//! output macros.
//!
//! [`Config`]: crate::config::Config
//!
//! ## Commands
//!
//! - [`auth`] - Interactive authorization, stores the refresh credential
//! - [`analyze`] - Lists a playlist or the saved tracks and prints tempo, key
//!   and time signature per track
//! - [`cache_info`], [`cache_clear`], [`cache_forget`] - Inspect and prune the
//!   analysis cache
//!
//! ## Usage
//!
//! ```bash
//! tempocli auth
//! tempocli analyze 37i9dQZF1DXcBWIGoYBM5M --min-tempo 120 --sort tempo
//! tempocli analyze library --limit 200
//! tempocli cache forget 4uLU6hMCjMI75M1A2tKUQC
//! ```

mod analyze;
mod auth;
mod cache;
mod progress;

pub use analyze::{AnalyzeRequest, analyze};
pub use auth::auth;
pub use cache::{cache_clear, cache_forget, cache_info, failed_entries};
pub use progress::{SpinnerNotifier, spinner};
