//! tempocli library
//!
//! Fetches tempo, key and time signature for the tracks of a Spotify playlist
//! or of the user's saved tracks, caching every analysis on disk so that a
//! track is only requested once.
//!
//! # Modules
//!
//! - `analysis` - One analysis run, from listing to cache flush
//! - `api` - HTTP endpoints of the local authorization callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Environment loading and the runtime [`config::Config`]
//! - `errors` - The crate-wide [`Error`] type
//! - `management` - Persisted state: credentials, access token, analysis cache
//! - `server` - Local HTTP server for the authorization callback
//! - `spotify` - Spotify Web API access: executor, pagination, endpoints
//! - `types` - Data structures and type definitions
//! - `utils` - PKCE helpers, parsing, filtering and formatting

pub mod analysis;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use errors::Error;

/// Result type used throughout the crate.
pub type Res<T> = std::result::Result<T, Error>;

/// Prints an informational message with a blue bullet point.
///
/// ```
/// info!("Listing playlist {}", id);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// ```
/// success!("Analyzed {} tracks", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits with status 1.
///
/// Only for fatal errors, after any state that must survive (the analysis
/// cache) has been written.
///
/// ```
/// error!("Cannot load configuration: {}", e);
/// // Program exits here
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// ```
/// warning!("Cache file was corrupt, starting empty");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
