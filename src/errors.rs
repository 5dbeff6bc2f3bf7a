use thiserror::Error;

/// Every failure the analysis pipeline can surface.
///
/// Run-aborting variants are identified by [`Error::is_fatal`]; the rest are
/// local to a single track or page and are folded into results instead of
/// stopping the run.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or unusable local setup (credentials, client id/secret).
    #[error("{0}\nRun `tempocli auth` to authorize this client.")]
    Configuration(String),

    /// The token endpoint refused to hand out an access token.
    #[error("Spotify rejected the token refresh: {0}")]
    AuthProvider(String),

    /// Rate limiting outlasted every step of the backoff sequence.
    #[error("Still rate limited after {steps} backoff steps. Try again later.")]
    BackoffExhausted { steps: u32 },

    /// The catalog returned an error payload in the middle of a listing.
    #[error("Listing stopped early: {0}")]
    PartialFetch(String),

    /// Audio features could not be obtained for one track.
    #[error("Analysis failed for track {track_id}: {message}")]
    PerTrackAnalysis { track_id: String, message: String },

    /// The run was cancelled by the user.
    #[error("Interrupted")]
    Interrupted,

    /// The analysis cache could not be written at the end of a run. `run`
    /// holds the error the run itself ended with, if any.
    #[error("{}", describe_flush_failure(.flush, .run))]
    CacheFlush {
        flush: Box<Error>,
        run: Option<Box<Error>>,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error has to abort the whole run.
    ///
    /// HTTP and decoding failures only concern the request that produced them
    /// and are converted into per-track results by the caller.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Configuration(_)
            | Error::AuthProvider(_)
            | Error::BackoffExhausted { .. }
            | Error::Interrupted
            | Error::CacheFlush { .. }
            | Error::Io(_) => true,
            Error::PartialFetch(_)
            | Error::PerTrackAnalysis { .. }
            | Error::Http(_)
            | Error::Json(_) => false,
        }
    }
}

fn describe_flush_failure(flush: &Error, run: &Option<Box<Error>>) -> String {
    match run {
        Some(run) => format!("{run}\nThe analysis cache could not be written either: {flush}"),
        None => format!("Cannot write the analysis cache: {flush}"),
    }
}
