use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// Body of a token endpoint response, successful or not.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub expires_in: Option<u64>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PkceState {
    pub code_verifier: String,
    pub grant: Option<Result<TokenResponse, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
}

impl Track {
    pub fn artist_names(&self) -> String {
        self.artists.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisError {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub tempo: f64,
    pub time_signature: i32,
    pub key: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<AnalysisError>,
}

impl AnalysisResult {
    pub fn new(tempo: f64, time_signature: i32, key: i32) -> Self {
        Self {
            tempo,
            time_signature,
            key,
            error: None,
        }
    }

    /// Sentinel stored for tracks Spotify cannot analyze.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            tempo: 0.0,
            time_signature: 0,
            key: -1,
            error: Some(AnalysisError {
                message: message.into(),
            }),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedTrack {
    pub track: Track,
    pub analysis: AnalysisResult,
}

/// One page of a paginated collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next: Option<String>,
    pub total: Option<u64>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub status: Option<u16>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ApiError,
}

/// Entry of a playlist or saved-tracks listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackItem {
    pub track: Option<TrackObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackObject {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}

impl TrackItem {
    /// Local files and removed tracks come back without an id and are skipped.
    pub fn into_track(self) -> Option<Track> {
        let track = self.track?;
        Some(Track {
            id: track.id?,
            name: track.name,
            artists: track.artists.into_iter().map(|a| a.name).collect(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub tempo: f64,
    pub time_signature: i32,
    pub key: i32,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub name: String,
    pub artists: String,
    pub tempo: String,
    pub key: String,
    #[tabled(rename = "time signature")]
    pub time_signature: String,
}
