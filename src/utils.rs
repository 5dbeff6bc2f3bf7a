use std::{cmp::Ordering, fmt, str::FromStr};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::{AnalyzedTrack, TrackTableRow};

const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Extracts a playlist id from a bare id, an `open.spotify.com` URL or a
/// `spotify:playlist:` URI.
pub fn parse_playlist_id(input: &str) -> Result<String, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("playlist cannot be empty".to_string());
    }

    let id = if let Some(rest) = input.strip_prefix("spotify:playlist:") {
        rest
    } else if let Some(idx) = input.find("/playlist/") {
        let rest = &input[idx + "/playlist/".len()..];
        rest.split(['?', '/', '#']).next().unwrap_or_default()
    } else {
        input
    };

    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(format!("invalid playlist '{input}'"));
    }
    Ok(id.to_string())
}

/// Pitch class name of a Spotify key number, `-` when no key was detected.
pub fn key_name(key: i32) -> &'static str {
    usize::try_from(key)
        .ok()
        .and_then(|k| PITCH_CLASSES.get(k).copied())
        .unwrap_or("-")
}

/// Accepts a pitch class name (`C#`, `db`, ...) or a number 0-11.
pub fn parse_key(input: &str) -> Result<i32, String> {
    let trimmed = input.trim();
    if let Ok(n) = trimmed.parse::<i32>() {
        return if (0..12).contains(&n) {
            Ok(n)
        } else {
            Err(format!("key number {n} is out of range 0-11"))
        };
    }

    let normalized = trimmed.to_uppercase().replace('♯', "#").replace('♭', "B");
    let flats = [
        ("DB", 1),
        ("EB", 3),
        ("GB", 6),
        ("AB", 8),
        ("BB", 10),
    ];
    if let Some((_, n)) = flats.iter().find(|(name, _)| *name == normalized) {
        return Ok(*n);
    }

    PITCH_CLASSES
        .iter()
        .position(|name| *name == normalized)
        .map(|n| n as i32)
        .ok_or_else(|| format!("invalid key '{trimmed}'"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Listing order as returned by Spotify.
    #[default]
    Listing,
    Tempo,
    Name,
    Key,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "listing" | "none" => Ok(SortOrder::Listing),
            "tempo" | "bpm" => Ok(SortOrder::Tempo),
            "name" => Ok(SortOrder::Name),
            "key" => Ok(SortOrder::Key),
            other => Err(format!(
                "invalid value '{other}' (expected: listing, tempo, name, key)"
            )),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortOrder::Listing => "listing",
            SortOrder::Tempo => "tempo",
            SortOrder::Name => "name",
            SortOrder::Key => "key",
        };
        f.write_str(s)
    }
}

/// Output filter applied to analyzed tracks before printing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackFilter {
    pub min_tempo: Option<f64>,
    pub max_tempo: Option<f64>,
    pub key: Option<i32>,
    pub time_signature: Option<i32>,
    /// Only show tracks whose analysis failed.
    pub failed_only: bool,
}

impl TrackFilter {
    pub fn matches(&self, entry: &AnalyzedTrack) -> bool {
        let analysis = &entry.analysis;
        if self.failed_only {
            return analysis.is_failed();
        }
        if analysis.is_failed() {
            return self.min_tempo.is_none()
                && self.max_tempo.is_none()
                && self.key.is_none()
                && self.time_signature.is_none();
        }

        self.min_tempo.is_none_or(|min| analysis.tempo >= min)
            && self.max_tempo.is_none_or(|max| analysis.tempo <= max)
            && self.key.is_none_or(|key| analysis.key == key)
            && self
                .time_signature
                .is_none_or(|ts| analysis.time_signature == ts)
    }
}

pub fn filter_tracks(tracks: &mut Vec<AnalyzedTrack>, filter: &TrackFilter) {
    tracks.retain(|t| filter.matches(t));
}

pub fn sort_tracks(tracks: &mut [AnalyzedTrack], order: SortOrder) {
    match order {
        SortOrder::Listing => {}
        SortOrder::Tempo => tracks.sort_by(|a, b| {
            a.analysis
                .tempo
                .partial_cmp(&b.analysis.tempo)
                .unwrap_or(Ordering::Equal)
        }),
        SortOrder::Name => {
            tracks.sort_by(|a, b| a.track.name.to_lowercase().cmp(&b.track.name.to_lowercase()))
        }
        SortOrder::Key => tracks.sort_by(|a, b| match a.analysis.key.cmp(&b.analysis.key) {
            Ordering::Equal => a
                .analysis
                .tempo
                .partial_cmp(&b.analysis.tempo)
                .unwrap_or(Ordering::Equal),
            other => other,
        }),
    }
}

pub fn to_table_row(entry: &AnalyzedTrack) -> TrackTableRow {
    let analysis = &entry.analysis;
    let (tempo, key, time_signature) = if analysis.is_failed() {
        ("-".to_string(), "-".to_string(), "-".to_string())
    } else {
        (
            format!("{:.1}", analysis.tempo),
            key_name(analysis.key).to_string(),
            format!("{}/4", analysis.time_signature),
        )
    };

    TrackTableRow {
        name: entry.track.name.clone(),
        artists: entry.track.artist_names(),
        tempo,
        key,
        time_signature,
    }
}
