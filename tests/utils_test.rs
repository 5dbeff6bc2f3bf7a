use tempocli::spotify::tracks::Target;
use tempocli::types::{AnalysisResult, AnalyzedTrack, Track};
use tempocli::utils::*;

// Helper function to create an analyzed track
fn analyzed(id: &str, name: &str, analysis: AnalysisResult) -> AnalyzedTrack {
    AnalyzedTrack {
        track: Track {
            id: id.to_string(),
            name: name.to_string(),
            artists: vec!["Artist One".to_string(), "Artist Two".to_string()],
        },
        analysis,
    }
}

fn sample_tracks() -> Vec<AnalyzedTrack> {
    vec![
        analyzed("a", "beta", AnalysisResult::new(128.0, 4, 7)),
        analyzed("b", "Alpha", AnalysisResult::new(90.5, 3, 2)),
        analyzed("c", "gamma", AnalysisResult::failed("analysis not found")),
        analyzed("d", "Delta", AnalysisResult::new(174.0, 4, 2)),
    ]
}

fn ids(tracks: &[AnalyzedTrack]) -> Vec<&str> {
    tracks.iter().map(|t| t.track.id.as_str()).collect()
}

#[test]
fn test_generate_code_verifier() {
    let verifier = generate_code_verifier();

    // Should be exactly 128 characters
    assert_eq!(verifier.len(), 128);

    // Should contain only alphanumeric characters
    assert!(verifier.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated verifiers should be different
    let verifier2 = generate_code_verifier();
    assert_ne!(verifier, verifier2);
}

#[test]
fn test_generate_code_challenge() {
    // RFC 7636 appendix B
    let challenge = generate_code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
    assert_eq!(challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");

    // Should be base64-encoded (URL-safe, no padding)
    let other = generate_code_challenge("different_verifier");
    assert_ne!(challenge, other);
    assert!(
        other
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    );
}

#[test]
fn test_parse_playlist_id() {
    let id = "37i9dQZF1DXcBWIGoYBM5M";

    assert_eq!(parse_playlist_id(id).unwrap(), id);
    assert_eq!(
        parse_playlist_id(&format!("spotify:playlist:{id}")).unwrap(),
        id
    );
    assert_eq!(
        parse_playlist_id(&format!("https://open.spotify.com/playlist/{id}?si=abc123")).unwrap(),
        id
    );
    assert_eq!(
        parse_playlist_id(&format!("  https://open.spotify.com/playlist/{id}/  ")).unwrap(),
        id
    );
}

#[test]
fn test_parse_playlist_id_invalid_inputs() {
    assert!(parse_playlist_id("").is_err());
    assert!(parse_playlist_id("   ").is_err());
    assert!(parse_playlist_id("spotify:playlist:").is_err());
    assert!(parse_playlist_id("https://open.spotify.com/playlist/").is_err());
    assert!(parse_playlist_id("not a playlist").is_err());
}

#[test]
fn test_parse_target() {
    assert_eq!("library".parse::<Target>().unwrap(), Target::Library);
    assert_eq!("Liked".parse::<Target>().unwrap(), Target::Library);
    assert_eq!(
        "spotify:playlist:abc123".parse::<Target>().unwrap(),
        Target::Playlist("abc123".to_string())
    );
    assert!("spotify:album:".parse::<Target>().is_err());
}

#[test]
fn test_listing_urls() {
    let api = "https://api.spotify.com/v1/";
    assert_eq!(
        Target::Playlist("abc".to_string()).listing_url(api),
        "https://api.spotify.com/v1/playlists/abc/tracks?limit=100"
    );
    assert_eq!(
        Target::Library.listing_url(api),
        "https://api.spotify.com/v1/me/tracks?limit=50"
    );
}

#[test]
fn test_key_name() {
    assert_eq!(key_name(0), "C");
    assert_eq!(key_name(1), "C#");
    assert_eq!(key_name(11), "B");

    // Undetected or out of range keys
    assert_eq!(key_name(-1), "-");
    assert_eq!(key_name(12), "-");
}

#[test]
fn test_parse_key() {
    assert_eq!(parse_key("C").unwrap(), 0);
    assert_eq!(parse_key("f#").unwrap(), 6);
    assert_eq!(parse_key("Bb").unwrap(), 10);
    assert_eq!(parse_key("db").unwrap(), 1);
    assert_eq!(parse_key("B").unwrap(), 11);
    assert_eq!(parse_key(" 9 ").unwrap(), 9);

    assert!(parse_key("12").is_err());
    assert!(parse_key("-1").is_err());
    assert!(parse_key("H").is_err());
}

#[test]
fn test_sort_order_from_str() {
    assert_eq!("listing".parse::<SortOrder>().unwrap(), SortOrder::Listing);
    assert_eq!("BPM".parse::<SortOrder>().unwrap(), SortOrder::Tempo);
    assert_eq!("name".parse::<SortOrder>().unwrap(), SortOrder::Name);
    assert_eq!("key".parse::<SortOrder>().unwrap(), SortOrder::Key);

    let err = "energy".parse::<SortOrder>().unwrap_err();
    assert!(err.contains("energy"));

    // Display round trips through FromStr
    for order in [
        SortOrder::Listing,
        SortOrder::Tempo,
        SortOrder::Name,
        SortOrder::Key,
    ] {
        assert_eq!(order.to_string().parse::<SortOrder>().unwrap(), order);
    }
}

#[test]
fn test_filter_without_criteria_keeps_everything() {
    let mut tracks = sample_tracks();
    filter_tracks(&mut tracks, &TrackFilter::default());
    assert_eq!(ids(&tracks), vec!["a", "b", "c", "d"]);
}

#[test]
fn test_filter_by_tempo_range_drops_failed() {
    let mut tracks = sample_tracks();
    let filter = TrackFilter {
        min_tempo: Some(100.0),
        max_tempo: Some(130.0),
        ..TrackFilter::default()
    };
    filter_tracks(&mut tracks, &filter);
    assert_eq!(ids(&tracks), vec!["a"]);
}

#[test]
fn test_filter_by_key_and_time_signature() {
    let mut tracks = sample_tracks();
    let filter = TrackFilter {
        key: Some(2),
        time_signature: Some(4),
        ..TrackFilter::default()
    };
    filter_tracks(&mut tracks, &filter);
    assert_eq!(ids(&tracks), vec!["d"]);
}

#[test]
fn test_filter_failed_only() {
    let mut tracks = sample_tracks();
    let filter = TrackFilter {
        failed_only: true,
        ..TrackFilter::default()
    };
    filter_tracks(&mut tracks, &filter);
    assert_eq!(ids(&tracks), vec!["c"]);
}

#[test]
fn test_sort_tracks() {
    let mut tracks = sample_tracks();
    sort_tracks(&mut tracks, SortOrder::Listing);
    assert_eq!(ids(&tracks), vec!["a", "b", "c", "d"]);

    sort_tracks(&mut tracks, SortOrder::Tempo);
    assert_eq!(ids(&tracks), vec!["c", "b", "a", "d"]);

    // Case-insensitive by name
    sort_tracks(&mut tracks, SortOrder::Name);
    assert_eq!(ids(&tracks), vec!["b", "a", "d", "c"]);

    // By key, ties broken by tempo
    sort_tracks(&mut tracks, SortOrder::Key);
    assert_eq!(ids(&tracks), vec!["c", "b", "d", "a"]);
}

#[test]
fn test_to_table_row() {
    let row = to_table_row(&analyzed("a", "Song", AnalysisResult::new(127.96, 3, 1)));
    assert_eq!(row.name, "Song");
    assert_eq!(row.artists, "Artist One, Artist Two");
    assert_eq!(row.tempo, "128.0");
    assert_eq!(row.key, "C#");
    assert_eq!(row.time_signature, "3/4");

    // Failed analyses render placeholders
    let row = to_table_row(&analyzed("c", "Broken", AnalysisResult::failed("gone")));
    assert_eq!(row.tempo, "-");
    assert_eq!(row.key, "-");
    assert_eq!(row.time_signature, "-");
}
