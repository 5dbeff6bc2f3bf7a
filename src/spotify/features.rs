use crate::{
    Res,
    errors::Error,
    spotify::executor::Executor,
    types::{AnalysisResult, AudioFeatures, ErrorResponse},
};

/// Fetches tempo, key and time signature of one track.
///
/// An error payload or a non-success status becomes a failed
/// [`AnalysisResult`]; only executor errors are returned as `Err`.
pub async fn get_audio_features(
    executor: &mut Executor,
    api_url: &str,
    track_id: &str,
) -> Res<AnalysisResult> {
    let url = format!(
        "{api_url}/audio-features/{track_id}",
        api_url = api_url.trim_end_matches('/')
    );
    let response = executor.get(&url).await?;

    if let Ok(payload) = serde_json::from_str::<ErrorResponse>(&response.body) {
        return Ok(AnalysisResult::failed(payload.error.message));
    }
    if !response.status.is_success() {
        return Ok(AnalysisResult::failed(format!(
            "audio features request answered {}",
            response.status
        )));
    }

    let features: AudioFeatures = serde_json::from_str(&response.body)?;
    Ok(AnalysisResult::new(
        features.tempo,
        features.time_signature,
        features.key,
    ))
}

/// Like [`get_audio_features`], but turns every non-fatal failure into a
/// failed result so one bad track cannot stop a batch.
pub async fn analyze_track(
    executor: &mut Executor,
    api_url: &str,
    track_id: &str,
) -> Res<AnalysisResult> {
    match get_audio_features(executor, api_url, track_id).await {
        Ok(result) => Ok(result),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            let failure = Error::PerTrackAnalysis {
                track_id: track_id.to_string(),
                message: e.to_string(),
            };
            Ok(AnalysisResult::failed(failure.to_string()))
        }
    }
}
