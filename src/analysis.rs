//! One analysis run: list the target, look up or fetch every track's audio
//! features, and flush the cache no matter how the run ends.

use std::future::Future;

use crate::{
    Res,
    errors::Error,
    management::AnalysisCache,
    spotify::{
        executor::Executor,
        features,
        tracks::{self, Target},
    },
    types::{AnalyzedTrack, Track},
};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub api_url: String,
    pub item_cap: Option<usize>,
}

#[derive(Debug, Default)]
pub struct Report {
    pub tracks: Vec<AnalyzedTrack>,
    /// [`Error::PartialFetch`] when the listing stopped before its last page.
    pub partial: Option<Error>,
    pub cache_hits: usize,
    pub fetched: usize,
}

impl Report {
    pub fn failed(&self) -> impl Iterator<Item = &AnalyzedTrack> {
        self.tracks.iter().filter(|t| t.analysis.is_failed())
    }
}

/// Runs the listing and the per-track loop, racing them against `shutdown`.
///
/// The cache is persisted before returning on every path. A failed flush is
/// returned as [`Error::CacheFlush`], carrying the run's own error when the run
/// failed too, so neither is lost.
pub async fn run<S, P>(
    executor: &mut Executor,
    cache: &mut AnalysisCache,
    target: &Target,
    options: &RunOptions,
    shutdown: S,
    mut progress: P,
) -> Res<Report>
where
    S: Future<Output = ()>,
    P: FnMut(&Track, usize, usize),
{
    let outcome = tokio::select! {
        outcome = analyze(executor, cache, target, options, &mut progress) => outcome,
        _ = shutdown => Err(Error::Interrupted),
    };

    let flushed = cache.persist().await;
    match (outcome, flushed) {
        (outcome, Ok(())) => outcome,
        (Ok(_), Err(flush)) => Err(Error::CacheFlush {
            flush: Box::new(flush),
            run: None,
        }),
        (Err(run), Err(flush)) => Err(Error::CacheFlush {
            flush: Box::new(flush),
            run: Some(Box::new(run)),
        }),
    }
}

async fn analyze<P>(
    executor: &mut Executor,
    cache: &mut AnalysisCache,
    target: &Target,
    options: &RunOptions,
    progress: &mut P,
) -> Res<Report>
where
    P: FnMut(&Track, usize, usize),
{
    let listing = tracks::list_tracks(executor, &options.api_url, target, options.item_cap).await?;
    let total = listing.items.len();

    let mut report = Report {
        partial: listing.partial,
        ..Report::default()
    };

    for (index, track) in listing.items.into_iter().enumerate() {
        progress(&track, index + 1, total);

        if cache.contains(&track.id) {
            report.cache_hits += 1;
        } else {
            report.fetched += 1;
        }

        let api_url = options.api_url.as_str();
        let track_id = track.id.clone();
        let exec = &mut *executor;
        let analysis = cache
            .get_or_compute(&track.id, move || async move {
                features::analyze_track(exec, api_url, &track_id).await
            })
            .await?;

        report.tracks.push(AnalyzedTrack { track, analysis });
    }

    Ok(report)
}
