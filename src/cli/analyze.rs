use std::sync::Arc;

use tabled::Table;

use crate::{
    analysis::{self, RunOptions},
    cli::progress::{SpinnerNotifier, spinner},
    config::Config,
    error,
    errors::Error,
    info,
    management::{AnalysisCache, TokenManager},
    spotify::{executor::Executor, tracks::Target, transport::HttpTransport},
    success,
    types::TrackTableRow,
    utils::{self, SortOrder, TrackFilter},
    warning,
};

#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub target: Target,
    pub limit: Option<usize>,
    pub filter: TrackFilter,
    pub sort: SortOrder,
}

pub async fn analyze(config: Config, request: AnalyzeRequest) {
    let mut cache = AnalysisCache::load(config.cache_path()).await;
    if let Some(reason) = cache.recovered_from() {
        warning!(
            "Analysis cache at {} is unreadable ({}), starting with an empty cache.",
            cache.path().display(),
            reason
        );
    }

    let pb = spinner(&format!("Listing {}...", request.target));
    let tokens = TokenManager::new(config.credential_store(), config.token_url.clone());
    let mut executor = Executor::new(Box::new(HttpTransport::new()), tokens, config.retry.clone())
        .with_notifier(Arc::new(SpinnerNotifier::new(pb.clone())));

    let options = RunOptions {
        api_url: config.api_url.clone(),
        item_cap: request.limit,
    };

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let progress_pb = pb.clone();
    let result = analysis::run(
        &mut executor,
        &mut cache,
        &request.target,
        &options,
        shutdown,
        |track, index, total| {
            progress_pb.set_message(format!(
                "Analyzing {name} ({index}/{total})...",
                name = track.name
            ))
        },
    )
    .await;
    pb.finish_and_clear();

    let mut report = match result {
        Ok(report) => report,
        Err(e @ Error::CacheFlush { .. }) => error!("{}", e),
        Err(e) => error!(
            "{}\n{} analyses are kept in {}.",
            e,
            cache.len(),
            cache.path().display()
        ),
    };

    if let Some(reason) = &report.partial {
        warning!(
            "{} could only be listed partially. {}\nCheck the playlist id and run the command again.",
            request.target,
            reason
        );
    }
    if report.tracks.is_empty() {
        info!("No tracks found for {}.", request.target);
        return;
    }

    for failed in report.failed() {
        if let Some(err) = &failed.analysis.error {
            warning!(
                "{} - {}: {}",
                failed.track.name,
                failed.track.artist_names(),
                err.message
            );
        }
    }

    let analyzed = report.tracks.len();
    utils::filter_tracks(&mut report.tracks, &request.filter);
    utils::sort_tracks(&mut report.tracks, request.sort);

    let rows: Vec<TrackTableRow> = report.tracks.iter().map(utils::to_table_row).collect();
    if rows.is_empty() {
        info!("No track matches the given filters.");
    } else {
        println!("{}", Table::new(rows));
    }

    success!(
        "Analyzed {analyzed} tracks ({hits} from cache, {fetched} fetched).",
        hits = report.cache_hits,
        fetched = report.fetched
    );
}
