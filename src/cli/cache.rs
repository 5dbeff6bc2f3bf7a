use crate::{config::Config, error, info, management::AnalysisCache, success, warning};

pub async fn cache_info(config: Config) {
    let cache = AnalysisCache::load(config.cache_path()).await;
    if let Some(reason) = cache.recovered_from() {
        warning!("Analysis cache is unreadable: {}", reason);
    }

    info!("Cache file: {}", cache.path().display());
    info!(
        "{} analyses stored, {} of them failed.",
        cache.len(),
        cache.failed_count()
    );

    for (id, message) in failed_entries(&cache) {
        warning!("{}: {}", id, message);
    }
}

/// Track ids whose analysis failed, with the stored reason.
pub fn failed_entries(cache: &AnalysisCache) -> Vec<(String, String)> {
    cache
        .iter()
        .filter_map(|(id, result)| {
            result
                .error
                .as_ref()
                .map(|e| (id.clone(), e.message.clone()))
        })
        .collect()
}

pub async fn cache_clear(config: Config) {
    let mut cache = AnalysisCache::load(config.cache_path()).await;
    let count = cache.len();
    match cache.clear().await {
        Ok(()) => success!("Removed {} cached analyses.", count),
        Err(e) => error!("Cannot clear analysis cache. Err: {}", e),
    }
}

pub async fn cache_forget(config: Config, track_ids: Vec<String>) {
    let mut cache = AnalysisCache::load(config.cache_path()).await;

    let mut removed = 0;
    for id in &track_ids {
        if cache.forget(id).is_some() {
            removed += 1;
        } else {
            warning!("Track {} is not cached.", id);
        }
    }

    if removed == 0 {
        return;
    }
    match cache.persist().await {
        Ok(()) => success!("Forgot {} cached analyses.", removed),
        Err(e) => error!("Cannot write analysis cache. Err: {}", e),
    }
}
