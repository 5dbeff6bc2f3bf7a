use serde::de::DeserializeOwned;

use crate::{Res, errors::Error, spotify::executor::Executor, types::Page};

/// Items gathered by [`fetch_all`].
#[derive(Debug)]
pub struct Collected<T> {
    pub items: Vec<T>,
    /// [`Error::PartialFetch`] when the walk stopped before the last page.
    pub partial: Option<Error>,
    pub pages: usize,
}

impl<T> Collected<T> {
    pub fn is_partial(&self) -> bool {
        self.partial.is_some()
    }
}

/// Follows `next` links from `start_url`, concatenating the items of every page.
///
/// Works for any paged Spotify collection (`{ items, next, total }`); the
/// bearer header is attached by the executor, so only the URL is needed.
///
/// # Arguments
///
/// * `executor` - Sends every page request, handling 401 and 429 answers
/// * `start_url` - First page, including its `limit` parameter
/// * `item_cap` - Stop once at least this many items are collected
///
/// # Returns
///
/// - `Ok(Collected)` - Items in server order. `partial` is set when the walk
///   ended early on an error payload, a non-success status or an undecodable
///   page; the items collected up to that point are kept.
/// - `Err(Error)` - Fatal executor errors (backoff exhausted, refresh refused)
///
/// # Item Cap
///
/// The page that reaches the cap is kept whole, so the result may hold more
/// than `item_cap` items. No further page is requested after it.
///
/// # Example
///
/// ```
/// let url = Target::Library.listing_url(&config.api_url);
/// let listing: Collected<TrackItem> = fetch_all(&mut executor, &url, Some(200)).await?;
/// if let Some(reason) = &listing.partial {
///     warning!("{}", reason);
/// }
/// ```
pub async fn fetch_all<T: DeserializeOwned>(
    executor: &mut Executor,
    start_url: &str,
    item_cap: Option<usize>,
) -> Res<Collected<T>> {
    let mut collected = Collected {
        items: Vec::new(),
        partial: None,
        pages: 0,
    };
    let mut next_url = Some(start_url.to_string());

    while let Some(url) = next_url.take() {
        let response = executor.get(&url).await?;

        let page: Page<T> = match serde_json::from_str(&response.body) {
            Ok(page) => page,
            Err(e) => {
                collected.partial = Some(Error::PartialFetch(if response.status.is_success() {
                    format!("cannot decode page {}: {}", collected.pages + 1, e)
                } else {
                    format!("catalog answered {}", response.status)
                }));
                break;
            }
        };

        if let Some(error) = page.error {
            collected.partial = Some(Error::PartialFetch(error.message));
            break;
        }
        if !response.status.is_success() {
            collected.partial = Some(Error::PartialFetch(format!(
                "catalog answered {}",
                response.status
            )));
            break;
        }

        collected.pages += 1;
        collected.items.extend(page.items);
        executor.notifier().page_fetched(collected.items.len());

        if item_cap.is_some_and(|cap| collected.items.len() >= cap) {
            break;
        }
        next_url = page.next;
    }

    Ok(collected)
}
