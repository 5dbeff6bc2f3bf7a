use std::{fmt, str::FromStr};

use crate::{
    Res,
    spotify::{
        executor::Executor,
        pagination::{Collected, fetch_all},
    },
    types::{Track, TrackItem},
    utils,
};

const PLAYLIST_PAGE_SIZE: u32 = 100;
const LIBRARY_PAGE_SIZE: u32 = 50;

/// Collection whose tracks get analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Playlist(String),
    /// The user's saved tracks.
    Library,
}

impl Target {
    pub fn listing_url(&self, api_url: &str) -> String {
        let api_url = api_url.trim_end_matches('/');
        match self {
            Target::Playlist(id) => format!(
                "{api_url}/playlists/{id}/tracks?limit={limit}",
                limit = PLAYLIST_PAGE_SIZE
            ),
            Target::Library => format!(
                "{api_url}/me/tracks?limit={limit}",
                limit = LIBRARY_PAGE_SIZE
            ),
        }
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("library") || s.eq_ignore_ascii_case("liked") {
            return Ok(Target::Library);
        }
        utils::parse_playlist_id(s).map(Target::Playlist)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Playlist(id) => write!(f, "playlist {id}"),
            Target::Library => write!(f, "saved tracks"),
        }
    }
}

/// Lists the tracks of `target`, skipping entries without a track id.
pub async fn list_tracks(
    executor: &mut Executor,
    api_url: &str,
    target: &Target,
    item_cap: Option<usize>,
) -> Res<Collected<Track>> {
    let listing: Collected<TrackItem> =
        fetch_all(executor, &target.listing_url(api_url), item_cap).await?;

    Ok(Collected {
        items: listing
            .items
            .into_iter()
            .filter_map(TrackItem::into_track)
            .collect(),
        partial: listing.partial,
        pages: listing.pages,
    })
}
