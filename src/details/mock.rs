use std::collections::HashMap;
use std::sync::RwLock;

use futures::future::{BoxFuture, FutureExt};

use crate::details::DetailsSource;
use crate::errors::EnrichmentError;
use crate::song::{BasicSongInfo, SongDetails};

/// Answers from a fixed table keyed by group and song name. Unknown
/// songs get a 404.
#[derive(Default)]
pub(crate) struct MockDetailsSource {
    pub(crate) details: RwLock<HashMap<(String, String), SongDetails>>,
}

impl MockDetailsSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, group: &str, song: &str, details: SongDetails) -> Self {
        self.details
            .write()
            .unwrap()
            .insert((group.to_owned(), song.to_owned()), details);

        self
    }
}

impl DetailsSource for MockDetailsSource {
    fn fetch(&self, song: &BasicSongInfo) -> BoxFuture<Result<SongDetails, EnrichmentError>> {
        let result = self
            .details
            .read()
            .unwrap()
            .get(&(song.group_name.clone(), song.song_name.clone()))
            .cloned()
            .ok_or(EnrichmentError::UnexpectedStatus(
                reqwest::StatusCode::NOT_FOUND,
            ));

        async move { result }.boxed()
    }
}
