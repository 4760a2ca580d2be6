//! Fetches song details from the external details API.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use url::Url;

use crate::errors::EnrichmentError;
use crate::song::{BasicSongInfo, SongDetails};

#[cfg(test)]
pub(crate) mod mock;

pub trait DetailsSource {
    /// Looks up the details of the given song.
    fn fetch(&self, song: &BasicSongInfo) -> BoxFuture<Result<SongDetails, EnrichmentError>>;
}

/// Queries `GET {base_url}/info?group=…&song=…`.
pub struct HttpDetailsSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDetailsSource {
    /// Creates a source whose requests fail if they take longer than
    /// `timeout`. The base URL is only checked when it's used.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(HttpDetailsSource {
            client,
            base_url: base_url.into(),
        })
    }
}

impl DetailsSource for HttpDetailsSource {
    fn fetch(&self, song: &BasicSongInfo) -> BoxFuture<Result<SongDetails, EnrichmentError>> {
        let url = details_url(&self.base_url, song);

        async move {
            let response = self
                .client
                .get(url?)
                .send()
                .await
                .map_err(|source| EnrichmentError::Request { source })?;

            if response.status() != reqwest::StatusCode::OK {
                return Err(EnrichmentError::UnexpectedStatus(response.status()));
            }

            response
                .json::<SongDetails>()
                .await
                .map_err(|source| EnrichmentError::Decode { source })
        }
        .boxed()
    }
}

/// Builds the details URL for `song`, escaping the names as query
/// parameters.
pub fn details_url(base_url: &str, song: &BasicSongInfo) -> Result<Url, EnrichmentError> {
    let mut url =
        Url::parse(base_url).map_err(|_| EnrichmentError::UnsupportedUrl(base_url.to_owned()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(EnrichmentError::UnsupportedUrl(base_url.to_owned()));
    }

    url.path_segments_mut()
        .map_err(|_| EnrichmentError::UnsupportedUrl(base_url.to_owned()))?
        .pop_if_empty()
        .push("info");

    url.query_pairs_mut()
        .clear()
        .append_pair("group", &song.group_name)
        .append_pair("song", &song.song_name);

    Ok(url)
}
