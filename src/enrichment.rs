use log::{debug, Logger};
use time::OffsetDateTime;

use crate::db::Db;
use crate::details::DetailsSource;
use crate::environment::Limits;
use crate::errors::EnrichmentError;
use crate::song::BasicSongInfo;
use crate::validation::validate_song_details;

/// What happened to a freshly created song.
#[derive(Debug)]
pub enum EnrichmentOutcome {
    /// The details were fetched, validated and saved.
    Enriched,

    /// The song was kept without details.
    Skipped(EnrichmentError),
}

impl EnrichmentOutcome {
    pub fn is_enriched(&self) -> bool {
        matches!(self, EnrichmentOutcome::Enriched)
    }
}

/// Fetches, validates and saves the details of `song`, which must
/// already be stored. Failures never undo the creation.
pub async fn enrich(
    logger: &Logger,
    db: &(dyn Db + Send + Sync),
    source: &(dyn DetailsSource + Send + Sync),
    limits: &Limits,
    song: &BasicSongInfo,
) -> EnrichmentOutcome {
    match try_enrich(db, source, limits, song).await {
        Ok(()) => {
            debug!(logger, "Added song details"; "id" => song.id);
            EnrichmentOutcome::Enriched
        }
        Err(e) => {
            debug!(logger, "Skipped song details"; "id" => song.id, "reason" => %e);
            EnrichmentOutcome::Skipped(e)
        }
    }
}

async fn try_enrich(
    db: &(dyn Db + Send + Sync),
    source: &(dyn DetailsSource + Send + Sync),
    limits: &Limits,
    song: &BasicSongInfo,
) -> Result<(), EnrichmentError> {
    let details = source.fetch(song).await?;

    let info = validate_song_details(limits, OffsetDateTime::now_utc(), &details)
        .map_err(EnrichmentError::InvalidDetails)?;

    db.update_info(song.id, &info)
        .await
        .map_err(EnrichmentError::Persist)
}
