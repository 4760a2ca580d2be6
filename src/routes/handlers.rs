use std::time::{Duration, Instant};

use bytes::Bytes;
use log::{debug, o};
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use warp::{
    http::StatusCode,
    reject,
    reply::{json, with_header, with_status, Reply},
};

use crate::enrichment::{enrich, EnrichmentOutcome};
use crate::environment::Environment;
use crate::errors::LibraryError;
use crate::pagination::{paginate_verses, Page};
use crate::routes::{
    query::{IdQuery, ListQuery, LyricsQuery},
    rejection::{Context, Rejection},
    response::SuccessResponse,
};
use crate::song::{AddSongRequest, UpdateSongRequest};
use crate::validation::{validate_basic_song_info, validate_update_request};

pub(crate) const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($body:tt)+) => {{
        let start = Instant::now();

        // TODO when `try` blocks are stabilized, we can wrap the body
        // and return the headers even on errors
        let result = { $($body)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    }};
}

pub async fn add(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let Environment {
            logger,
            db,
            details,
            config,
        } = environment;

        let error_handler = |e: LibraryError| Rejection::new(Context::add(), e);

        let request: AddSongRequest = parse_json_body(&body).map_err(error_handler)?;
        let mut song = validate_basic_song_info(&config.limits, &request)
            .map_err(LibraryError::Validation)
            .map_err(error_handler)?;

        debug!(logger, "Creating song..."; "group" => &song.group_name, "song" => &song.song_name);
        song.id = db.create(&song).await.map_err(error_handler)?;

        let id = song.id;
        let logger = logger.new(o!("id" => id));

        debug!(logger, "Fetching song details...");
        match enrich(&logger, db.as_ref(), details.as_ref(), &config.limits, &song).await {
            EnrichmentOutcome::Enriched => with_status(json(&SuccessResponse::Id { id }), StatusCode::OK),
            EnrichmentOutcome::Skipped(e) => with_status(
                json(&SuccessResponse::PartiallyAdded {
                    id,
                    song_details: format!("were not acquired due to: {}", e),
                }),
                StatusCode::CREATED,
            ),
        }
    }
}

pub async fn update(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let error_handler = |e: LibraryError| Rejection::new(Context::update(), e);

        let request: UpdateSongRequest = parse_json_body(&body).map_err(error_handler)?;
        let (id, info) =
            validate_update_request(&environment.config.limits, OffsetDateTime::now_utc(), &request)
                .map_err(LibraryError::Validation)
                .map_err(error_handler)?;

        debug!(environment.logger, "Updating song info..."; "id" => id);
        environment
            .db
            .update_info(id, &info)
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::Id { id })
    }
}

pub async fn delete(environment: Environment, query: IdQuery) -> RouteResult {
    timed! {
        let error_handler = |e: LibraryError| Rejection::new(Context::delete(query.id.clone()), e);

        let id = query.validate(&environment.config.limits).map_err(error_handler)?;

        debug!(environment.logger, "Deleting song..."; "id" => id);
        environment.db.delete(id).await.map_err(error_handler)?;

        json(&SuccessResponse::Id { id })
    }
}

pub async fn lyrics(environment: Environment, query: LyricsQuery) -> RouteResult {
    timed! {
        let error_handler = |e: LibraryError| Rejection::new(Context::lyrics(query.id.clone()), e);

        let (id, page, page_size) = query
            .validate(&environment.config.limits)
            .map_err(error_handler)?;

        debug!(environment.logger, "Retrieving lyrics..."; "id" => id, "page" => page, "page_size" => page_size);
        let lyrics = environment.db.lyrics(id).await.map_err(error_handler)?;

        let page = Page::new(page, page_size).map_err(error_handler)?;
        let verses = paginate_verses(&lyrics, page).map_err(error_handler)?;

        json(&SuccessResponse::Verses { verses })
    }
}

pub async fn list(environment: Environment, query: ListQuery) -> RouteResult {
    timed! {
        let error_handler = |e: LibraryError| Rejection::new(Context::list(), e);

        let filter = query
            .validate(&environment.config.limits, OffsetDateTime::now_utc())
            .map_err(error_handler)?;

        debug!(environment.logger, "Listing songs..."; "limit" => filter.limit, "offset" => filter.offset);
        let filtered_rows = environment
            .db
            .filtered_list(&filter)
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::FilteredRows { filtered_rows })
    }
}

/// Parses a JSON request body, rejecting empty bodies and unknown keys.
fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, LibraryError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(LibraryError::MalformedBody("body must not be empty".to_owned()));
    }

    serde_json::from_slice(body).map_err(|e| {
        let message = e.to_string();

        match message.strip_prefix("unknown field ") {
            Some(rest) => {
                let key = rest.split(',').next().unwrap_or(rest).replace('`', "\"");
                LibraryError::MalformedBody(format!("body contains unknown key {}", key))
            }
            None => LibraryError::MalformedBody(format!("body contains badly-formed JSON: {}", message)),
        }
    })
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
